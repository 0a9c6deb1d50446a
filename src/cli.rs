use crate::config::Config;
use crate::model::Severity;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "a11y-audit")]
#[command(about = "Audit design documents for WCAG contrast, text size and touch target issues")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan a document export and report accessibility issues
    Scan(ScanArgs),

    /// Run a quick-check session driven by JSON events on stdin
    QuickCheck(QuickCheckArgs),

    /// Raise undersized text to the minimum font size
    Fix(FixArgs),

    /// Generate a starter .a11y-audit.toml configuration file
    Init(InitArgs),
}

/// Threshold overrides applied on top of the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ThresholdArgs {
    /// Smallest legible font size in px
    #[arg(long)]
    pub min_font_size: Option<f64>,

    /// Smallest touch target edge in px
    #[arg(long)]
    pub min_target: Option<f64>,

    /// Smallest gap between touch targets in px
    #[arg(long)]
    pub min_spacing: Option<f64>,
}

impl ThresholdArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(size) = self.min_font_size {
            config.thresholds.min_font_size = size;
        }
        if let Some(size) = self.min_target {
            config.thresholds.min_touch_target = size;
        }
        if let Some(spacing) = self.min_spacing {
            config.thresholds.min_touch_spacing = spacing;
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// Document export (JSON) to scan
    pub document: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "markdown")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Minimum severity to report
    #[arg(long, default_value = "minor")]
    pub min_severity: Severity,

    /// Only scan the nodes selected in the document
    #[arg(long)]
    pub selection: bool,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct QuickCheckArgs {
    /// Document export (JSON) the session runs against
    pub document: PathBuf,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct FixArgs {
    /// Document export (JSON) to fix
    pub document: PathBuf,

    /// Write the fixed document here instead of in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the planned changes without writing anything
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Directory where to create .a11y-audit.toml (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    /// Flattened report rows
    Csv,
    /// Flattened report rows as JSON
    ReportJson,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_with_overrides() {
        let cli = Cli::parse_from([
            "a11y-audit",
            "scan",
            "home.json",
            "--format",
            "report-json",
            "--min-severity",
            "major",
            "--min-target",
            "48",
        ]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.format, OutputFormat::ReportJson);
        assert_eq!(args.min_severity, Severity::Major);

        let mut config = Config::default();
        args.thresholds.apply(&mut config);
        assert_eq!(config.thresholds.min_touch_target, 48.0);
        assert_eq!(config.thresholds.min_font_size, 11.0);
    }

    #[test]
    fn test_init_defaults_to_cwd() {
        let cli = Cli::parse_from(["a11y-audit", "init"]);
        let Command::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(args.path, PathBuf::from("."));
    }
}
