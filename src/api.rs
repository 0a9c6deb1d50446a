//! Library entry points.
//!
//! The CLI commands print and return exit codes; these functions return
//! `Result`s instead, for embedding the audit in other tools.
//!
//! # Example
//!
//! ```no_run
//! use a11y_audit::{scan_file, ScanOptions};
//! use std::path::Path;
//!
//! let report = scan_file(Path::new("home.json"), ScanOptions::default())?;
//! for issue in &report.issues {
//!     println!("{}: {}", issue.issue_type(), issue.description());
//! }
//! # Ok::<(), a11y_audit::AuditError>(())
//! ```

use crate::analysis::{DetectionEngine, ScanScope};
use crate::config::{Config, ConfigError};
use crate::host::{DocumentSnapshot, NodeTree, SnapshotError};
use crate::model::{ScanReport, Severity};
use crate::output::{CsvOutput, JsonOutput, MarkdownOutput, OutputFormatter, ReportJsonOutput};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Document error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Config to scan with. `None` loads `.a11y-audit.toml` next to the
    /// document, falling back to defaults.
    pub config: Option<Config>,

    /// Scan only the document's selection.
    pub selection_only: bool,

    /// Drop issues below this severity.
    pub min_severity: Severity,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            config: None,
            selection_only: false,
            min_severity: Severity::Minor,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
    Csv,
    ReportJson,
}

/// Load and scan a document export.
pub fn scan_file(path: &Path, options: ScanOptions) -> Result<ScanReport, AuditError> {
    let document = DocumentSnapshot::load(path)?;
    let config = match options.config.clone() {
        Some(config) => config,
        None => {
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            Config::load(dir)?
        }
    };
    scan_snapshot(&document, config, &options)
}

/// Scan a document export held in memory.
pub fn scan_json(json: &str, options: ScanOptions) -> Result<ScanReport, AuditError> {
    let document = DocumentSnapshot::from_json(json)?;
    let config = options.config.clone().unwrap_or_default();
    scan_snapshot(&document, config, &options)
}

fn scan_snapshot(
    document: &DocumentSnapshot,
    config: Config,
    options: &ScanOptions,
) -> Result<ScanReport, AuditError> {
    let scope = if options.selection_only {
        ScanScope::Nodes(document.selection().to_vec())
    } else {
        ScanScope::Document
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut report = runtime.block_on(DetectionEngine::new(config).scan(document, &scope));
    report.retain_min_severity(options.min_severity);
    Ok(report)
}

/// Render a report in one of the export formats.
pub fn render_report(report: &ScanReport, format: ReportFormat) -> Result<String, AuditError> {
    let mut buffer = Vec::new();
    match format {
        ReportFormat::Markdown => MarkdownOutput::new().format(report, &mut buffer)?,
        ReportFormat::Json => JsonOutput::new().format(report, &mut buffer)?,
        ReportFormat::Csv => CsvOutput::new().format(report, &mut buffer)?,
        ReportFormat::ReportJson => ReportJsonOutput::new().format(report, &mut buffer)?,
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
