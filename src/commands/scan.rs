use crate::analysis::{DetectionEngine, ScanScope};
use crate::cli::{OutputFormat, ScanArgs};
use crate::fs::{FileSystem, default_fs};
use crate::host::NodeTree;
use crate::model::Severity;
use crate::output::{CsvOutput, JsonOutput, MarkdownOutput, OutputFormatter, ReportJsonOutput};
use crate::style;
use std::io::{self, Write};

use super::CommandContext;

pub fn cmd_scan(args: ScanArgs) -> i32 {
    cmd_scan_with_fs(args, default_fs())
}

pub fn cmd_scan_with_fs(args: ScanArgs, fs: &dyn FileSystem) -> i32 {
    let ctx = match CommandContext::new(&args.document, &args.thresholds, fs) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let scope = if args.selection {
        if ctx.document.selection().is_empty() {
            style::warning("Document has no selection, nothing to scan.");
        }
        ScanScope::Nodes(ctx.document.selection().to_vec())
    } else {
        ScanScope::Document
    };

    let engine = DetectionEngine::new(ctx.config.clone());
    let mut report = ctx.runtime.block_on(engine.scan(&ctx.document, &scope));
    report.retain_min_severity(args.min_severity);

    let mut buffer = Vec::new();
    let format_result = match args.format {
        OutputFormat::Markdown => MarkdownOutput::new().format(&report, &mut buffer),
        OutputFormat::Json => JsonOutput::new().format(&report, &mut buffer),
        OutputFormat::Csv => CsvOutput::new().format(&report, &mut buffer),
        OutputFormat::ReportJson => ReportJsonOutput::new().format(&report, &mut buffer),
    };

    if let Err(e) = format_result {
        style::error(&format!("Failed to format output: {}", e));
        return 1;
    }

    let output_str = String::from_utf8_lossy(&buffer);

    let write_result = match &args.output {
        Some(path) => fs.write(path, &output_str),
        None if args.format == OutputFormat::Markdown => {
            style::render_markdown(&output_str, &mut io::stdout())
        }
        None => write!(io::stdout(), "{}", output_str),
    };

    if let Err(e) = write_result {
        style::error(&format!("Failed to write output: {}", e));
        return 1;
    }

    if let Some(path) = &args.output {
        style::success(&format!(
            "Wrote {} issue(s) to {}",
            report.issues.len(),
            style::path(path)
        ));
        for level in [Severity::Critical, Severity::Major, Severity::Minor] {
            let count = report.issues.iter().filter(|i| i.severity() == level).count();
            if count > 0 {
                eprintln!("{}", style::metric(&style::severity(level), count));
            }
        }
    }

    // Critical issues (failed contrast) are the ones that should block CI.
    if report.has_critical() { 1 } else { 0 }
}
