use super::{OutputFormatter, element_name};
use crate::analysis::{count_by_type, group_by_type};
use crate::model::{Issue, IssueType, ScanNotice, ScanReport, Severity, format_px};
use std::io::Write;

pub struct MarkdownOutput;

impl MarkdownOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkdownOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Section order: most severe first.
const SECTIONS: [IssueType; 4] = [
    IssueType::Contrast,
    IssueType::Typography,
    IssueType::TouchTargetSize,
    IssueType::TouchTargetSpacing,
];

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::Major => "🟡",
        Severity::Minor => "🔵",
    }
}

fn detail(issue: &Issue) -> Option<String> {
    let data = issue.node_data();
    match issue.issue_type() {
        IssueType::Contrast => {
            let ratio = data.contrast_ratio?;
            let mut line = format!(
                "{:.2}:1 ({})",
                ratio,
                data.contrast_score.map(|c| c.label()).unwrap_or("Fail")
            );
            if let (Some(fg), Some(bg)) = (data.foreground_color, data.background_color) {
                line.push_str(&format!(", {} on {}", fg.to_hex(), bg.to_hex()));
            }
            Some(line)
        }
        IssueType::Typography => data.font_size.map(|size| format!("{}px", format_px(size))),
        IssueType::TouchTargetSize => {
            let (width, height) = (data.width?, data.height?);
            Some(format!(
                "{} x {}px, needs {}",
                format_px(width),
                format_px(height),
                data.required_size.as_deref().unwrap_or("more room")
            ))
        }
        IssueType::TouchTargetSpacing => data
            .required_spacing
            .as_ref()
            .map(|spacing| format!("needs {} from neighbouring targets", spacing)),
    }
}

impl OutputFormatter for MarkdownOutput {
    fn format<W: Write>(&self, report: &ScanReport, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "# Accessibility Audit: {}\n", report.document_name)?;

        writeln!(writer, "## Summary\n")?;
        writeln!(writer, "| Issue | Count |")?;
        writeln!(writer, "|-------|-------|")?;
        for (issue_type, count) in count_by_type(&report.issues) {
            writeln!(writer, "| {} | {} |", issue_type, count)?;
        }

        let has_issues = SECTIONS
            .iter()
            .any(|&t| !group_by_type(&report.issues, t).is_empty());

        if !has_issues {
            writeln!(writer, "\n## No Issues Found\n")?;
            writeln!(writer, "No accessibility issues detected.")?;
        } else {
            writeln!(writer, "\n## Issues Found\n")?;

            for issue_type in SECTIONS {
                let issues = group_by_type(&report.issues, issue_type);
                if issues.is_empty() {
                    continue;
                }

                writeln!(writer, "### {} {}\n", marker(issue_type.severity()), issue_type)?;
                for issue in issues {
                    let data = issue.node_data();
                    let kind = data.node_type.map(|k| k.as_str()).unwrap_or("?");
                    writeln!(
                        writer,
                        "- `{}` ({}, {}) - {}",
                        element_name(data).unwrap_or(&data.id),
                        kind,
                        data.id,
                        issue.description()
                    )?;
                    if let Some(detail) = detail(issue) {
                        writeln!(writer, "  → {}", detail)?;
                    }
                }
                writeln!(writer)?;
            }
        }

        if !report.notices.is_empty() {
            writeln!(writer, "\n## Notices\n")?;
            for notice in &report.notices {
                match notice {
                    ScanNotice::NoBackgroundDetected { node_id, name } => {
                        let label = if name.is_empty() { node_id } else { name };
                        writeln!(
                            writer,
                            "- No background detected behind `{}` ({}), contrast not checked",
                            label, node_id
                        )?;
                    }
                }
            }
        }

        if report.skipped > 0 {
            writeln!(
                writer,
                "\n_{} node(s) skipped because the host could not resolve them._",
                report.skipped
            )?;
        }

        Ok(())
    }
}
