use super::{OutputFormatter, report_rows};
use crate::analysis::{count_by_type, reportable};
use crate::model::{Issue, ScanNotice, ScanReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// The full scan result: summary, issue payloads and notices.
#[derive(Default)]
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    document_name: &'a str,
    summary: JsonSummary,
    issues: Vec<&'a Issue>,
    notices: &'a [ScanNotice],
    skipped: usize,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    by_type: BTreeMap<&'static str, usize>,
}

impl OutputFormatter for JsonOutput {
    fn format<W: Write>(&self, report: &ScanReport, writer: &mut W) -> std::io::Result<()> {
        let issues = reportable(&report.issues);
        let json_report = JsonReport {
            document_name: &report.document_name,
            summary: JsonSummary {
                total: issues.len(),
                by_type: count_by_type(&report.issues)
                    .into_iter()
                    .map(|(issue_type, count)| (issue_type.label(), count))
                    .collect(),
            },
            issues,
            notices: &report.notices,
            skipped: report.skipped,
        };

        let json = serde_json::to_string_pretty(&json_report).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

/// Flattened report rows, the JSON twin of the CSV export.
#[derive(Default)]
pub struct ReportJsonOutput;

impl ReportJsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for ReportJsonOutput {
    fn format<W: Write>(&self, report: &ScanReport, writer: &mut W) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&report_rows(&report.issues))
            .map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeData, NodeKind};

    fn report() -> ScanReport {
        ScanReport {
            document_name: "Checkout".to_string(),
            issues: vec![Issue::touch_target_size(
                NodeData {
                    id: "4:1".to_string(),
                    name: "submit-button".to_string(),
                    node_type: Some(NodeKind::Frame),
                    width: Some(30.0),
                    height: Some(30.0),
                    ..Default::default()
                },
                44.0,
            )],
            notices: vec![ScanNotice::NoBackgroundDetected {
                node_id: "5:1".to_string(),
                name: "Floating".to_string(),
            }],
            skipped: 0,
        }
    }

    #[test]
    fn test_full_json_shape() {
        let mut out = Vec::new();
        JsonOutput::new().format(&report(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["documentName"], "Checkout");
        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["summary"]["by_type"]["Touch Target Size"], 1);
        assert_eq!(value["summary"]["by_type"]["Contrast"], 0);
        assert_eq!(value["issues"][0]["type"], "Touch Target Size");
        assert_eq!(value["issues"][0]["nodeData"]["requiredSize"], "44 x 44px");
        assert_eq!(value["notices"][0]["kind"], "no-background-detected");
    }

    #[test]
    fn test_report_rows_json() {
        let mut out = Vec::new();
        ReportJsonOutput::new().format(&report(), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value[0]["elementType"], "FRAME");
        assert_eq!(value[0]["elementName"], "submit-button");
        assert_eq!(value[0]["wcagContrastScore"], "N/A");
        assert_eq!(value[0]["severity"], "minor");
    }
}
