use crate::analysis::reportable;
use crate::model::{Issue, NodeData, NodeKind, format_px};
use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE: &str = "N/A";

/// One issue flattened for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub element_type: String,
    pub element_name: String,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub description: String,
    pub severity: String,
    pub wcag_contrast_score: String,
    pub contrast_ratio: String,
    pub font_size: String,
}

impl ReportRow {
    pub const HEADERS: [&'static str; 8] = [
        "Element Type",
        "Element Name",
        "Issue Type",
        "Description",
        "Severity",
        "WCAG Contrast Score",
        "Contrast Ratio",
        "Font Size",
    ];

    pub fn from_issue(issue: &Issue) -> Self {
        let data = issue.node_data();
        Self {
            element_type: data
                .node_type
                .map(|kind| kind.as_str().to_string())
                .unwrap_or_else(not_available),
            element_name: element_name(data)
                .map(str::to_string)
                .unwrap_or_else(not_available),
            issue_type: issue.issue_type().label().to_string(),
            description: issue.description().to_string(),
            severity: issue.severity().to_string(),
            wcag_contrast_score: data
                .contrast_score
                .map(|score| score.label().to_string())
                .unwrap_or_else(not_available),
            contrast_ratio: data
                .contrast_ratio
                .map(|ratio| format!("{:.2}:1", ratio))
                .unwrap_or_else(not_available),
            font_size: data
                .font_size
                .map(|size| format!("{}px", format_px(size)))
                .unwrap_or_else(not_available),
        }
    }

    pub fn cells(&self) -> [&str; 8] {
        [
            self.element_type.as_str(),
            self.element_name.as_str(),
            self.issue_type.as_str(),
            self.description.as_str(),
            self.severity.as_str(),
            self.wcag_contrast_score.as_str(),
            self.contrast_ratio.as_str(),
            self.font_size.as_str(),
        ]
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Text content for text nodes, the layer name for everything else.
pub fn element_name(data: &NodeData) -> Option<&str> {
    let name = match data.node_type {
        Some(NodeKind::Text) => data.characters.as_deref(),
        _ => Some(data.name.as_str()),
    };
    name.filter(|name| !name.is_empty())
}

pub fn report_rows(issues: &[Issue]) -> Vec<ReportRow> {
    reportable(issues).into_iter().map(ReportRow::from_issue).collect()
}
