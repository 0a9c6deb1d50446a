mod color;
mod issue;
mod node;

pub use color::Color;
pub(crate) use issue::format_px;
pub use issue::{
    Compliance, ContrastResult, Issue, IssueType, NodeData, ScanNotice, Severity,
};
pub use node::{
    Capabilities, Capability, FontName, FontValue, LineHeight, MixedMarker, Node, NodeId,
    NodeKind, Paint, PaintKind, Rect, StyleRun, TextProps, first_visible_solid,
};

use serde::{Deserialize, Serialize};

/// Everything a single detection pass produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    pub document_name: String,
    pub issues: Vec<Issue>,
    pub notices: Vec<ScanNotice>,
    /// Nodes skipped because their input could not be resolved.
    pub skipped: usize,
}

impl ScanReport {
    /// Drop issues below `min_severity`, keeping the order of the rest.
    pub fn retain_min_severity(&mut self, min_severity: Severity) {
        self.issues.retain(|issue| issue.severity() >= min_severity);
    }

    pub fn has_critical(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity() == Severity::Critical)
    }
}
