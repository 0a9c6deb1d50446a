use super::{Color, LineHeight, Node, NodeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    #[serde(rename = "type")]
    issue_type: IssueType,
    severity: Severity,
    description: String,
    #[serde(rename = "nodeData")]
    node_data: NodeData,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssueType {
    Typography,
    Contrast,
    #[serde(rename = "Touch Target Size")]
    TouchTargetSize,
    #[serde(rename = "Touch Target Spacing")]
    TouchTargetSpacing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Compliance {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AAA Large")]
    AaaLarge,
    #[serde(rename = "AA Large")]
    AaLarge,
    Fail,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ContrastResult {
    pub ratio: f64,
    pub compliance: Compliance,
}

/// Node snapshot and measurements that triggered an issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub id: String,
    pub name: String,
    pub node_type: Option<NodeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<LineHeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_score: Option<Compliance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_spacing: Option<String>,
}

impl NodeData {
    /// Identity fields plus geometry and text metrics, where the node has them.
    pub fn for_node(node: &Node) -> Self {
        let mut data = Self {
            id: node.id.clone(),
            name: node.name_or_empty().to_string(),
            node_type: Some(node.kind),
            ..Default::default()
        };
        if let Some(bounds) = node.bounds() {
            data.width = Some(bounds.width);
            data.height = Some(bounds.height);
        }
        if let Some(text) = node.text() {
            data.characters = Some(text.characters.clone());
            data.font_size = text.font_size.number();
            data.line_height = text.line_height.clone();
        }
        data
    }
}

impl Issue {
    pub fn typography(node_data: NodeData) -> Self {
        Self::new(IssueType::Typography, node_data)
    }

    pub fn contrast(
        mut node_data: NodeData,
        result: ContrastResult,
        foreground: Color,
        background: Color,
    ) -> Self {
        node_data.contrast_score = Some(result.compliance);
        node_data.contrast_ratio = Some(result.ratio);
        node_data.foreground_color = Some(foreground);
        node_data.background_color = Some(background);
        Self::new(IssueType::Contrast, node_data)
    }

    pub fn touch_target_size(mut node_data: NodeData, min_size: f64) -> Self {
        node_data.required_size = Some(required_size(min_size));
        Self::new(IssueType::TouchTargetSize, node_data)
    }

    pub fn touch_target_spacing(mut node_data: NodeData, min_size: f64, min_spacing: f64) -> Self {
        node_data.required_size = Some(required_size(min_size));
        node_data.required_spacing = Some(format!("{}px", format_px(min_spacing)));
        Self::new(IssueType::TouchTargetSpacing, node_data)
    }

    fn new(issue_type: IssueType, node_data: NodeData) -> Self {
        Self {
            issue_type,
            severity: issue_type.severity(),
            description: issue_type.description().to_string(),
            node_data,
        }
    }

    pub fn issue_type(&self) -> IssueType {
        self.issue_type
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn node_data(&self) -> &NodeData {
        &self.node_data
    }

    pub fn node_id(&self) -> &str {
        &self.node_data.id
    }
}

impl IssueType {
    pub const ALL: [IssueType; 4] = [
        IssueType::Typography,
        IssueType::Contrast,
        IssueType::TouchTargetSize,
        IssueType::TouchTargetSpacing,
    ];

    pub fn severity(self) -> Severity {
        match self {
            IssueType::Contrast => Severity::Critical,
            IssueType::Typography => Severity::Major,
            IssueType::TouchTargetSize | IssueType::TouchTargetSpacing => Severity::Minor,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            IssueType::Typography => "Text size is too small for readability.",
            IssueType::Contrast => "Text contrast is below WCAG AA standard.",
            IssueType::TouchTargetSize => "Touch target size is too small for accessibility.",
            IssueType::TouchTargetSpacing => {
                "Spacing between touch targets is too small for accessibility."
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IssueType::Typography => "Typography",
            IssueType::Contrast => "Contrast",
            IssueType::TouchTargetSize => "Touch Target Size",
            IssueType::TouchTargetSpacing => "Touch Target Spacing",
        }
    }
}

impl Compliance {
    pub fn label(self) -> &'static str {
        match self {
            Compliance::Aaa => "AAA",
            Compliance::Aa => "AA",
            Compliance::AaaLarge => "AAA Large",
            Compliance::AaLarge => "AA Large",
            Compliance::Fail => "Fail",
        }
    }

    pub fn is_fail(self) -> bool {
        self == Compliance::Fail
    }
}

/// Outcome the engine surfaces alongside issues for a node it could not fully judge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScanNotice {
    /// No solid background was found behind a text node; contrast was not computed.
    NoBackgroundDetected { node_id: String, name: String },
}

fn required_size(min_size: f64) -> String {
    let px = format_px(min_size);
    format!("{} x {}px", px, px)
}

pub(crate) fn format_px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Minor => write!(f, "minor"),
            Severity::Major => write!(f, "major"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minor" => Ok(Severity::Minor),
            "major" => Ok(Severity::Major),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

impl std::fmt::Display for Compliance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(id: &str) -> NodeData {
        NodeData {
            id: id.to_string(),
            name: "Submit button".to_string(),
            node_type: Some(NodeKind::Frame),
            width: Some(30.0),
            height: Some(30.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_severity_fixed_per_type() {
        assert_eq!(Issue::typography(data("1")).severity(), Severity::Major);
        assert_eq!(
            Issue::touch_target_size(data("1"), 44.0).severity(),
            Severity::Minor
        );
        let contrast = Issue::contrast(
            data("1"),
            ContrastResult {
                ratio: 2.0,
                compliance: Compliance::Fail,
            },
            Color::BLACK,
            Color::BLACK,
        );
        assert_eq!(contrast.severity(), Severity::Critical);
        assert_eq!(contrast.description(), "Text contrast is below WCAG AA standard.");
    }

    #[test]
    fn test_required_size_string() {
        let issue = Issue::touch_target_size(data("1"), 44.0);
        assert_eq!(issue.node_data().required_size.as_deref(), Some("44 x 44px"));

        let spacing = Issue::touch_target_spacing(data("1"), 44.0, 8.0);
        assert_eq!(spacing.node_data().required_spacing.as_deref(), Some("8px"));
        assert_eq!(spacing.issue_type(), IssueType::TouchTargetSpacing);
    }

    #[test]
    fn test_wire_shape() {
        let issue = Issue::touch_target_size(data("4:2"), 44.0);
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["type"], "Touch Target Size");
        assert_eq!(json["severity"], "minor");
        assert_eq!(json["nodeData"]["id"], "4:2");
        assert_eq!(json["nodeData"]["nodeType"], "FRAME");
        assert_eq!(json["nodeData"]["requiredSize"], "44 x 44px");
        assert!(json["nodeData"].get("contrastScore").is_none());

        let back: Issue = serde_json::from_value(json).unwrap();
        assert_eq!(back, issue);
    }

    #[test]
    fn test_severity_ordering_and_parse() {
        assert!(Severity::Critical > Severity::Major);
        assert!(Severity::Major > Severity::Minor);
        assert_eq!("CRITICAL".parse::<Severity>(), Ok(Severity::Critical));
        assert!("high".parse::<Severity>().is_err());
    }
}
