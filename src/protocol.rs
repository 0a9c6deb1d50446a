//! Wire contract between a plugin UI and the audit core.
//!
//! Every message is one JSON object tagged by `event`. Node references are
//! host ids, so a client never needs to hold live node handles.

use crate::model::{Issue, ScanNotice, ScanReport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Full,
    Selection,
}

/// Messages a client sends in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientEvent {
    StartQuickcheck,
    SelectionChanged {
        #[serde(default)]
        nodes: Vec<String>,
    },
    #[serde(alias = "quickcheck-cancelled")]
    CancelQuickcheck,
    Scan {
        mode: ScanMode,
    },
    /// Select a node and bring it into view.
    #[serde(rename_all = "camelCase")]
    Navigate {
        node_id: String,
    },
    #[serde(rename_all = "camelCase")]
    UpdateFontSize {
        node_id: String,
        font_size: f64,
    },
}

/// Messages the core sends back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    QuickcheckStarted,
    Issues {
        issues: Vec<Issue>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        notices: Vec<ScanNotice>,
        #[serde(default, skip_serializing_if = "is_zero")]
        skipped: usize,
    },
    QuickcheckCancelled,
    Error {
        message: String,
    },
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

impl ServerEvent {
    pub fn empty_issues() -> Self {
        ServerEvent::Issues {
            issues: Vec::new(),
            notices: Vec::new(),
            skipped: 0,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }
}

impl From<ScanReport> for ServerEvent {
    fn from(report: ScanReport) -> Self {
        ServerEvent::Issues {
            issues: report.issues,
            notices: report.notices,
            skipped: report.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_events() {
        let parse = |s: &str| serde_json::from_str::<ClientEvent>(s).unwrap();

        assert_eq!(parse(r#"{"event":"start-quickcheck"}"#), ClientEvent::StartQuickcheck);
        assert_eq!(
            parse(r#"{"event":"selection-changed","nodes":["1:2","1:3"]}"#),
            ClientEvent::SelectionChanged {
                nodes: vec!["1:2".to_string(), "1:3".to_string()]
            }
        );
        assert_eq!(
            parse(r#"{"event":"selection-changed"}"#),
            ClientEvent::SelectionChanged { nodes: vec![] }
        );
        assert_eq!(parse(r#"{"event":"cancel-quickcheck"}"#), ClientEvent::CancelQuickcheck);
        assert_eq!(parse(r#"{"event":"quickcheck-cancelled"}"#), ClientEvent::CancelQuickcheck);
        assert_eq!(
            parse(r#"{"event":"scan","mode":"selection"}"#),
            ClientEvent::Scan {
                mode: ScanMode::Selection
            }
        );
        assert_eq!(
            parse(r#"{"event":"navigate","nodeId":"2:3"}"#),
            ClientEvent::Navigate {
                node_id: "2:3".to_string()
            }
        );
        assert_eq!(
            parse(r#"{"event":"update-font-size","nodeId":"2:1","fontSize":12}"#),
            ClientEvent::UpdateFontSize {
                node_id: "2:1".to_string(),
                font_size: 12.0
            }
        );
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"reticulate"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"scan","mode":"page"}"#).is_err());
    }

    #[test]
    fn test_empty_issues_shape() {
        let json = serde_json::to_string(&ServerEvent::empty_issues()).unwrap();
        assert_eq!(json, r#"{"event":"issues","issues":[]}"#);
    }
}
