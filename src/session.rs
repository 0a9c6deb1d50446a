//! Quick-check: a selection-driven re-scan loop.
//!
//! A [`QuickCheckSession`] is a small state machine with a single entry
//! point, [`QuickCheckSession::dispatch`]. Each session owns its state and
//! its cancellation flag, so independent sessions never see each other.
//!
//! Navigation and font-size edits become [`HostCommand`](crate::host::HostCommand)s
//! queued on the session's [`CommandSink`]; the host drains and applies them.

use crate::analysis::{DetectionEngine, ScanScope};
use crate::config::Config;
use crate::host::{CommandSink, DocumentHost, NodeTree};
use crate::model::NodeId;
use crate::protocol::{ClientEvent, ScanMode, ServerEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingSelectionChange,
    Scanning,
    Cancelled,
}

/// Shared flag that stops further selection-triggered scans.
///
/// Clones observe the same flag, so a handle can be passed to another task
/// and used to cancel while a scan is in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

pub struct QuickCheckSession {
    engine: DetectionEngine,
    state: SessionState,
    cancel: CancelHandle,
    commands: Option<CommandSink>,
}

impl QuickCheckSession {
    pub fn new(config: Config) -> Self {
        Self {
            engine: DetectionEngine::new(config),
            state: SessionState::Idle,
            cancel: CancelHandle::default(),
            commands: None,
        }
    }

    /// Queue host commands for `navigate` and `update-font-size` on `sink`.
    pub fn with_commands(mut self, sink: CommandSink) -> Self {
        self.commands = Some(sink);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Feed one event through the state machine.
    ///
    /// Returns `None` when the event produces no response, either because
    /// the current state ignores it or because the scan it started was
    /// cancelled before it finished.
    pub async fn dispatch<H: DocumentHost>(
        &mut self,
        host: &H,
        event: ClientEvent,
    ) -> Option<ServerEvent> {
        if self.cancel.is_cancelled() && self.state != SessionState::Cancelled {
            self.state = SessionState::Cancelled;
        }

        match (self.state, event) {
            (_, ClientEvent::Scan { mode }) => {
                let scope = match mode {
                    ScanMode::Full => ScanScope::Document,
                    ScanMode::Selection => ScanScope::Nodes(host.selection().to_vec()),
                };
                Some(self.engine.scan(host, &scope).await.into())
            }
            (_, ClientEvent::CancelQuickcheck) => {
                self.cancel.cancel();
                self.state = SessionState::Cancelled;
                tracing::debug!("quick-check cancelled");
                Some(ServerEvent::QuickcheckCancelled)
            }
            (_, ClientEvent::Navigate { node_id }) => self.navigate(host, &node_id),
            (_, ClientEvent::UpdateFontSize { node_id, font_size }) => {
                self.update_font_size(host, &node_id, font_size).await
            }
            (_, ClientEvent::StartQuickcheck) => {
                self.cancel.reset();
                self.state = SessionState::AwaitingSelectionChange;
                tracing::debug!("quick-check started");
                Some(ServerEvent::QuickcheckStarted)
            }
            (SessionState::AwaitingSelectionChange, ClientEvent::SelectionChanged { nodes }) => {
                if nodes.is_empty() {
                    return Some(ServerEvent::empty_issues());
                }
                self.scan_selection(host, &nodes).await
            }
            (state, ClientEvent::SelectionChanged { .. }) => {
                tracing::debug!(?state, "selection change ignored");
                None
            }
        }
    }

    fn navigate<T: NodeTree>(&self, tree: &T, node_id: &str) -> Option<ServerEvent> {
        let sink = match self.command_target(tree, node_id) {
            Ok((sink, _)) => sink,
            Err(event) => return Some(event),
        };
        sink.request_select(node_id);
        sink.request_reveal_in_viewport(node_id);
        None
    }

    async fn update_font_size<H: DocumentHost>(
        &self,
        host: &H,
        node_id: &str,
        font_size: f64,
    ) -> Option<ServerEvent> {
        let (sink, id) = match self.command_target(host, node_id) {
            Ok(target) => target,
            Err(event) => return Some(event),
        };
        if let Err(err) = host.load_font(id).await {
            tracing::warn!(node_id, error = %err, "font size not updated");
            return Some(ServerEvent::error(err.to_string()));
        }
        sink.request_font_size_change(node_id, font_size);
        None
    }

    fn command_target<T: NodeTree>(
        &self,
        tree: &T,
        node_id: &str,
    ) -> Result<(&CommandSink, NodeId), ServerEvent> {
        let Some(sink) = &self.commands else {
            return Err(ServerEvent::error("Host commands are not available"));
        };
        match tree.find(node_id) {
            Some(id) => Ok((sink, id)),
            None => {
                tracing::warn!(node_id, "node not found");
                Err(ServerEvent::error(format!("Node {} not found", node_id)))
            }
        }
    }

    async fn scan_selection<H: DocumentHost>(
        &mut self,
        host: &H,
        host_ids: &[String],
    ) -> Option<ServerEvent> {
        let nodes: Vec<NodeId> = host_ids
            .iter()
            .filter_map(|host_id| {
                let id = host.find(host_id);
                if id.is_none() {
                    tracing::warn!(node_id = %host_id, "selected node not found, ignoring");
                }
                id
            })
            .collect();

        if nodes.is_empty() {
            return Some(ServerEvent::empty_issues());
        }

        self.state = SessionState::Scanning;
        let report = self.engine.scan(host, &ScanScope::Nodes(nodes)).await;

        if self.cancel.is_cancelled() {
            self.state = SessionState::Cancelled;
            tracing::debug!("discarding quick-check result after cancellation");
            return None;
        }

        self.state = SessionState::AwaitingSelectionChange;
        Some(report.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{DocumentSnapshot, HostCommand, HostError};
    use crate::model::{IssueType, Node};

    const DOC: &str = r#"{
        "selection": ["small"],
        "children": [{"id": "card", "type": "FRAME", "x": 0, "y": 0, "width": 300, "height": 300,
            "fills": [{"type": "SOLID", "color": {"r": 1, "g": 1, "b": 1}}],
            "children": [
                {"id": "small", "type": "TEXT", "characters": "tiny", "fontSize": 9},
                {"id": "ok", "type": "TEXT", "characters": "fine", "fontSize": 16},
                {"id": "btn", "type": "FRAME", "name": "close-button", "x": 0, "y": 0, "width": 20, "height": 20}
            ]}]
    }"#;

    fn doc() -> DocumentSnapshot {
        DocumentSnapshot::from_json(DOC).unwrap()
    }

    fn selection(ids: &[&str]) -> ClientEvent {
        ClientEvent::SelectionChanged {
            nodes: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn issue_ids(event: Option<ServerEvent>) -> Vec<String> {
        match event {
            Some(ServerEvent::Issues { issues, .. }) => {
                issues.iter().map(|i| i.node_id().to_string()).collect()
            }
            other => panic!("expected issues, got {:?}", other),
        }
    }

    /// Delegating host whose font loads suspend once before resolving.
    struct YieldingHost(DocumentSnapshot);

    impl NodeTree for YieldingHost {
        fn node(&self, id: NodeId) -> &Node {
            self.0.node(id)
        }
        fn roots(&self) -> &[NodeId] {
            self.0.roots()
        }
        fn find(&self, host_id: &str) -> Option<NodeId> {
            self.0.find(host_id)
        }
    }

    impl DocumentHost for YieldingHost {
        async fn load_font(&self, id: NodeId) -> Result<(), HostError> {
            tokio::task::yield_now().await;
            self.0.load_font(id).await
        }

        async fn resolve_master_component(&self, id: NodeId) -> Result<Option<NodeId>, HostError> {
            self.0.resolve_master_component(id).await
        }
    }

    #[tokio::test]
    async fn test_selection_ignored_until_started() {
        let doc = doc();
        let mut session = QuickCheckSession::new(Config::default());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.dispatch(&doc, selection(&["small"])).await.is_none());
    }

    #[tokio::test]
    async fn test_quickcheck_scans_each_selection() {
        let doc = doc();
        let mut session = QuickCheckSession::new(Config::default());

        assert_eq!(
            session.dispatch(&doc, ClientEvent::StartQuickcheck).await,
            Some(ServerEvent::QuickcheckStarted)
        );
        assert_eq!(session.state(), SessionState::AwaitingSelectionChange);

        assert_eq!(issue_ids(session.dispatch(&doc, selection(&["small"])).await), vec!["small"]);
        assert_eq!(issue_ids(session.dispatch(&doc, selection(&["ok"])).await), Vec::<String>::new());
        assert_eq!(issue_ids(session.dispatch(&doc, selection(&["btn"])).await), vec!["btn"]);
        assert_eq!(session.state(), SessionState::AwaitingSelectionChange);
    }

    #[tokio::test]
    async fn test_empty_selection_short_circuits() {
        let doc = doc();
        let mut session = QuickCheckSession::new(Config::default());
        session.dispatch(&doc, ClientEvent::StartQuickcheck).await;

        assert_eq!(
            session.dispatch(&doc, selection(&[])).await,
            Some(ServerEvent::empty_issues())
        );
        assert_eq!(
            session.dispatch(&doc, selection(&["no-such-node"])).await,
            Some(ServerEvent::empty_issues())
        );
    }

    #[tokio::test]
    async fn test_cancel_stops_future_scans() {
        let doc = doc();
        let mut session = QuickCheckSession::new(Config::default());
        session.dispatch(&doc, ClientEvent::StartQuickcheck).await;

        assert_eq!(
            session.dispatch(&doc, ClientEvent::CancelQuickcheck).await,
            Some(ServerEvent::QuickcheckCancelled)
        );
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.dispatch(&doc, selection(&["small"])).await.is_none());

        session.dispatch(&doc, ClientEvent::StartQuickcheck).await;
        assert_eq!(issue_ids(session.dispatch(&doc, selection(&["small"])).await), vec!["small"]);
    }

    #[tokio::test]
    async fn test_cancel_during_scan_discards_result() {
        let host = YieldingHost(doc());
        let mut session = QuickCheckSession::new(Config::default());
        session.dispatch(&host, ClientEvent::StartQuickcheck).await;
        let handle = session.cancel_handle();

        let (result, ()) = tokio::join!(session.dispatch(&host, selection(&["card"])), async {
            handle.cancel();
        });

        assert!(result.is_none());
        assert_eq!(session.state(), SessionState::Cancelled);
    }

    #[tokio::test]
    async fn test_one_shot_scan_modes() {
        let doc = doc();
        let mut session = QuickCheckSession::new(Config::default());

        let full = session
            .dispatch(&doc, ClientEvent::Scan { mode: ScanMode::Full })
            .await;
        assert_eq!(issue_ids(full), vec!["small", "btn"]);

        let selected = session
            .dispatch(&doc, ClientEvent::Scan { mode: ScanMode::Selection })
            .await;
        match selected {
            Some(ServerEvent::Issues { issues, .. }) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].issue_type(), IssueType::Typography);
            }
            other => panic!("expected issues, got {:?}", other),
        }
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let doc = doc();
        let mut first = QuickCheckSession::new(Config::default());
        let mut second = QuickCheckSession::new(Config::default());
        first.dispatch(&doc, ClientEvent::StartQuickcheck).await;
        second.dispatch(&doc, ClientEvent::StartQuickcheck).await;

        first.dispatch(&doc, ClientEvent::CancelQuickcheck).await;
        assert_eq!(issue_ids(second.dispatch(&doc, selection(&["small"])).await), vec!["small"]);
    }

    #[tokio::test]
    async fn test_navigate_queues_select_then_reveal() {
        let doc = doc();
        let (sink, mut queue) = CommandSink::channel();
        let mut session = QuickCheckSession::new(Config::default()).with_commands(sink);

        let navigate = ClientEvent::Navigate {
            node_id: "btn".to_string(),
        };
        assert!(session.dispatch(&doc, navigate).await.is_none());
        assert_eq!(
            queue.try_recv().unwrap(),
            HostCommand::Select {
                node_id: "btn".to_string()
            }
        );
        assert_eq!(
            queue.try_recv().unwrap(),
            HostCommand::RevealInViewport {
                node_id: "btn".to_string()
            }
        );
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_update_font_size_waits_for_font() {
        let doc = DocumentSnapshot::from_json(
            r#"{"unavailableFonts": [{"family": "Brand", "style": "Regular"}],
                "children": [
                    {"id": "t", "type": "TEXT", "characters": "a", "fontSize": 9},
                    {"id": "locked", "type": "TEXT", "characters": "b", "fontSize": 9,
                     "fontName": {"family": "Brand", "style": "Regular"}},
                    {"id": "box", "type": "FRAME"}
                ]}"#,
        )
        .unwrap();
        let (sink, mut queue) = CommandSink::channel();
        let mut session = QuickCheckSession::new(Config::default()).with_commands(sink);
        let update = |id: &str| ClientEvent::UpdateFontSize {
            node_id: id.to_string(),
            font_size: 12.0,
        };

        assert!(session.dispatch(&doc, update("t")).await.is_none());
        assert_eq!(
            queue.try_recv().unwrap(),
            HostCommand::SetFontSize {
                node_id: "t".to_string(),
                font_size: 12.0
            }
        );

        for id in ["locked", "box", "gone"] {
            assert!(matches!(
                session.dispatch(&doc, update(id)).await,
                Some(ServerEvent::Error { .. })
            ));
        }
        assert!(queue.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_commands_need_a_sink() {
        let doc = doc();
        let mut session = QuickCheckSession::new(Config::default());
        let navigate = ClientEvent::Navigate {
            node_id: "btn".to_string(),
        };
        assert!(matches!(
            session.dispatch(&doc, navigate).await,
            Some(ServerEvent::Error { .. })
        ));
    }
}
