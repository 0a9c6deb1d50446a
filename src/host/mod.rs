//! The seam between the detection engine and the design tool hosting it.
//!
//! The engine reads the document through [`NodeTree`], awaits the two host
//! operations that may suspend through [`DocumentHost`], and asks for the one
//! mutation it ever needs by sending a [`HostCommand`] into a [`CommandSink`].

mod snapshot;

pub use snapshot::{DocumentSnapshot, SnapshotError};

use crate::model::{FontValue, Node, NodeId, Paint, Rect};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;

/// Read-only view over the host document.
pub trait NodeTree {
    fn node(&self, id: NodeId) -> &Node;

    /// Top-level nodes of the page being audited, in paint order.
    fn roots(&self) -> &[NodeId];

    fn document_name(&self) -> &str {
        "Untitled"
    }

    /// Look up a node by its host id.
    fn find(&self, host_id: &str) -> Option<NodeId>;

    /// Nodes currently selected in the host, in selection order.
    fn selection(&self) -> &[NodeId] {
        &[]
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    fn bounding_box(&self, id: NodeId) -> Option<&Rect> {
        self.node(id).bounds()
    }

    fn fills(&self, id: NodeId) -> Option<&[Paint]> {
        self.node(id).fills()
    }

    fn characters(&self, id: NodeId) -> Option<&str> {
        self.node(id).text().map(|t| t.characters.as_str())
    }

    fn font_size(&self, id: NodeId) -> Option<&FontValue<f64>> {
        self.node(id).text().map(|t| &t.font_size)
    }

    fn font_weight(&self, id: NodeId) -> Option<&FontValue<f64>> {
        self.node(id).text().map(|t| &t.font_weight)
    }

    fn range_weight(&self, id: NodeId, start: usize, end: usize) -> Option<FontValue<f64>> {
        self.node(id).text()?.range_weight(start, end)
    }
}

/// Host operations that may suspend.
pub trait DocumentHost: NodeTree {
    /// Resolve once the node's font is loaded and its metrics can be trusted.
    fn load_font(&self, id: NodeId) -> impl Future<Output = Result<(), HostError>>;

    /// The master component behind an instance, when it has one.
    fn resolve_master_component(
        &self,
        id: NodeId,
    ) -> impl Future<Output = Result<Option<NodeId>, HostError>>;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    #[error("Font {font} for node {node_id} could not be loaded")]
    FontUnavailable { node_id: String, font: String },
    #[error("Master component {reference} for instance {node_id} could not be resolved")]
    ComponentUnavailable { node_id: String, reference: String },
    #[error("Node {0} is not a text node")]
    NotText(String),
}

/// Side effects the core asks the host to perform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostCommand {
    #[serde(rename_all = "camelCase")]
    SetFontSize { node_id: String, font_size: f64 },
    #[serde(rename_all = "camelCase")]
    Select { node_id: String },
    #[serde(rename_all = "camelCase")]
    RevealInViewport { node_id: String },
}

impl HostCommand {
    pub fn node_id(&self) -> &str {
        match self {
            HostCommand::SetFontSize { node_id, .. }
            | HostCommand::Select { node_id }
            | HostCommand::RevealInViewport { node_id } => node_id,
        }
    }
}

/// Fire-and-forget channel into the host's command queue.
#[derive(Debug, Clone)]
pub struct CommandSink {
    tx: mpsc::UnboundedSender<HostCommand>,
}

impl CommandSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HostCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn request_font_size_change(&self, node_id: &str, font_size: f64) {
        self.send(HostCommand::SetFontSize {
            node_id: node_id.to_string(),
            font_size,
        });
    }

    pub fn request_select(&self, node_id: &str) {
        self.send(HostCommand::Select {
            node_id: node_id.to_string(),
        });
    }

    pub fn request_reveal_in_viewport(&self, node_id: &str) {
        self.send(HostCommand::RevealInViewport {
            node_id: node_id.to_string(),
        });
    }

    fn send(&self, command: HostCommand) {
        if let Err(err) = self.tx.send(command) {
            tracing::warn!(node_id = err.0.node_id(), "host command queue closed, dropping command");
        }
    }
}
