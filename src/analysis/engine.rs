//! One detection pass over a document or a selection.
//!
//! Nodes are visited in pre-order. Each node's checks run inside their own
//! failure boundary: a node whose font or master component cannot be resolved
//! is logged and skipped, and the pass carries on with the rest. Per-node
//! host calls are fanned out concurrently and joined in input order, so the
//! order of the resulting issues never depends on which call finishes first.

use super::background::resolve_background;
use super::color::evaluate_contrast;
use super::touch_target::{
    TouchTargetIssueKind, build_touch_target_issue, is_too_close, is_too_small,
    is_touch_target_candidate,
};
use super::typography::{is_bold, is_legible_size};
use crate::config::Config;
use crate::host::{DocumentHost, NodeTree};
use crate::model::{
    Capability, Color, FontValue, Issue, NodeData, NodeId, NodeKind, ScanNotice, ScanReport,
    first_visible_solid,
};
use futures::future::join_all;
use std::collections::HashSet;

/// What a pass covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanScope {
    Document,
    /// The given nodes and everything beneath them.
    Nodes(Vec<NodeId>),
}

pub struct DetectionEngine {
    config: Config,
}

#[derive(Debug, Default)]
struct NodeOutcome {
    issues: Vec<Issue>,
    notice: Option<ScanNotice>,
    skipped: bool,
}

impl NodeOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }
}

impl DetectionEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn scan<H: DocumentHost>(&self, host: &H, scope: &ScanScope) -> ScanReport {
        let starts = match scope {
            ScanScope::Document => host.roots(),
            ScanScope::Nodes(nodes) => nodes.as_slice(),
        };
        let nodes = collect_preorder(host, starts);
        tracing::debug!(nodes = nodes.len(), ?scope, "starting detection pass");

        let text_outcomes = join_all(nodes.iter().map(|&id| self.check_text(host, id))).await;
        let (pool, mut skipped) = self.touch_candidates(host, &nodes).await;
        let pool_set: HashSet<NodeId> = pool.iter().copied().collect();

        let mut report = ScanReport {
            document_name: host.document_name().to_string(),
            ..Default::default()
        };

        for (&id, outcome) in nodes.iter().zip(text_outcomes) {
            report.issues.extend(outcome.issues);
            report.notices.extend(outcome.notice);
            if outcome.skipped {
                skipped += 1;
            }

            if pool_set.contains(&id) {
                report.issues.extend(self.check_touch_target(host, id, &pool));
            }
        }

        report.skipped = skipped;
        tracing::info!(
            issues = report.issues.len(),
            notices = report.notices.len(),
            skipped = report.skipped,
            "detection pass finished"
        );
        report
    }

    async fn check_text<H: DocumentHost>(&self, host: &H, id: NodeId) -> NodeOutcome {
        let node = host.node(id);
        if node.kind != NodeKind::Text {
            return NodeOutcome::default();
        }

        let Some(text) = node.text() else {
            tracing::debug!(node_id = %node.id, "text node without font metrics, skipping");
            return NodeOutcome::skipped();
        };

        if matches!(text.font_name, Some(FontValue::Mixed(_))) {
            tracing::debug!(node_id = %node.id, "text node mixes font families, skipping");
            return NodeOutcome::skipped();
        }

        if let Err(err) = host.load_font(id).await {
            tracing::warn!(node_id = %node.id, error = %err, "skipping text node");
            return NodeOutcome::skipped();
        }

        let mut outcome = NodeOutcome::default();

        if let Some(size) = text.font_size.number() {
            if !is_legible_size(size, self.config.thresholds.min_font_size) {
                outcome.issues.push(Issue::typography(NodeData::for_node(node)));
            }
        }

        let foreground = node
            .fills()
            .and_then(first_visible_solid)
            .unwrap_or(Color::BLACK);

        let Some(background) = resolve_background(host, id) else {
            tracing::debug!(node_id = %node.id, "no background detected");
            outcome.notice = Some(ScanNotice::NoBackgroundDetected {
                node_id: node.id.clone(),
                name: node.name_or_empty().to_string(),
            });
            return outcome;
        };

        let len = text.char_count();
        let bold = len > 0 && is_bold(&text.font_weight, host, id, 0, len);
        let result = evaluate_contrast(foreground, background.color, &text.font_size, bold);

        if result.compliance.is_fail() {
            outcome.issues.push(Issue::contrast(
                NodeData::for_node(node),
                result,
                foreground,
                background.color,
            ));
        }

        outcome
    }

    /// Nodes that look interactive, in pre-order, plus how many could not be
    /// classified.
    async fn touch_candidates<H: DocumentHost>(
        &self,
        host: &H,
        nodes: &[NodeId],
    ) -> (Vec<NodeId>, usize) {
        let keywords = &self.config.touch_target_keywords;
        let with_geometry: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|&id| host.node(id).has(Capability::Geometry))
            .collect();

        let verdicts = join_all(
            with_geometry
                .iter()
                .map(|&id| is_touch_target_candidate(host, id, keywords)),
        )
        .await;

        let mut pool = Vec::new();
        let mut skipped = 0;
        for (id, verdict) in with_geometry.into_iter().zip(verdicts) {
            match verdict {
                Ok(true) => pool.push(id),
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(node_id = %host.node(id).id, error = %err, "skipping touch target check");
                    skipped += 1;
                }
            }
        }
        (pool, skipped)
    }

    fn check_touch_target<T: NodeTree>(&self, tree: &T, id: NodeId, pool: &[NodeId]) -> Vec<Issue> {
        let thresholds = &self.config.thresholds;
        let node = tree.node(id);
        let mut issues = Vec::new();

        if is_too_small(node, thresholds.min_touch_target) {
            issues.extend(build_touch_target_issue(node, TouchTargetIssueKind::Size, thresholds));
        }
        if is_too_close(tree, id, pool, thresholds.min_touch_spacing) {
            issues.extend(build_touch_target_issue(
                node,
                TouchTargetIssueKind::Spacing,
                thresholds,
            ));
        }
        issues
    }
}

/// Every node under `starts`, once each, in document pre-order.
///
/// Arena ids are assigned in pre-order, so sorting them restores document
/// order when a selection lists a descendant before its ancestor.
pub fn collect_preorder<T: NodeTree>(tree: &T, starts: &[NodeId]) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut stack: Vec<NodeId> = starts.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        order.push(id);
        stack.extend(tree.children(id).iter().rev());
    }

    order.sort_unstable();
    order
}
