use crate::config::Thresholds;
use crate::host::{DocumentHost, HostError, NodeTree};
use crate::model::{Issue, Node, NodeData, NodeId, NodeKind, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchTargetIssueKind {
    Size,
    Spacing,
}

fn name_matches(name: &str, keywords: &[String]) -> bool {
    let lower = name.to_lowercase();
    keywords.iter().any(|keyword| lower.contains(keyword.as_str()))
}

/// Whether a node looks interactive.
///
/// Matches on the node's own name (text nodes excluded), or for an instance
/// on the name of its master component. Keywords are expected lowercase.
pub async fn is_touch_target_candidate<H: DocumentHost>(
    host: &H,
    id: NodeId,
    keywords: &[String],
) -> Result<bool, HostError> {
    let node = host.node(id);

    if node.kind != NodeKind::Text && name_matches(node.name_or_empty(), keywords) {
        return Ok(true);
    }

    if node.kind == NodeKind::Instance {
        if let Some(master) = host.resolve_master_component(id).await? {
            return Ok(name_matches(host.node(master).name_or_empty(), keywords));
        }
    }

    Ok(false)
}

pub fn is_too_small(node: &Node, min_size: f64) -> bool {
    node.bounds()
        .is_some_and(|b| b.width < min_size || b.height < min_size)
}

fn axis_overlap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    (a_end.min(b_end) - a_start.max(b_start)).max(0.0)
}

/// Signed edge-to-edge separation along one axis, negative when the spans
/// intersect.
fn edge_gap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    (b_start - a_end).max(a_start - b_end)
}

fn too_close(a: &Rect, b: &Rect, min_spacing: f64) -> bool {
    let vertical_overlap = axis_overlap(a.y, a.bottom(), b.y, b.bottom());
    if vertical_overlap > 0.0 && edge_gap(a.x, a.right(), b.x, b.right()) < min_spacing {
        return true;
    }

    let horizontal_overlap = axis_overlap(a.x, a.right(), b.x, b.right());
    horizontal_overlap > 0.0 && edge_gap(a.y, a.bottom(), b.y, b.bottom()) < min_spacing
}

/// Whether any other node in `pool` sits closer than `min_spacing`.
///
/// Only neighbours sharing vertical space are measured horizontally, and
/// only neighbours sharing horizontal space are measured vertically.
pub fn is_too_close<T: NodeTree>(tree: &T, id: NodeId, pool: &[NodeId], min_spacing: f64) -> bool {
    let Some(bounds) = tree.bounding_box(id) else {
        return false;
    };

    pool.iter()
        .filter(|&&other| other != id)
        .filter_map(|&other| tree.bounding_box(other))
        .any(|other| too_close(bounds, other, min_spacing))
}

/// Build a touch target issue, or `None` for a node without a usable identity.
pub fn build_touch_target_issue(
    node: &Node,
    kind: TouchTargetIssueKind,
    thresholds: &Thresholds,
) -> Option<Issue> {
    if node.id.is_empty() || node.name_or_empty().is_empty() {
        tracing::warn!(
            node_id = %node.id,
            ?kind,
            "touch target without a stable id or name, not reporting"
        );
        return None;
    }

    let data = NodeData::for_node(node);
    Some(match kind {
        TouchTargetIssueKind::Size => Issue::touch_target_size(data, thresholds.min_touch_target),
        TouchTargetIssueKind::Spacing => Issue::touch_target_spacing(
            data,
            thresholds.min_touch_target,
            thresholds.min_touch_spacing,
        ),
    })
}
