//! Best-guess background color behind a node.
//!
//! The host has no flattened paint order, so the lookup tries three
//! heuristics in turn and stops at the first one that yields a color:
//!
//! 1. the direct parent's first visible solid fill;
//! 2. the nearest earlier sibling (lower paint order, hence behind) whose
//!    bounds overlap the node and that carries a visible solid fill;
//! 3. the nearest ancestor that renders its own background, skipping groups,
//!    components and instances.
//!
//! When all three come up empty the result is `None`. Callers decide what to
//! show in that case; nothing here falls back to white.

use crate::host::NodeTree;
use crate::model::{Color, NodeId, first_visible_solid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundSource {
    Parent(NodeId),
    SiblingBehind(NodeId),
    Ancestor(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBackground {
    pub color: Color,
    pub source: BackgroundSource,
}

pub fn resolve_background<T: NodeTree>(tree: &T, id: NodeId) -> Option<ResolvedBackground> {
    let parent = tree.parent(id)?;

    parent_fill(tree, parent)
        .or_else(|| sibling_behind(tree, id, parent))
        .or_else(|| ancestor_fill(tree, parent))
}

fn parent_fill<T: NodeTree>(tree: &T, parent: NodeId) -> Option<ResolvedBackground> {
    let color = first_visible_solid(tree.fills(parent)?)?;
    Some(ResolvedBackground {
        color,
        source: BackgroundSource::Parent(parent),
    })
}

/// Scan siblings painted before `id`, nearest index first.
fn sibling_behind<T: NodeTree>(tree: &T, id: NodeId, parent: NodeId) -> Option<ResolvedBackground> {
    let bounds = tree.bounding_box(id)?;
    let siblings = tree.children(parent);
    let position = siblings.iter().position(|&sibling| sibling == id)?;

    siblings[..position].iter().rev().find_map(|&sibling| {
        let sibling_bounds = tree.bounding_box(sibling)?;
        if !sibling_bounds.overlaps(bounds) {
            return None;
        }
        let color = first_visible_solid(tree.fills(sibling)?)?;
        Some(ResolvedBackground {
            color,
            source: BackgroundSource::SiblingBehind(sibling),
        })
    })
}

fn ancestor_fill<T: NodeTree>(tree: &T, start: NodeId) -> Option<ResolvedBackground> {
    let mut current = Some(start);
    while let Some(ancestor) = current {
        if !tree.node(ancestor).kind.is_pass_through() {
            if let Some(color) = tree.fills(ancestor).and_then(first_visible_solid) {
                return Some(ResolvedBackground {
                    color,
                    source: BackgroundSource::Ancestor(ancestor),
                });
            }
        }
        current = tree.parent(ancestor);
    }
    None
}
