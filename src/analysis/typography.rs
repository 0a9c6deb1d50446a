use crate::host::NodeTree;
use crate::model::{FontValue, NodeId};

/// Weight at or above which text is treated as bold.
pub const BOLD_WEIGHT: f64 = 700.0;

/// Inclusive: text exactly at the minimum is legible.
pub fn is_legible_size(font_size_px: f64, minimum: f64) -> bool {
    font_size_px >= minimum
}

/// Whether a text run, or any part of it, is bold.
///
/// A uniform weight is compared directly. A mixed weight is resolved by
/// querying each character offset in `start..end`; the first bold character
/// makes the whole run count as bold. Ranges outside the text, or empty ones,
/// are not bold.
pub fn is_bold<T: NodeTree>(
    weight: &FontValue<f64>,
    tree: &T,
    id: NodeId,
    start: usize,
    end: usize,
) -> bool {
    match weight {
        FontValue::Value(w) => *w >= BOLD_WEIGHT,
        FontValue::Mixed(_) => {
            let len = tree
                .characters(id)
                .map(|chars| chars.chars().count())
                .unwrap_or(0);
            if start >= end || end > len {
                tracing::warn!(start, end, len, "invalid range for mixed weight lookup");
                return false;
            }

            (start..end).any(|offset| {
                matches!(
                    tree.range_weight(id, offset, offset + 1),
                    Some(FontValue::Value(w)) if w >= BOLD_WEIGHT
                )
            })
        }
    }
}
