pub mod aggregate;
mod background;
pub mod color;
mod engine;
mod touch_target;
pub mod typography;

pub use aggregate::{count_by_type, group_by_type, reportable};
pub use background::{BackgroundSource, ResolvedBackground, resolve_background};
pub use color::{compliance_tier, contrast_ratio, evaluate_contrast, relative_luminance};
pub use engine::{DetectionEngine, ScanScope, collect_preorder};
pub use touch_target::{
    TouchTargetIssueKind, build_touch_target_issue, is_too_close, is_too_small,
    is_touch_target_candidate,
};
pub use typography::{is_bold, is_legible_size};
