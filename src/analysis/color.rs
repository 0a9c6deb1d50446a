//! WCAG relative luminance, contrast ratio and compliance tiers.

use crate::model::{Color, Compliance, ContrastResult, FontValue};

/// Text at or above this size counts as large regardless of weight.
pub const LARGE_TEXT_PX: f64 = 18.0;
/// Bold text at or above this size counts as large.
pub const LARGE_BOLD_TEXT_PX: f64 = 14.0;

pub fn relative_luminance(color: Color) -> f64 {
    let [r, g, b] = color.channels().map(channel_to_linear);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

fn channel_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Symmetric contrast ratio in [1, 21].
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

pub fn is_large_text(font_size_px: f64, is_bold: bool) -> bool {
    font_size_px >= LARGE_TEXT_PX || (is_bold && font_size_px >= LARGE_BOLD_TEXT_PX)
}

/// Compliance tier for a ratio. A non-finite font size fails closed.
pub fn compliance_tier(ratio: f64, font_size_px: f64, is_bold: bool) -> Compliance {
    if !font_size_px.is_finite() || !ratio.is_finite() {
        return Compliance::Fail;
    }

    if is_large_text(font_size_px, is_bold) {
        if ratio >= 4.5 {
            Compliance::AaaLarge
        } else if ratio >= 3.0 {
            Compliance::AaLarge
        } else {
            Compliance::Fail
        }
    } else if ratio >= 7.0 {
        Compliance::Aaa
    } else if ratio >= 4.5 {
        Compliance::Aa
    } else {
        Compliance::Fail
    }
}

/// Evaluate a text/background pair for a font size as the host reports it.
///
/// A mixed or non-finite font size yields `Fail` with ratio 0.
pub fn evaluate_contrast(
    foreground: Color,
    background: Color,
    font_size: &FontValue<f64>,
    is_bold: bool,
) -> ContrastResult {
    match font_size.number() {
        Some(size) if size.is_finite() => {
            let ratio = contrast_ratio(foreground, background);
            ContrastResult {
                ratio,
                compliance: compliance_tier(ratio, size, is_bold),
            }
        }
        _ => {
            tracing::debug!(?font_size, "font size cannot be evaluated, failing closed");
            ContrastResult {
                ratio: 0.0,
                compliance: Compliance::Fail,
            }
        }
    }
}
