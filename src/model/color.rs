use serde::{Deserialize, Serialize};

/// An sRGB color with integer channels in [0, 255].
///
/// Serialized as a `[r, g, b]` triple, which is how the host and the
/// report exporters exchange colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from unit-interval channels as the host stores them.
    /// Channels are rounded to the nearest integer and clamped.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: unit_to_channel(r),
            g: unit_to_channel(g),
            b: unit_to_channel(b),
        }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn unit_to_channel(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        color.channels()
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unit_rounds_and_clamps() {
        assert_eq!(Color::from_unit(1.0, 0.5, 0.0), Color::rgb(255, 128, 0));
        assert_eq!(Color::from_unit(1.2, -0.1, f64::NAN), Color::rgb(255, 0, 0));
        // Host-exported float noise still lands on the intended channel
        assert_eq!(
            Color::from_unit(0.11372549086809158, 0.15294118225574493, 0.20392157137393951),
            Color::rgb(29, 39, 52)
        );
    }

    #[test]
    fn test_serializes_as_triple() {
        let json = serde_json::to_string(&Color::rgb(29, 39, 52)).unwrap();
        assert_eq!(json, "[29,39,52]");
        let back: Color = serde_json::from_str("[236,236,236]").unwrap();
        assert_eq!(back, Color::rgb(236, 236, 236));
        assert_eq!(back.to_hex(), "#ececec");
    }
}
