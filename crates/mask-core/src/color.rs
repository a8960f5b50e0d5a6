//! Paint colors for the editor preview and the submitted mask.

use serde::{Deserialize, Serialize};

/// Alpha used for the in-progress stroke preview.
pub const PREVIEW_ALPHA: f32 = 0.5;

/// Paint channel used in the editor overlay.
pub const EDITOR_PAINT: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);

/// Paint channel used in the submitted mask.
pub const MASK_PAINT: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with its alpha multiplied by `opacity` (clamped to [0, 1]).
    pub fn with_alpha(self, opacity: f32) -> Self {
        Self {
            a: (self.a * opacity).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Quantize to 8-bit channels.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}
