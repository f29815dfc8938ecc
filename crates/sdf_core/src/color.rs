//! RGBA colour type used for text fill, outline and shadow parameters.
//!
//! Stored as four `f32` values in linear light (0.0 – 1.0).  The text
//! renderer forwards these straight into the shader uniform block, so the
//! layout of [`Color::to_array`] is the layout the GPU sees.
//!
//! # Example
//! ```rust,ignore
//! use sdf_core::Color;
//!
//! let green   = Color::rgb(0.5, 0.8, 0.2);
//! let outline = Color::BLACK;
//! let shadow  = Color::BLACK.with_alpha(0.6);
//! ```

/// Linear-space RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    // ── Constructors ────────────────────────────────────────────────────────

    /// Opaque colour from red, green, blue components.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Colour from all four components.
    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    // ── Conversions ─────────────────────────────────────────────────────────

    /// Returns `[r, g, b, a]`.
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Quantise to 8-bit RGBA, as written into preview images.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    // ── Modifiers ───────────────────────────────────────────────────────────

    /// Return a new colour with the alpha channel replaced.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    // ── Palette ─────────────────────────────────────────────────────────────

    pub const WHITE:       Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK:       Self = Self::rgb(0.0, 0.0, 0.0);

    /// Background of the reference demo window.
    pub const SLATE:       Self = Self::rgb(0.2, 0.3, 0.3);
    pub const LIME:        Self = Self::rgb(0.5, 0.8, 0.2);
    pub const ORANGE:      Self = Self::rgb(1.0, 0.5, 0.2);
    pub const SKY:         Self = Self::rgb(0.3, 0.7, 0.9);
    pub const MAGENTA:     Self = Self::rgb(0.8, 0.2, 0.8);
}

impl From<[f32; 4]> for Color {
    fn from(a: [f32; 4]) -> Self {
        Self::rgba(a[0], a[1], a[2], a[3])
    }
}

impl From<[f32; 3]> for Color {
    fn from(a: [f32; 3]) -> Self {
        Self::rgb(a[0], a[1], a[2])
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_clamps_out_of_range() {
        let c = Color::rgba(1.5, -0.2, 0.5, 1.0);
        assert_eq!(c.to_rgba8(), [255, 0, 128, 255]);
    }

    #[test]
    fn array_conversions_keep_channel_order() {
        let c = Color::from([0.1, 0.2, 0.3, 0.4]);
        assert_eq!(c.to_array(), [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(Color::from([0.1, 0.2, 0.3]).a, 1.0);
        assert_eq!(Color::BLACK.with_alpha(0.6).a, 0.6);
    }
}
