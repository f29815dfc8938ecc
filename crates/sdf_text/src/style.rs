//! Per-call text styling.

use glam::Vec2;
use sdf_core::Color;

/// What the pen does when a character has no glyph entry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MissingGlyphPolicy {
    /// Leave the cursor where it is.
    #[default]
    Skip,
    /// Move the cursor by this many (unscaled) pixels.
    Advance(f32),
}

/// Shading and spacing parameters for one run of text.
///
/// `smoothness` and `outline_width` are distance thresholds around the 0.5
/// glyph edge; see [`crate::transfer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub outline_enabled: bool,
    pub shadow_enabled: bool,
    pub outline_width: f32,
    pub smoothness: f32,
    /// Shadow displacement in atlas texels, x right / y up.
    pub shadow_offset: Vec2,
    pub shadow_blur: f32,
    pub outline_color: Color,
    pub shadow_color: Color,
    /// Extra pixels added to every advance.
    pub letter_spacing: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            outline_enabled: true,
            shadow_enabled: false,
            outline_width: 0.03,
            smoothness: 0.005,
            shadow_offset: Vec2::new(2.0, 2.0),
            shadow_blur: 0.5,
            outline_color: Color::BLACK,
            shadow_color: Color::rgba(0.0, 0.0, 0.0, 0.6),
            letter_spacing: 2.0,
        }
    }
}

impl TextStyle {
    /// No outline, no shadow.
    pub fn plain() -> Self {
        Self {
            outline_enabled: false,
            ..Self::default()
        }
    }

    pub fn with_outline(mut self, width: f32, color: Color) -> Self {
        self.outline_enabled = true;
        self.outline_width = width;
        self.outline_color = color;
        self
    }

    pub fn without_outline(mut self) -> Self {
        self.outline_enabled = false;
        self
    }

    pub fn with_shadow(mut self, offset: Vec2, blur: f32, color: Color) -> Self {
        self.shadow_enabled = true;
        self.shadow_offset = offset;
        self.shadow_blur = blur;
        self.shadow_color = color;
        self
    }

    pub fn with_smoothness(mut self, smoothness: f32) -> Self {
        self.smoothness = smoothness;
        self
    }

    pub fn with_letter_spacing(mut self, spacing: f32) -> Self {
        self.letter_spacing = spacing;
        self
    }
}

/// One render request: a string plus where and how to draw it.
///
/// `origin` is the baseline start in pixels with y pointing up.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan<'a> {
    pub text: &'a str,
    pub origin: Vec2,
    pub scale: f32,
    pub color: Color,
    pub style: TextStyle,
}

impl<'a> TextSpan<'a> {
    pub fn new(text: &'a str, origin: Vec2) -> Self {
        Self {
            text,
            origin,
            scale: 1.0,
            color: Color::WHITE,
            style: TextStyle::default(),
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }
}
