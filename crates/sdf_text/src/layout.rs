//! Left-to-right placement of glyph quads along a baseline.

use glam::Vec2;
use sdf_core::Color;
use sdf_font::GlyphTable;

use crate::quad::GlyphQuad;
use crate::style::{MissingGlyphPolicy, TextSpan, TextStyle};

/// Cursor state for one render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenState {
    pub position: Vec2,
    pub scale: f32,
    pub color: Color,
    pub style: TextStyle,
}

impl PenState {
    pub fn new(span: &TextSpan<'_>) -> Self {
        Self {
            position: span.origin,
            scale: span.scale,
            color: span.color,
            style: span.style,
        }
    }

    /// Moves right by a glyph advance plus letter spacing.
    pub fn advance(&mut self, advance_px: i32) {
        self.position.x += (advance_px as f32 + self.style.letter_spacing) * self.scale;
    }
}

/// A character with no entry in the glyph table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphNotFound {
    /// Character index within the span text.
    pub index: usize,
    pub ch: char,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub quads: Vec<GlyphQuad>,
    pub missing: Vec<GlyphNotFound>,
    /// Pen after the last character.
    pub pen: PenState,
}

/// Lays `span` out against `table`.
///
/// Blank glyphs move the pen without producing a quad.
pub fn layout_text(table: &GlyphTable, span: &TextSpan<'_>, policy: MissingGlyphPolicy) -> TextLayout {
    let mut pen = PenState::new(span);
    let mut quads = Vec::with_capacity(span.text.len());
    let mut missing = Vec::new();

    for (index, ch) in span.text.chars().enumerate() {
        let Some(entry) = table.get_char(ch) else {
            missing.push(GlyphNotFound { index, ch });
            if let MissingGlyphPolicy::Advance(px) = policy {
                pen.position.x += px * pen.scale;
            }
            continue;
        };
        if !entry.is_blank() {
            quads.push(GlyphQuad::new(entry, pen.position, pen.scale));
        }
        pen.advance(entry.advance_px());
    }

    TextLayout { quads, missing, pen }
}

/// Horizontal extent of `text` at `scale`, trailing letter spacing included.
pub fn measure(table: &GlyphTable, text: &str, scale: f32, style: &TextStyle, policy: MissingGlyphPolicy) -> f32 {
    text.chars()
        .map(|ch| match (table.get_char(ch), policy) {
            (Some(entry), _) => (entry.advance_px() as f32 + style.letter_spacing) * scale,
            (None, MissingGlyphPolicy::Advance(px)) => px * scale,
            (None, MissingGlyphPolicy::Skip) => 0.0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;
    use sdf_font::{AtlasRegion, GlyphEntry, TextureHandle, UvRect};

    fn table() -> GlyphTable {
        let mut table = GlyphTable::new();
        let texture = TextureHandle::from_raw(1);
        let glyph = |w: i32, h: i32, advance_px: i32| GlyphEntry {
            texture,
            size: IVec2::new(w, h),
            bearing: IVec2::new(0, h),
            advance: advance_px * 64,
            region: AtlasRegion {
                x: 0,
                y: 0,
                width: w as u32,
                height: h as u32,
            },
            uv: UvRect::default(),
        };
        table.insert(b'A', glyph(20, 30, 24));
        table.insert(b'B', glyph(18, 30, 20));
        table.insert(b' ', glyph(0, 0, 10));
        table
    }

    #[test]
    fn single_glyph_is_entry_size_times_scale() {
        let table = table();
        let span = TextSpan::new("A", Vec2::new(25.0, 500.0));
        let layout = layout_text(&table, &span, MissingGlyphPolicy::Skip);
        assert_eq!(layout.quads.len(), 1);
        assert_eq!(layout.quads[0].size(), Vec2::new(20.0, 30.0));
        assert_eq!(layout.quads[0].min(), Vec2::new(25.0, 500.0));
        // (24 + 2 spacing)·1
        assert_eq!(layout.pen.position.x, 51.0);
    }

    #[test]
    fn scale_applies_to_advance_and_spacing() {
        let table = table();
        let span = TextSpan::new("AB", Vec2::ZERO).with_scale(0.5);
        let layout = layout_text(&table, &span, MissingGlyphPolicy::Skip);
        assert_eq!(layout.quads.len(), 2);
        assert_eq!(layout.quads[1].min().x, 13.0);
        assert_eq!(layout.quads[1].size(), Vec2::new(9.0, 15.0));
        assert_eq!(layout.pen.position.x, 13.0 + 11.0);
    }

    #[test]
    fn blank_glyph_advances_without_quad() {
        let table = table();
        let span = TextSpan::new("A A", Vec2::ZERO);
        let layout = layout_text(&table, &span, MissingGlyphPolicy::Skip);
        assert_eq!(layout.quads.len(), 2);
        assert_eq!(layout.quads[1].min().x, 26.0 + 12.0);
    }

    #[test]
    fn unknown_code_is_reported_and_cursor_stays() {
        let table = table();
        let text = String::from(char::from_u32(200).unwrap());
        let span = TextSpan::new(&text, Vec2::new(5.0, 5.0));
        let layout = layout_text(&table, &span, MissingGlyphPolicy::Skip);
        assert!(layout.quads.is_empty());
        assert_eq!(layout.missing, vec![GlyphNotFound { index: 0, ch: 'È' }]);
        assert_eq!(layout.pen.position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn advance_policy_moves_past_missing() {
        let table = table();
        let span = TextSpan::new("AzB", Vec2::ZERO).with_scale(2.0);
        let layout = layout_text(&table, &span, MissingGlyphPolicy::Advance(8.0));
        assert_eq!(layout.missing.len(), 1);
        assert_eq!(layout.quads[1].min().x, 52.0 + 16.0);

        let skipped = layout_text(&table, &span, MissingGlyphPolicy::Skip);
        assert_eq!(skipped.quads[1].min().x, 52.0);
    }

    #[test]
    fn measure_matches_layout_pen() {
        let table = table();
        let style = TextStyle::default();
        for policy in [MissingGlyphPolicy::Skip, MissingGlyphPolicy::Advance(6.0)] {
            let span = TextSpan::new("AB z A", Vec2::new(3.0, 0.0)).with_scale(1.5);
            let layout = layout_text(&table, &span, policy);
            let width = measure(&table, span.text, 1.5, &style, policy);
            assert!((layout.pen.position.x - 3.0 - width).abs() < 1e-4);
        }
    }
}
