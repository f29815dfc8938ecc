use std::ops::Range;

use sdf_font::TextureHandle;

use crate::quad::{GlyphQuad, GlyphVertex};
use crate::uniforms::TextUniforms;

/// Quads of one render call, drawn with one uniform block and one atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub texture: TextureHandle,
    pub uniforms: TextUniforms,
    /// Indices into [`TextBatch::quads`].
    pub quads: Range<usize>,
}

/// Glyph quads collected over a frame, uploaded to the GPU in one write.
#[derive(Debug, Default, Clone)]
pub struct TextBatch {
    quads: Vec<GlyphQuad>,
    runs: Vec<TextRun>,
}

impl TextBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.quads.clear();
        self.runs.clear();
    }

    /// Appends a run.  Empty runs are dropped.
    pub fn push_run<I>(&mut self, texture: TextureHandle, uniforms: TextUniforms, quads: I)
    where
        I: IntoIterator<Item = GlyphQuad>,
    {
        let start = self.quads.len();
        self.quads.extend(quads);
        let end = self.quads.len();
        if end > start {
            self.runs.push(TextRun {
                texture,
                uniforms,
                quads: start..end,
            });
        }
    }

    /// Number of glyph quads.
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn quads(&self) -> &[GlyphQuad] {
        &self.quads
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn vertex_count(&self) -> u32 {
        self.quads.len() as u32 * GlyphQuad::VERTEX_COUNT
    }

    pub fn vertices(&self) -> &[GlyphVertex] {
        bytemuck::cast_slice(&self.quads)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.quads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::TextStyle;
    use bytemuck::Zeroable;
    use sdf_core::Color;

    #[test]
    fn runs_index_into_shared_quads() {
        let mut batch = TextBatch::new();
        let tex = TextureHandle::from_raw(1);
        let u = TextUniforms::new(Color::WHITE, &TextStyle::default());
        batch.push_run(tex, u, vec![GlyphQuad::zeroed(); 3]);
        batch.push_run(tex, u, Vec::new());
        batch.push_run(tex, u, vec![GlyphQuad::zeroed(); 2]);

        assert_eq!(batch.len(), 5);
        assert_eq!(batch.runs().len(), 2);
        assert_eq!(batch.runs()[1].quads, 3..5);
        assert_eq!(batch.vertex_count(), 30);
        assert_eq!(batch.vertices().len(), 30);
        assert_eq!(batch.as_bytes().len(), 30 * 16);

        batch.clear();
        assert!(batch.is_empty());
        assert!(batch.runs().is_empty());
    }
}
