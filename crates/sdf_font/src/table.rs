use std::ops::Range;

use glam::IVec2;

use crate::packer::{AtlasRegion, UvRect};
use crate::texture::TextureHandle;

/// First character code loaded into a table (space).
pub const FIRST_CODE: u8 = 32;
/// One past the last loaded code.
pub const END_CODE: u8 = 128;
pub const CHAR_RANGE: Range<u8> = FIRST_CODE..END_CODE;

const SLOTS: usize = (END_CODE - FIRST_CODE) as usize;

/// Everything the renderer needs to place and texture one glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphEntry {
    /// The shared atlas texture.
    pub texture: TextureHandle,
    /// Size of the padded distance field in texels; zero for blank glyphs.
    pub size: IVec2,
    /// Offset from the pen origin to the left/top of the glyph bitmap.
    pub bearing: IVec2,
    /// Horizontal advance in 1/64 pixel units.
    pub advance: i32,
    pub region: AtlasRegion,
    pub uv: UvRect,
}

impl GlyphEntry {
    /// Advance in whole pixels (`advance >> 6`).
    #[inline]
    pub fn advance_px(&self) -> i32 {
        self.advance >> 6
    }

    /// Glyphs without a bitmap (space) advance the pen but draw nothing.
    pub fn is_blank(&self) -> bool {
        self.size.x == 0 || self.size.y == 0
    }
}

/// Character code → [`GlyphEntry`] for the printable ASCII range.
///
/// Backed by a fixed slot array, so lookups of codes outside 32..128 (and
/// of any non-ASCII `char`) simply miss.
#[derive(Debug, Clone)]
pub struct GlyphTable {
    slots: [Option<GlyphEntry>; SLOTS],
    len: usize,
}

impl Default for GlyphTable {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphTable {
    pub fn new() -> Self {
        Self {
            slots: [None; SLOTS],
            len: 0,
        }
    }

    fn slot(code: u32) -> Option<usize> {
        let first = FIRST_CODE as u32;
        let end = END_CODE as u32;
        (first..end).contains(&code).then(|| (code - first) as usize)
    }

    /// Stores `entry` for `code`.  Returns `false` (and stores nothing) when
    /// the code lies outside the table range.
    pub fn insert(&mut self, code: u8, entry: GlyphEntry) -> bool {
        let Some(i) = Self::slot(code as u32) else {
            return false;
        };
        if self.slots[i].replace(entry).is_none() {
            self.len += 1;
        }
        true
    }

    pub fn get(&self, code: u32) -> Option<&GlyphEntry> {
        Self::slot(code).and_then(|i| self.slots[i].as_ref())
    }

    #[inline]
    pub fn get_char(&self, ch: char) -> Option<&GlyphEntry> {
        self.get(ch as u32)
    }

    pub fn contains(&self, ch: char) -> bool {
        self.get_char(ch).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &GlyphEntry)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (FIRST_CODE + i as u8, e)))
    }
}
