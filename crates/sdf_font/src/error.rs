use std::path::PathBuf;

use thiserror::Error;

use crate::atlas::FontAtlas;

/// Why a single glyph could not be rasterized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    #[error("font has no glyph for this code")]
    MissingGlyph,
    #[error("rasterizer returned {actual} coverage bytes for a {width}x{height} bitmap")]
    MalformedBitmap {
        width: u32,
        height: u32,
        actual: usize,
    },
}

/// One character dropped from the table during a load.  Never fatal: the
/// character simply renders as "not found".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("glyph {code} ({ch:?}) could not be rasterized: {reason}")]
pub struct GlyphRasterFailed {
    pub code: u8,
    pub ch: char,
    pub reason: RasterError,
}

impl GlyphRasterFailed {
    pub fn new(code: u8, reason: RasterError) -> Self {
        Self {
            code,
            ch: code as char,
            reason,
        }
    }
}

/// Texture upload failures reported by a [`crate::TextureStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("expected {expected} texel bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("texture {width}x{height} has no texels")]
    ZeroSized { width: u32, height: u32 },
    #[error("texture {width}x{height} exceeds the device limit of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

#[derive(Debug, Error)]
pub enum LoadError {
    /// The font file is missing or could not be parsed.  Nothing was
    /// allocated.
    #[error("failed to open font {}: {reason}", path.display())]
    FontOpenFailed { path: PathBuf, reason: String },

    /// The atlas filled up before every glyph was placed.  `partial` holds
    /// the usable atlas with everything placed so far (texture already
    /// uploaded); the caller decides whether to keep it.
    #[error("atlas overflow: placed {placed} glyphs, codes {first_unplaced}..128 did not fit")]
    AtlasOverflow {
        placed: usize,
        first_unplaced: u8,
        partial: Box<FontAtlas>,
    },

    #[error("atlas upload failed: {0}")]
    Upload(#[from] UploadError),
}

impl LoadError {
    /// Recovers the partially filled atlas of an [`LoadError::AtlasOverflow`].
    pub fn into_partial(self) -> Option<FontAtlas> {
        match self {
            LoadError::AtlasOverflow { partial, .. } => Some(*partial),
            _ => None,
        }
    }
}
