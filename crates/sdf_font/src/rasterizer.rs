//! Rasterizer seam.  The atlas only needs coverage bitmaps plus bearing and
//! advance, so anything that can produce those implements
//! [`GlyphRasterizer`]; [`FontdueRasterizer`] is the TrueType/OpenType
//! backend used for real fonts.

use std::path::Path;

use glam::IVec2;

use crate::bitmap::GlyphBitmap;
use crate::error::{LoadError, RasterError};

/// Output of rasterizing one character.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGlyph {
    pub bitmap: GlyphBitmap,
    /// Offset from the pen origin to the bitmap's left/top edge, y up.
    pub bearing: IVec2,
    /// Horizontal advance in 1/64 pixel units.
    pub advance: i32,
}

pub trait GlyphRasterizer {
    fn rasterize(&mut self, code: u8) -> Result<RasterGlyph, RasterError>;
}

/// Rasterizes glyphs with `fontdue` at a fixed pixel size.
pub struct FontdueRasterizer {
    font: fontdue::Font,
    pixel_size: f32,
}

impl FontdueRasterizer {
    /// Reads and parses a font file.  Both I/O and parse failures map to
    /// [`LoadError::FontOpenFailed`].
    pub fn open(path: impl AsRef<Path>, pixel_size: u32) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| LoadError::FontOpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(&bytes, pixel_size).map_err(|reason| LoadError::FontOpenFailed {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_bytes(bytes: &[u8], pixel_size: u32) -> Result<Self, String> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| e.to_string())?;
        Ok(Self {
            font,
            pixel_size: pixel_size as f32,
        })
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn rasterize(&mut self, code: u8) -> Result<RasterGlyph, RasterError> {
        let ch = code as char;
        if self.font.lookup_glyph_index(ch) == 0 {
            return Err(RasterError::MissingGlyph);
        }

        let (metrics, coverage) = self.font.rasterize(ch, self.pixel_size);
        let width = metrics.width as u32;
        let height = metrics.height as u32;
        let actual = coverage.len();
        let bitmap = GlyphBitmap::new(width, height, coverage).ok_or(RasterError::MalformedBitmap {
            width,
            height,
            actual,
        })?;

        let (bearing, advance) = placement(&metrics);
        Ok(RasterGlyph {
            bitmap,
            bearing,
            advance,
        })
    }
}

/// Bearing and 26.6 fixed-point advance from fontdue metrics.
///
/// fontdue reports the bottom edge (`ymin`); the atlas wants the top.
fn placement(metrics: &fontdue::Metrics) -> (IVec2, i32) {
    let bearing = IVec2::new(metrics.xmin, metrics.ymin + metrics.height as i32);
    let advance = (metrics.advance_width * 64.0).round() as i32;
    (bearing, advance)
}
