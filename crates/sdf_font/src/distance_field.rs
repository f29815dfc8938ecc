//! Brute-force distance field generation.
//!
//! Every texel of the padded output frame scans every covered texel of the
//! source bitmap.  That is O(padded area × covered area) per glyph, which is
//! fine because it runs once at load time and never per frame.

use crate::bitmap::GlyphBitmap;
use crate::packer::AtlasRegion;

/// Padded single-channel distance field for one glyph.
///
/// Size is `(w + 2·spread) × (h + 2·spread)`.  A byte of 255 sits on a
/// covered source pixel and values fall off linearly to 0 at `spread`
/// texels away from the nearest covered pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceField {
    width: u32,
    height: u32,
    spread: u32,
    data: Vec<u8>,
}

impl DistanceField {
    /// Generates the distance field for `bitmap`.
    ///
    /// Returns `None` for zero-sized bitmaps; the caller records an empty
    /// atlas region for those glyphs instead.
    pub fn generate(bitmap: &GlyphBitmap, spread: u32) -> Option<Self> {
        if bitmap.is_zero_sized() {
            return None;
        }

        let width = bitmap.width() + 2 * spread;
        let height = bitmap.height() + 2 * spread;
        let mut data = Vec::with_capacity(width as usize * height as usize);

        if spread == 0 {
            // Limit of the formula: covered texels saturate, everything else is 0.
            data.extend(
                bitmap
                    .coverage()
                    .iter()
                    .map(|&c| if c > 0 { 255 } else { 0 }),
            );
            return Some(Self {
                width,
                height,
                spread,
                data,
            });
        }

        let covered: Vec<(i64, i64)> = bitmap
            .covered_pixels()
            .map(|(x, y)| (x as i64, y as i64))
            .collect();

        let s = spread as i64;
        let max_sq = s * s;

        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let px = x - s;
                let py = y - s;

                // squared distances compare exactly; one sqrt at the end
                let mut best_sq = max_sq;
                for &(sx, sy) in &covered {
                    let dx = px - sx;
                    let dy = py - sy;
                    let d2 = dx * dx + dy * dy;
                    if d2 < best_sq {
                        best_sq = d2;
                        if best_sq == 0 {
                            break;
                        }
                    }
                }

                data.push(normalize(best_sq, spread));
            }
        }

        Some(Self {
            width,
            height,
            spread,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn spread(&self) -> u32 {
        self.spread
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }

    /// One row of the field, used by the packer to blit into the atlas.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = (y * self.width) as usize;
        &self.data[start..start + self.width as usize]
    }

    /// Copies a placed field back out of a packed atlas buffer.
    ///
    /// Returns `None` for empty regions or regions outside the buffer.
    pub fn from_region(pixels: &[u8], atlas_width: u32, region: AtlasRegion, spread: u32) -> Option<Self> {
        if region.is_empty() || region.x + region.width > atlas_width {
            return None;
        }
        let mut data = Vec::with_capacity(region.width as usize * region.height as usize);
        for y in region.y..region.y + region.height {
            let start = (y * atlas_width + region.x) as usize;
            data.extend_from_slice(pixels.get(start..start + region.width as usize)?);
        }
        Some(Self {
            width: region.width,
            height: region.height,
            spread,
            data,
        })
    }

    /// Coarse text rendering of the field for debug logs.
    ///
    /// Legend: `##` > 200, `**` > 150, `++` > 100, `..` > 50, blank otherwise.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize * 2 + 1) * self.height as usize);
        for y in 0..self.height {
            for &v in self.row(y) {
                out.push_str(match v {
                    201..=255 => "##",
                    151..=200 => "**",
                    101..=150 => "++",
                    51..=100 => "..",
                    _ => "  ",
                });
            }
            out.push('\n');
        }
        out
    }
}

/// `round(255 × clamp(1 − d/spread, 0, 1))` with `d = sqrt(best_sq)`.
fn normalize(best_sq: i64, spread: u32) -> u8 {
    let dist = (best_sq as f32).sqrt();
    let t = (1.0 - dist / spread as f32).clamp(0.0, 1.0);
    (255.0 * t).round() as u8
}
