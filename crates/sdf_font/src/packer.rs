//! Greedy shelf packing of distance fields into one fixed-size atlas.
//!
//! Glyphs are placed left to right in the order they are inserted (the
//! loader inserts in character-code order).  When a glyph does not fit in
//! the remaining width the cursor wraps to a new shelf whose top is the
//! tallest glyph placed since the previous wrap.  Nothing is ever moved
//! once placed, so the layout is a pure function of the glyph sizes and the
//! atlas dimensions.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::distance_field::DistanceField;

/// Texel rectangle inside the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct AtlasRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRegion {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `true` when both rectangles share at least one texel.
    pub fn intersects(&self, other: &AtlasRegion) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    pub fn fits_within(&self, atlas_width: u32, atlas_height: u32) -> bool {
        self.x + self.width <= atlas_width && self.y + self.height <= atlas_height
    }

    /// Normalised texture coordinates of this region.  Empty regions map to
    /// the zero rect.
    pub fn uv(&self, atlas_width: u32, atlas_height: u32) -> UvRect {
        if self.is_empty() {
            return UvRect::default();
        }
        let w = atlas_width as f32;
        let h = atlas_height as f32;
        UvRect {
            u0: self.x as f32 / w,
            v0: self.y as f32 / h,
            u1: (self.x + self.width) as f32 / w,
            v1: (self.y + self.height) as f32 / h,
        }
    }
}

/// Normalised `(u0, v0) – (u1, v1)` rectangle; `v` grows downwards, matching
/// the row order of the atlas buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    pub fn is_zero(&self) -> bool {
        *self == UvRect::default()
    }
}

/// The atlas ran out of room.  Reported for the glyph that did not fit and
/// for every insert after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("atlas full: glyph {code} ({width}x{height}) does not fit")]
pub struct AtlasFull {
    pub code: u8,
    pub width: u32,
    pub height: u32,
}

pub struct AtlasPacker {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    regions: BTreeMap<u8, AtlasRegion>,
    first_unplaced: Option<u8>,
}

impl AtlasPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            cursor_x: 0,
            cursor_y: 0,
            row_height: 0,
            regions: BTreeMap::new(),
            first_unplaced: None,
        }
    }

    /// Places one glyph.  `None` (a zero-sized glyph) records an empty
    /// region without consuming atlas space.
    ///
    /// Once a glyph has failed to fit the packer is closed: every later call
    /// fails as well, so placement never skips ahead in code order.
    pub fn insert(&mut self, code: u8, field: Option<&DistanceField>) -> Result<AtlasRegion, AtlasFull> {
        debug_assert!(
            self.regions.keys().next_back().map_or(true, |&last| code > last),
            "glyphs must be inserted in increasing code order"
        );

        let (gw, gh) = field.map_or((0, 0), |f| (f.width(), f.height()));
        let full = AtlasFull {
            code,
            width: gw,
            height: gh,
        };
        if self.first_unplaced.is_some() {
            return Err(full);
        }

        let Some(field) = field else {
            let region = AtlasRegion::default();
            self.regions.insert(code, region);
            return Ok(region);
        };

        if self.cursor_x + gw > self.width {
            self.cursor_x = 0;
            self.cursor_y += self.row_height;
            self.row_height = 0;
        }

        // a glyph wider than the atlas can never fit, even on a fresh shelf
        if gw > self.width || self.cursor_y + gh > self.height {
            log::error!(
                "atlas {}x{} too small: glyph {} ({}x{}) does not fit at y={}",
                self.width,
                self.height,
                code,
                gw,
                gh,
                self.cursor_y
            );
            self.first_unplaced = Some(code);
            return Err(full);
        }

        let region = AtlasRegion {
            x: self.cursor_x,
            y: self.cursor_y,
            width: gw,
            height: gh,
        };
        self.blit(&region, field);
        self.regions.insert(code, region);

        self.cursor_x += gw;
        self.row_height = self.row_height.max(gh);
        Ok(region)
    }

    fn blit(&mut self, region: &AtlasRegion, field: &DistanceField) {
        let stride = self.width as usize;
        for row in 0..region.height {
            let dst = (region.y + row) as usize * stride + region.x as usize;
            self.pixels[dst..dst + region.width as usize].copy_from_slice(field.row(row));
        }
    }

    pub fn finish(self) -> PackedAtlas {
        PackedAtlas {
            width: self.width,
            height: self.height,
            pixels: self.pixels,
            regions: self.regions,
            first_unplaced: self.first_unplaced,
        }
    }

    /// Packs a whole code-ordered glyph sequence, stopping at the first
    /// glyph that does not fit.
    pub fn pack<'a, I>(width: u32, height: u32, glyphs: I) -> PackedAtlas
    where
        I: IntoIterator<Item = (u8, Option<&'a DistanceField>)>,
    {
        let mut packer = Self::new(width, height);
        for (code, field) in glyphs {
            if packer.insert(code, field).is_err() {
                break;
            }
        }
        packer.finish()
    }
}

/// Result of a packing pass: the flat atlas buffer plus one region per
/// placed code.
#[derive(Debug, Clone)]
pub struct PackedAtlas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub regions: BTreeMap<u8, AtlasRegion>,
    pub first_unplaced: Option<u8>,
}

impl PackedAtlas {
    pub fn overflowed(&self) -> bool {
        self.first_unplaced.is_some()
    }

    pub fn uv(&self, code: u8) -> Option<UvRect> {
        self.regions
            .get(&code)
            .map(|r| r.uv(self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::GlyphBitmap;

    /// Distance field with a given padded size, every texel set to `fill`.
    fn field(w: u32, h: u32, fill: u8) -> DistanceField {
        // spread 0 keeps the field the same size as the bitmap
        DistanceField::generate(&GlyphBitmap::from_fn(w, h, |_, _| fill), 0).unwrap()
    }

    fn sizes() -> Vec<(u32, u32)> {
        (0..96u32)
            .map(|i| (10 + (i * 7) % 40, 12 + (i * 13) % 45))
            .collect()
    }

    #[test]
    fn shelf_wraps_at_atlas_width() {
        let a = field(40, 10, 255);
        let b = field(40, 20, 255);
        let c = field(40, 5, 255);
        let packed = AtlasPacker::pack(100, 100, [(65, Some(&a)), (66, Some(&b)), (67, Some(&c))]);
        assert_eq!(packed.regions[&65], AtlasRegion { x: 0, y: 0, width: 40, height: 10 });
        assert_eq!(packed.regions[&66], AtlasRegion { x: 40, y: 0, width: 40, height: 20 });
        // shelf height is the tallest glyph since the last wrap
        assert_eq!(packed.regions[&67], AtlasRegion { x: 0, y: 20, width: 40, height: 5 });
    }

    #[test]
    fn copies_field_bytes_into_place() {
        let a = field(2, 2, 255);
        let b = field(3, 1, 255);
        let packed = AtlasPacker::pack(4, 4, [(33, Some(&a)), (34, Some(&b))]);
        // b wrapped to (0, 2)
        let expected: [u8; 16] = [
            255, 255, 0, 0, //
            255, 255, 0, 0, //
            255, 255, 255, 0, //
            0, 0, 0, 0,
        ];
        assert_eq!(packed.pixels, expected);
    }

    #[test]
    fn packing_is_deterministic() {
        let fields: Vec<_> = sizes().into_iter().map(|(w, h)| field(w, h, 128)).collect();
        let run = || {
            AtlasPacker::pack(
                512,
                512,
                fields.iter().enumerate().map(|(i, f)| (32 + i as u8, Some(f))),
            )
        };
        let first = run();
        let second = run();
        assert_eq!(first.regions, second.regions);
        assert_eq!(first.pixels, second.pixels);
    }

    #[test]
    fn regions_never_overlap_and_stay_inside() {
        let fields: Vec<_> = sizes().into_iter().map(|(w, h)| field(w, h, 200)).collect();
        let packed = AtlasPacker::pack(
            1024,
            1024,
            fields.iter().enumerate().map(|(i, f)| (32 + i as u8, Some(f))),
        );
        assert!(!packed.overflowed());
        let regions: Vec<_> = packed.regions.values().copied().collect();
        for (i, a) in regions.iter().enumerate() {
            assert!(a.fits_within(1024, 1024));
            for b in &regions[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn uv_rects_are_normalised() {
        let fields: Vec<_> = sizes().into_iter().map(|(w, h)| field(w, h, 1)).collect();
        let packed = AtlasPacker::pack(
            1024,
            1024,
            fields.iter().enumerate().map(|(i, f)| (32 + i as u8, Some(f))),
        );
        for code in packed.regions.keys() {
            let uv = packed.uv(*code).unwrap();
            assert!(uv.u0 >= 0.0 && uv.u1 <= 1.0 && uv.v0 >= 0.0 && uv.v1 <= 1.0);
            assert!(uv.u0 < uv.u1 && uv.v0 < uv.v1);
        }
    }

    #[test]
    fn overflow_stops_placement() {
        let big = field(60, 60, 255);
        let mut packer = AtlasPacker::new(100, 100);
        assert!(packer.insert(40, Some(&big)).is_ok());
        // wraps to y=60, 60+60 > 100
        let err = packer.insert(41, Some(&big)).unwrap_err();
        assert_eq!(err.code, 41);
        // closed: even a glyph that would fit is refused
        let tiny = field(1, 1, 255);
        assert!(packer.insert(42, Some(&tiny)).is_err());
        assert!(packer.insert(43, None).is_err());

        let packed = packer.finish();
        assert_eq!(packed.first_unplaced, Some(41));
        assert_eq!(packed.regions.len(), 1);
        assert!(packed.regions.contains_key(&40));
    }

    #[test]
    fn glyph_wider_than_atlas_overflows() {
        let wide = field(20, 2, 255);
        let packed = AtlasPacker::pack(16, 16, [(50, Some(&wide))]);
        assert_eq!(packed.first_unplaced, Some(50));
        assert!(packed.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn zero_sized_glyphs_take_no_space() {
        let a = field(4, 4, 255);
        let packed = AtlasPacker::pack(16, 16, [(32, None), (33, Some(&a)), (34, None)]);
        assert_eq!(packed.regions[&32], AtlasRegion::default());
        assert_eq!(packed.regions[&33].x, 0);
        assert!(packed.uv(32).unwrap().is_zero());
        assert!(packed.uv(34).unwrap().is_zero());
    }

    #[test]
    fn typical_ascii_set_fits_default_atlas() {
        // worst case for a 48px font with spread 6: 64×64 padded cells
        let cell = field(64, 64, 255);
        let packed = AtlasPacker::pack(1024, 1024, (32..128u8).map(|c| (c, Some(&cell))));
        assert!(!packed.overflowed());
        assert_eq!(packed.regions.len(), 96);
    }
}
