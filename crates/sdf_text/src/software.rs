//! CPU rasterizer for [`TextBatch`]es, used for previews and tests where no
//! GPU is available.

use glam::Vec2;
use sdf_core::Color;
use sdf_font::MemoryTexture;

use crate::batch::TextBatch;
use crate::transfer::shade;

/// A straight-alpha RGBA float framebuffer.  Row 0 is the top of the image;
/// batch coordinates have y pointing up, as on the GPU path.
#[derive(Debug, Clone)]
pub struct SoftwareTarget {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl SoftwareTarget {
    pub fn new(width: u32, height: u32, clear: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![clear.to_array(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at column `x`, row `y` (top-down).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        (x < self.width && y < self.height).then(|| self.pixels[(y * self.width + x) as usize])
    }

    /// Pixels as 8-bit RGBA, top row first.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&[r, g, b, a]| Color::rgba(r, g, b, a).to_rgba8())
            .collect()
    }

    /// Draws every quad of `batch`, sampling `atlas` with bilinear filtering
    /// and clamp-to-edge addressing.  Returns the number of glyphs drawn.
    ///
    /// Every run is assumed to reference `atlas`.
    pub fn draw_batch(&mut self, batch: &TextBatch, atlas: &MemoryTexture) -> usize {
        let texel = Vec2::new(1.0 / atlas.width as f32, 1.0 / atlas.height as f32);
        let mut drawn = 0;

        for run in batch.runs() {
            let u = &run.uniforms;
            // screen y up is atlas v down
            let shadow_shift = Vec2::new(u.shadow_offset[0], -u.shadow_offset[1]) * texel;

            for quad in &batch.quads()[run.quads.clone()] {
                let min = quad.min();
                let max = quad.max();
                let uv_min = Vec2::from(quad.vertices[1].uv); // (u0, v1)
                let uv_max = Vec2::from(quad.vertices[5].uv); // (u1, v0)
                let extent = max - min;
                if extent.x <= 0.0 || extent.y <= 0.0 {
                    continue;
                }

                let x0 = min.x.floor().max(0.0) as u32;
                let x1 = (max.x.ceil().max(0.0) as u32).min(self.width);
                let y0 = min.y.floor().max(0.0) as u32;
                let y1 = (max.y.ceil().max(0.0) as u32).min(self.height);

                for sy in y0..y1 {
                    let cy = sy as f32 + 0.5;
                    if cy < min.y || cy >= max.y {
                        continue;
                    }
                    let ty = (cy - min.y) / extent.y;
                    for sx in x0..x1 {
                        let cx = sx as f32 + 0.5;
                        if cx < min.x || cx >= max.x {
                            continue;
                        }
                        let tx = (cx - min.x) / extent.x;
                        let uv = Vec2::new(
                            uv_min.x + (uv_max.x - uv_min.x) * tx,
                            uv_min.y + (uv_max.y - uv_min.y) * ty,
                        );
                        let d = sample_bilinear(atlas, uv);
                        let shadow_d = sample_bilinear(atlas, uv - shadow_shift);
                        let src = shade(d, shadow_d, u);

                        let row = self.height - 1 - sy;
                        let dst = &mut self.pixels[(row * self.width + sx) as usize];
                        *dst = blend_over(src, *dst);
                    }
                }
                drawn += 1;
            }
        }
        drawn
    }
}

/// `src` over `dst`, both straight alpha.
fn blend_over(src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
    let sa = src[3];
    let out_a = sa + dst[3] * (1.0 - sa);
    if out_a <= 0.0 {
        return [0.0; 4];
    }
    let mut out = [0.0, 0.0, 0.0, out_a];
    for i in 0..3 {
        out[i] = (src[i] * sa + dst[i] * dst[3] * (1.0 - sa)) / out_a;
    }
    out
}

/// Normalized distance at `uv`, texel centers at half-integers.
fn sample_bilinear(tex: &MemoryTexture, uv: Vec2) -> f32 {
    if tex.width == 0 || tex.height == 0 {
        return 0.0;
    }
    let fx = uv.x * tex.width as f32 - 0.5;
    let fy = uv.y * tex.height as f32 - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let ax = fx - x0;
    let ay = fy - y0;

    let fetch = |x: f32, y: f32| -> f32 {
        let x = (x as i64).clamp(0, tex.width as i64 - 1) as usize;
        let y = (y as i64).clamp(0, tex.height as i64 - 1) as usize;
        tex.pixels[y * tex.width as usize + x] as f32 / 255.0
    };

    let top = fetch(x0, y0) * (1.0 - ax) + fetch(x0 + 1.0, y0) * ax;
    let bottom = fetch(x0, y0 + 1.0) * (1.0 - ax) + fetch(x0 + 1.0, y0 + 1.0) * ax;
    top * (1.0 - ay) + bottom * ay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::TextStyle;
    use crate::uniforms::TextUniforms;
    use crate::quad::GlyphQuad;
    use glam::IVec2;
    use sdf_font::{AtlasRegion, GlyphEntry, TextureHandle, UvRect};

    /// 4×4 atlas: left half inside (255), right half outside (0).
    fn half_atlas() -> MemoryTexture {
        MemoryTexture {
            label: "test".into(),
            width: 4,
            height: 4,
            pixels: (0..16).map(|i| if i % 4 < 2 { 255 } else { 0 }).collect(),
        }
    }

    fn full_quad(at: Vec2) -> GlyphQuad {
        let entry = GlyphEntry {
            texture: TextureHandle::from_raw(1),
            size: IVec2::new(4, 4),
            bearing: IVec2::new(0, 4),
            advance: 0,
            region: AtlasRegion {
                x: 0,
                y: 0,
                width: 4,
                height: 4,
            },
            uv: UvRect {
                u0: 0.0,
                v0: 0.0,
                u1: 1.0,
                v1: 1.0,
            },
        };
        GlyphQuad::new(&entry, at, 2.0)
    }

    #[test]
    fn bilinear_hits_texel_centers() {
        let atlas = half_atlas();
        assert_eq!(sample_bilinear(&atlas, Vec2::new(0.125, 0.5)), 1.0);
        assert_eq!(sample_bilinear(&atlas, Vec2::new(0.875, 0.5)), 0.0);
        assert!((sample_bilinear(&atlas, Vec2::new(0.5, 0.5)) - 0.5).abs() < 1e-6);
        // clamp to edge
        assert_eq!(sample_bilinear(&atlas, Vec2::new(-1.0, 2.0)), 1.0);
    }

    #[test]
    fn draws_inside_half_of_glyph() {
        let atlas = half_atlas();
        let mut batch = TextBatch::new();
        let uniforms = TextUniforms::new(Color::WHITE, &TextStyle::plain());
        batch.push_run(TextureHandle::from_raw(1), uniforms, [full_quad(Vec2::new(2.0, 2.0))]);

        let mut target = SoftwareTarget::new(16, 16, Color::BLACK);
        assert_eq!(target.draw_batch(&batch, &atlas), 1);

        // quad covers x 2..10, y 2..10 (y up) = rows 6..14
        let left = target.pixel(3, 10).unwrap();
        let right = target.pixel(9, 10).unwrap();
        let outside = target.pixel(12, 10).unwrap();
        assert_eq!(left, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(right, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(outside, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn rgba8_is_row_major() {
        let target = SoftwareTarget::new(3, 2, Color::WHITE);
        let bytes = target.to_rgba8();
        assert_eq!(bytes.len(), 3 * 2 * 4);
        assert!(bytes.iter().all(|&b| b == 255));
        assert!(target.pixel(3, 0).is_none());
    }
}
