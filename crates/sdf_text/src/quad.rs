use glam::Vec2;
use sdf_font::GlyphEntry;

/// Interleaved position (pixels, y up) + atlas UV.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlyphVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl GlyphVertex {
    #[inline]
    fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
        }
    }
}

/// Two triangles covering one glyph, drawn as six non-indexed vertices.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlyphQuad {
    pub vertices: [GlyphVertex; 6],
}

impl GlyphQuad {
    pub const VERTEX_COUNT: u32 = 6;

    /// Places `entry` with its pen origin at `pen`.
    ///
    /// The bottom edge sits `size.y - bearing.y` below the baseline; the
    /// top edge samples `v0` because atlas rows grow downwards.
    pub fn new(entry: &GlyphEntry, pen: Vec2, scale: f32) -> Self {
        let xpos = pen.x + entry.bearing.x as f32 * scale;
        let ypos = pen.y - (entry.size.y - entry.bearing.y) as f32 * scale;
        let w = entry.size.x as f32 * scale;
        let h = entry.size.y as f32 * scale;
        let uv = entry.uv;

        Self {
            vertices: [
                GlyphVertex::new(xpos, ypos + h, uv.u0, uv.v0),
                GlyphVertex::new(xpos, ypos, uv.u0, uv.v1),
                GlyphVertex::new(xpos + w, ypos, uv.u1, uv.v1),
                GlyphVertex::new(xpos, ypos + h, uv.u0, uv.v0),
                GlyphVertex::new(xpos + w, ypos, uv.u1, uv.v1),
                GlyphVertex::new(xpos + w, ypos + h, uv.u1, uv.v0),
            ],
        }
    }

    /// Bottom-left corner.
    pub fn min(&self) -> Vec2 {
        Vec2::from(self.vertices[1].position)
    }

    /// Top-right corner.
    pub fn max(&self) -> Vec2 {
        Vec2::from(self.vertices[5].position)
    }

    pub fn size(&self) -> Vec2 {
        self.max() - self.min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;
    use sdf_font::{AtlasRegion, TextureHandle, UvRect};

    fn entry() -> GlyphEntry {
        GlyphEntry {
            texture: TextureHandle::from_raw(7),
            size: IVec2::new(20, 30),
            bearing: IVec2::new(3, 24),
            advance: 22 * 64,
            region: AtlasRegion {
                x: 0,
                y: 0,
                width: 20,
                height: 30,
            },
            uv: UvRect {
                u0: 0.0,
                v0: 0.25,
                u1: 0.5,
                v1: 0.75,
            },
        }
    }

    #[test]
    fn quad_uses_bearing_and_descent() {
        let q = GlyphQuad::new(&entry(), Vec2::new(100.0, 50.0), 2.0);
        // xpos = 100 + 3·2, ypos = 50 - (30 - 24)·2
        assert_eq!(q.min(), Vec2::new(106.0, 38.0));
        assert_eq!(q.size(), Vec2::new(40.0, 60.0));
    }

    #[test]
    fn vertex_order_and_uvs() {
        let q = GlyphQuad::new(&entry(), Vec2::ZERO, 1.0);
        let uvs: Vec<[f32; 2]> = q.vertices.iter().map(|v| v.uv).collect();
        assert_eq!(
            uvs,
            vec![
                [0.0, 0.25],
                [0.0, 0.75],
                [0.5, 0.75],
                [0.0, 0.25],
                [0.5, 0.75],
                [0.5, 0.25],
            ]
        );
        assert_eq!(q.vertices[0], q.vertices[3]);
        assert_eq!(q.vertices[2], q.vertices[4]);
        assert_eq!(std::mem::size_of::<GlyphQuad>(), 6 * 16);
    }
}
