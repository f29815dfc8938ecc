/// 8-bit coverage bitmap for one glyph, as produced by the rasterizer.
///
/// Row-major, `width * height` bytes.  Any non-zero byte counts as a
/// covered pixel for distance-field purposes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlyphBitmap {
    width: u32,
    height: u32,
    coverage: Vec<u8>,
}

impl GlyphBitmap {
    /// Wraps raw coverage bytes.  Returns `None` when the buffer length does
    /// not match `width * height`.
    pub fn new(width: u32, height: u32, coverage: Vec<u8>) -> Option<Self> {
        if coverage.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            coverage,
        })
    }

    /// All-zero bitmap of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
        }
    }

    /// Builds a bitmap by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        let mut coverage = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                coverage.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            coverage,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn coverage(&self) -> &[u8] {
        &self.coverage
    }

    /// Zero width or zero height (e.g. the space character).
    pub fn is_zero_sized(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Coverage at `(x, y)`; out-of-bounds reads return 0.
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[(y * self.width + x) as usize]
    }

    /// Coordinates of every covered pixel in row-major order.
    pub fn covered_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width.max(1);
        self.coverage
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(move |(i, _)| (i as u32 % width, i as u32 / width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(GlyphBitmap::new(3, 3, vec![0; 8]).is_none());
        assert!(GlyphBitmap::new(3, 3, vec![0; 9]).is_some());
    }

    #[test]
    fn covered_pixels_are_row_major() {
        let bmp = GlyphBitmap::from_fn(3, 2, |x, y| if x == y || x == 2 { 255 } else { 0 });
        let covered: Vec<_> = bmp.covered_pixels().collect();
        assert_eq!(covered, vec![(0, 0), (2, 0), (1, 1), (2, 1)]);
    }

    #[test]
    fn out_of_bounds_reads_are_uncovered() {
        let bmp = GlyphBitmap::from_fn(2, 2, |_, _| 255);
        assert_eq!(bmp.get(1, 1), 255);
        assert_eq!(bmp.get(2, 0), 0);
        assert!(GlyphBitmap::blank(0, 5).is_zero_sized());
    }
}
