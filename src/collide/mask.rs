//! Occupancy bit masks built from sprite opacity
//!
//! Rows are packed into `u64` words, least significant bit first, so the
//! overlap scan can compare 64 columns at a time. Padding bits past the mask
//! width are always zero.

use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::Rect;
use super::source::AlphaSource;
use crate::consts::WORD_BITS;
use crate::error::{CollisionError, Result};

/// Which side of a slope tile is high
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rising {
    /// Surface climbs toward the left edge
    Left,
    /// Surface climbs toward the right edge
    Right,
}

/// Immutable per-pixel occupancy bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMask {
    width: u32,
    height: u32,
    /// Words per row
    stride: usize,
    words: Vec<u64>,
    /// Number of set bits, cached at build
    count: u32,
}

impl BitMask {
    /// Rasterize a source: bit (x, y) is set iff alpha(x, y) > `alpha_threshold`
    pub fn build<S: AlphaSource + ?Sized>(source: &S, alpha_threshold: u8) -> Result<Self> {
        Self::from_fn(source.width(), source.height(), |x, y| {
            source.alpha(x, y) > alpha_threshold
        })
    }

    /// Build from an occupancy predicate
    pub fn from_fn(
        width: u32,
        height: u32,
        mut solid: impl FnMut(u32, u32) -> bool,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CollisionError::InvalidImage { width, height });
        }

        let stride = width.div_ceil(WORD_BITS) as usize;
        let mut words = vec![0u64; stride * height as usize];
        let mut count = 0;

        for (y, row) in (0..height).zip(words.chunks_exact_mut(stride)) {
            for x in 0..width {
                if solid(x, y) {
                    row[(x / WORD_BITS) as usize] |= 1u64 << (x % WORD_BITS);
                    count += 1;
                }
            }
        }

        Ok(Self {
            width,
            height,
            stride,
            words,
            count,
        })
    }

    /// Every bit set
    pub fn filled(width: u32, height: u32) -> Result<Self> {
        Self::from_fn(width, height, |_, _| true)
    }

    /// ASCII art mask: `#`, `X` or `1` are solid, anything else is clear.
    ///
    /// Short rows are padded with clear bits to the longest row.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let grid: Vec<Vec<bool>> = rows
            .iter()
            .map(|r| r.as_ref().chars().map(|c| matches!(c, '#' | 'X' | '1')).collect())
            .collect();
        let width = grid.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let height = grid.len() as u32;

        Self::from_fn(width, height, |x, y| {
            grid[y as usize].get(x as usize).copied().unwrap_or(false)
        })
    }

    /// Right-triangle slope tile of `size` × `size` pixels
    pub fn ramp(size: u32, rising: Rising) -> Result<Self> {
        Self::from_fn(size, size, |x, y| match rising {
            Rising::Right => x + y + 1 >= size,
            Rising::Left => y >= x,
        })
    }

    /// Decode an image file and rasterize its alpha channel
    pub fn load(path: impl AsRef<Path>, alpha_threshold: u8) -> Result<Self> {
        let img = image::open(path.as_ref())?;
        let mask = Self::build(&img, alpha_threshold)?;
        log::debug!(
            "Loaded mask {:?}: {}x{}, {} solid",
            path.as_ref(),
            mask.width,
            mask.height,
            mask.count
        );
        Ok(mask)
    }

    /// Decode an in-memory encoded image (PNG) and rasterize its alpha channel
    pub fn from_encoded(bytes: &[u8], alpha_threshold: u8) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        Self::build(&img, alpha_threshold)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// (width, height)
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of set bits
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// True if no bit is set (fully transparent sprite)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Read bit (x, y); anything outside the mask reads as clear
    #[inline]
    pub fn test(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return false;
        }
        let (x, y) = (x as u32, y as u32);
        let word = self.words[y as usize * self.stride + (x / WORD_BITS) as usize];
        (word >> (x % WORD_BITS)) & 1 == 1
    }

    /// World-space box covered by this mask when its origin sits at `pos`
    pub fn bounds_at(&self, pos: IVec2) -> Rect {
        Rect::new(pos.x, pos.y, self.width, self.height)
    }

    /// Tight local-space box around the set bits
    pub fn bounding_rect(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }

        let mut min = IVec2::splat(i32::MAX);
        let mut max = IVec2::splat(i32::MIN);
        for (y, row) in self.words.chunks_exact(self.stride).enumerate() {
            for (w, &word) in row.iter().enumerate() {
                if word == 0 {
                    continue;
                }
                let base = (w as u32 * WORD_BITS) as i32;
                let first = base + word.trailing_zeros() as i32;
                let last = base + (WORD_BITS - 1 - word.leading_zeros()) as i32;
                min = min.min(IVec2::new(first, y as i32));
                max = max.max(IVec2::new(last + 1, y as i32 + 1));
            }
        }
        Some(Rect::from_min_max(min, max))
    }

    /// 64 columns of row `y` starting at column `x`, bit 0 = column `x`.
    ///
    /// Columns past the mask width read as zero. Caller keeps `x < width`
    /// and `y < height`.
    #[inline]
    pub(crate) fn row_bits(&self, x: u32, y: u32) -> u64 {
        let row = y as usize * self.stride;
        let w = (x / WORD_BITS) as usize;
        let shift = x % WORD_BITS;
        let lo = self.words[row + w] >> shift;
        if shift != 0 && w + 1 < self.stride {
            lo | (self.words[row + w + 1] << (WORD_BITS - shift))
        } else {
            lo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collide::source::FnSource;

    #[test]
    fn test_build_zero_area_fails() {
        let src = FnSource::new(0, 0, |_, _| 255);
        assert!(matches!(
            BitMask::build(&src, 127),
            Err(CollisionError::InvalidImage {
                width: 0,
                height: 0
            })
        ));
        assert!(BitMask::filled(5, 0).is_err());
    }

    #[test]
    fn test_alpha_threshold_is_strict() {
        // Alpha equal to the threshold stays clear
        let src = FnSource::new(3, 1, |x, _| [127, 128, 0][x as usize]);
        let mask = BitMask::build(&src, 127).unwrap();
        assert!(!mask.test(0, 0));
        assert!(mask.test(1, 0));
        assert!(!mask.test(2, 0));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn test_out_of_bounds_reads_clear() {
        let mask = BitMask::filled(4, 4).unwrap();
        assert!(mask.test(0, 0));
        assert!(mask.test(3, 3));
        assert!(!mask.test(-1, 0));
        assert!(!mask.test(0, -1));
        assert!(!mask.test(4, 0));
        assert!(!mask.test(0, 4));
        assert!(!mask.test(i32::MAX, i32::MIN));
    }

    #[test]
    fn test_from_rows() {
        let mask = BitMask::from_rows(&["#..", ".X", "..1"]).unwrap();
        assert_eq!(mask.size(), (3, 3));
        assert!(mask.test(0, 0));
        assert!(mask.test(1, 1));
        assert!(!mask.test(2, 1)); // padded
        assert!(mask.test(2, 2));
        assert_eq!(mask.count(), 3);
    }

    #[test]
    fn test_row_bits_across_word_boundary() {
        // 130 wide so rows span three words
        let mask =
            BitMask::from_fn(130, 2, |x, y| y == 1 && (x == 63 || x == 64 || x == 129)).unwrap();
        let bits = mask.row_bits(60, 1);
        assert_eq!(bits & 0b1111_1111, 0b0001_1000);
        // Last column lands in the third word; padding after it stays clear
        assert_eq!(mask.row_bits(129, 1), 1);
        assert_eq!(mask.row_bits(100, 0), 0);
    }

    #[test]
    fn test_ramp_rising_right() {
        let mask = BitMask::ramp(4, Rising::Right).unwrap();
        // Top-right pixel solid, top-left clear, bottom row full
        assert!(mask.test(3, 0));
        assert!(!mask.test(0, 0));
        assert!((0..4).all(|x| mask.test(x, 3)));
        assert_eq!(mask.count(), 10);
    }

    #[test]
    fn test_ramp_rising_left() {
        let mask = BitMask::ramp(4, Rising::Left).unwrap();
        assert!(mask.test(0, 0));
        assert!(!mask.test(3, 0));
        assert_eq!(mask.count(), 10);
    }

    #[test]
    fn test_bounding_rect() {
        let mask = BitMask::from_rows(&["....", ".##.", "..#.", "...."]).unwrap();
        assert_eq!(mask.bounding_rect(), Some(Rect::new(1, 1, 2, 2)));

        let empty = BitMask::from_rows(&["..", ".."]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.bounding_rect(), None);
    }

    #[test]
    fn test_build_from_rgba_image() {
        let mut img = image::RgbaImage::new(2, 2);
        img.put_pixel(1, 0, image::Rgba([10, 20, 30, 255]));
        let mask = BitMask::build(&img, 127).unwrap();
        assert!(mask.test(1, 0));
        assert_eq!(mask.count(), 1);
    }
}
