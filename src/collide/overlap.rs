//! Bit-exact mask overlap
//!
//! The scan is clipped to the intersection of both masks' extents and walks
//! it row by row, 64 columns per step, ANDing aligned words from each mask.

use glam::IVec2;

use super::BitMask;
use crate::consts::WORD_BITS;

/// Overlapping region of two masks, in mask A's local frame
struct Clip {
    x0: u32,
    x1: u32,
    y0: u32,
    y1: u32,
    /// B's origin relative to A's
    offset: IVec2,
}

impl Clip {
    fn new(a: &BitMask, b: &BitMask, offset: IVec2) -> Option<Self> {
        // i64 so extreme offsets can't wrap
        let (ox, oy) = (offset.x as i64, offset.y as i64);
        let x0 = ox.max(0);
        let x1 = (a.width() as i64).min(ox + b.width() as i64);
        let y0 = oy.max(0);
        let y1 = (a.height() as i64).min(oy + b.height() as i64);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        Some(Self {
            x0: x0 as u32,
            x1: x1 as u32,
            y0: y0 as u32,
            y1: y1 as u32,
            offset,
        })
    }

    /// Visit shared words in row-major order until `visit` returns false.
    /// `visit` gets the A-frame column of bit 0 and the row.
    fn scan(&self, a: &BitMask, b: &BitMask, mut visit: impl FnMut(u32, u32, u64) -> bool) {
        for y in self.y0..self.y1 {
            let by = (y as i64 - self.offset.y as i64) as u32;
            let mut x = self.x0;
            while x < self.x1 {
                let bx = (x as i64 - self.offset.x as i64) as u32;
                let bits = a.row_bits(x, y) & b.row_bits(bx, by) & low_bits(self.x1 - x);
                if bits != 0 && !visit(x, y, bits) {
                    return;
                }
                x = x.saturating_add(WORD_BITS);
            }
        }
    }
}

/// Mask with the lowest `n` bits set (all 64 when n >= 64)
#[inline]
fn low_bits(n: u32) -> u64 {
    if n >= WORD_BITS {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Find the first pixel set in both masks.
///
/// `b` is placed at `pos_b - pos_a` relative to `a`. The returned point is in
/// `a`'s local frame and is the first shared bit in row-major order (y, then
/// x), so it doesn't depend on who asks or in what order.
pub fn overlap(a: &BitMask, pos_a: IVec2, b: &BitMask, pos_b: IVec2) -> Option<IVec2> {
    let clip = Clip::new(a, b, offset_between(pos_a, pos_b))?;

    let mut hit = None;
    clip.scan(a, b, |x, y, bits| {
        hit = Some(IVec2::new((x + bits.trailing_zeros()) as i32, y as i32));
        false
    });
    hit
}

/// Count pixels set in both masks
pub fn overlap_area(a: &BitMask, pos_a: IVec2, b: &BitMask, pos_b: IVec2) -> u32 {
    let Some(clip) = Clip::new(a, b, offset_between(pos_a, pos_b)) else {
        return 0;
    };

    let mut area = 0;
    clip.scan(a, b, |_, _, bits| {
        area += bits.count_ones();
        true
    });
    area
}

/// Offset of B relative to A, clamped so distant positions can't wrap
#[inline]
fn offset_between(pos_a: IVec2, pos_b: IVec2) -> IVec2 {
    pos_b.saturating_sub(pos_a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(n: u32) -> BitMask {
        BitMask::filled(n, n).unwrap()
    }

    #[test]
    fn test_overlap_first_bit_row_major() {
        let a = square(10);
        let b = square(10);
        let hit = overlap(&a, IVec2::ZERO, &b, IVec2::new(5, 5));
        assert_eq!(hit, Some(IVec2::new(5, 5)));
        assert_eq!(overlap_area(&a, IVec2::ZERO, &b, IVec2::new(5, 5)), 25);
    }

    #[test]
    fn test_overlap_negative_offset() {
        let a = square(10);
        let b = square(10);
        // B up and left of A: contact starts at A's origin
        let hit = overlap(&a, IVec2::new(5, 5), &b, IVec2::ZERO);
        assert_eq!(hit, Some(IVec2::ZERO));
    }

    #[test]
    fn test_overlap_disjoint_extents() {
        let a = square(10);
        let b = square(10);
        assert_eq!(overlap(&a, IVec2::ZERO, &b, IVec2::new(10, 0)), None);
        assert_eq!(overlap(&a, IVec2::ZERO, &b, IVec2::new(0, -10)), None);
        assert_eq!(overlap_area(&a, IVec2::ZERO, &b, IVec2::new(100, 100)), 0);
    }

    #[test]
    fn test_overlap_extents_touch_but_bits_dont() {
        // Hollow frame around a dot that sits in the frame's hole
        let frame = BitMask::from_rows(&["###", "#.#", "###"]).unwrap();
        let dot = BitMask::from_rows(&["#"]).unwrap();
        assert_eq!(overlap(&frame, IVec2::ZERO, &dot, IVec2::new(1, 1)), None);
        assert_eq!(
            overlap(&frame, IVec2::ZERO, &dot, IVec2::new(2, 1)),
            Some(IVec2::new(2, 1))
        );
    }

    #[test]
    fn test_overlap_player_on_slope() {
        // 4x4 player standing with its bottom-right corner over a ramp's low end
        let ramp = BitMask::ramp(8, super::super::Rising::Right).unwrap();
        let player = square(4);
        // Player occupies x 0..4, y 2..6 of ramp space: ramp solid at x+y>=7
        let hit = overlap(&player, IVec2::new(0, 2), &ramp, IVec2::ZERO);
        // First row of player is ramp y=2, solid from x=5, outside player.
        // Row y=3 solid from x=4, outside. Row y=4 solid from x=3 -> player local (3, 2)
        assert_eq!(hit, Some(IVec2::new(3, 2)));
        assert_eq!(overlap_area(&player, IVec2::new(0, 2), &ramp, IVec2::ZERO), 1 + 2);
    }

    #[test]
    fn test_overlap_wide_masks_across_words() {
        let a = BitMask::from_fn(200, 3, |x, y| y == 2 && x == 150).unwrap();
        let b = BitMask::from_fn(100, 3, |x, y| y == 1 && x == 40).unwrap();
        // b's (40, 1) lands on a's (150, 2) when b sits at (110, 1)
        assert_eq!(
            overlap(&a, IVec2::ZERO, &b, IVec2::new(110, 1)),
            Some(IVec2::new(150, 2))
        );
        assert_eq!(overlap(&a, IVec2::ZERO, &b, IVec2::new(111, 1)), None);
    }

    #[test]
    fn test_overlap_extreme_positions() {
        let a = square(4);
        assert_eq!(
            overlap(&a, IVec2::new(i32::MIN, 0), &a, IVec2::new(i32::MAX, 0)),
            None
        );
        assert_eq!(
            overlap(&a, IVec2::splat(i32::MAX - 2), &a, IVec2::splat(i32::MAX - 2)),
            Some(IVec2::ZERO)
        );
    }
}
