//! Integer axis-aligned rectangles in world pixels
//!
//! Half-open: `min` is inside, `max` is one past the last covered pixel.

use glam::IVec2;

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Top-left corner (inclusive)
    pub min: IVec2,
    /// Bottom-right corner (exclusive)
    pub max: IVec2,
}

impl Rect {
    /// A rectangle large enough to contain any world a level can describe
    pub const EVERYTHING: Rect = Rect {
        min: IVec2::splat(i32::MIN),
        max: IVec2::splat(i32::MAX),
    };

    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        Self {
            min: IVec2::new(x, y),
            max: IVec2::new(x.saturating_add(width), y.saturating_add(height)),
        }
    }

    pub fn from_min_max(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.max.x.saturating_sub(self.min.x).max(0)
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.max.y.saturating_sub(self.min.y).max(0)
    }

    /// True if the rectangle covers no pixels
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    pub fn contains_point(&self, p: IVec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Check if two rectangles share at least one pixel
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Shared region of two rectangles, `None` if they don't touch
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        };
        (!r.is_empty()).then_some(r)
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn translate(&self, delta: IVec2) -> Rect {
        Rect {
            min: self.min.saturating_add(delta),
            max: self.max.saturating_add(delta),
        }
    }
}
