//! Collider variants
//!
//! A collider is anything with a mask and a world position. The player is a
//! `DynamicCollider` moved by the game loop every tick; terrain tiles are
//! `StaticCollider`s fixed at level load.

use std::sync::Arc;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::{BitMask, Rect};

/// Integer world-pixel position of a mask's top-left corner
pub type Position = IVec2;

/// Slot of a static collider in the tile slice an index was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

impl ColliderId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Has a mask and a position
pub trait Collider {
    fn mask(&self) -> &BitMask;

    fn position(&self) -> Position;

    /// World-space bounding box of the mask at the current position
    fn bounds(&self) -> Rect {
        self.mask().bounds_at(self.position())
    }
}

/// A collider that moves every tick (the player)
#[derive(Debug, Clone)]
pub struct DynamicCollider {
    pub mask: Arc<BitMask>,
    pub position: Position,
}

impl DynamicCollider {
    pub fn new(mask: Arc<BitMask>, position: Position) -> Self {
        Self { mask, position }
    }

    /// Move by a pixel delta
    pub fn translate(&mut self, delta: IVec2) {
        self.position += delta;
    }
}

impl Collider for DynamicCollider {
    fn mask(&self) -> &BitMask {
        &self.mask
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// A terrain tile, fixed for the lifetime of a level
#[derive(Debug, Clone)]
pub struct StaticCollider {
    mask: Arc<BitMask>,
    position: Position,
}

impl StaticCollider {
    pub fn new(mask: Arc<BitMask>, position: Position) -> Self {
        Self { mask, position }
    }

    /// Shared handle to the tile's mask
    pub fn mask_handle(&self) -> &Arc<BitMask> {
        &self.mask
    }
}

impl Collider for StaticCollider {
    fn mask(&self) -> &BitMask {
        &self.mask
    }

    fn position(&self) -> Position {
        self.position
    }
}
