//! Mask Collide - pixel-accurate 2D collision for sprites against tile fields
//!
//! Core modules:
//! - `collide`: Bit masks, mask overlap, grid broad phase and contact queries
//! - `level`: Tile field loading from JSON level descriptions
//! - `settings`: Data-driven collision tuning (alpha threshold, cell size)
//! - `error`: Error taxonomy shared by every fallible operation

pub mod collide;
pub mod error;
pub mod level;
pub mod settings;

pub use collide::{
    AlphaSource, BitMask, Collider, ColliderId, ContactResult, DynamicCollider, Position, Rect,
    SpatialIndex, StaticCollider, overlap, overlap_area, resolve, resolve_many,
};
pub use error::{CollisionError, Result};
pub use level::{LevelDesc, TileField};
pub use settings::CollisionSettings;

/// Collision configuration constants
pub mod consts {
    /// Alpha values strictly above this count as solid
    pub const DEFAULT_ALPHA_THRESHOLD: u8 = 127;
    /// Default broad-phase cell edge, in world pixels (one terrain tile)
    pub const DEFAULT_CELL_SIZE: u32 = 32;
    /// Bits per storage word in a mask row
    pub const WORD_BITS: u32 = u64::BITS;
}
