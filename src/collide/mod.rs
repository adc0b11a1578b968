//! Pixel-accurate collision core
//!
//! This module must stay pure:
//! - No global state
//! - Masks and indices are immutable while queried
//! - Stable candidate order (grid cell, then insertion)
//! - No rendering, asset or platform dependencies beyond alpha ingestion

pub mod collider;
pub mod mask;
pub mod overlap;
pub mod query;
pub mod rect;
pub mod source;
pub mod spatial;

pub use collider::{Collider, ColliderId, DynamicCollider, Position, StaticCollider};
pub use mask::{BitMask, Rising};
pub use overlap::{overlap, overlap_area};
pub use query::{ContactResult, resolve, resolve_many};
pub use rect::Rect;
pub use source::{AlphaSource, FnSource};
pub use spatial::SpatialIndex;
