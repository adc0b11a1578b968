//! Contact queries: broad phase through the grid, narrow phase through masks
//!
//! Every touching tile is reported, in the index's candidate order. A ground
//! check that only cares about the first hit takes the head of the result.

use glam::IVec2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{Collider, ColliderId, DynamicCollider, SpatialIndex, StaticCollider, overlap};
use crate::error::{CollisionError, Result};

/// One dynamic-vs-static contact found by `resolve`
#[derive(Debug, Clone, Copy)]
pub struct ContactResult<'a> {
    /// Which tile was hit
    pub id: ColliderId,
    pub tile: &'a StaticCollider,
    /// Tile position minus dynamic position at the time of the query
    pub offset: IVec2,
    /// First shared pixel, in the dynamic mask's local frame
    pub point: IVec2,
}

impl ContactResult<'_> {
    /// Contact point in world pixels
    pub fn world_point(&self, dynamic_pos: IVec2) -> IVec2 {
        dynamic_pos + self.point
    }
}

/// Find every static collider the dynamic collider's mask overlaps.
///
/// `tiles` must be the slice `index` was built from.
pub fn resolve<'a, D: Collider + ?Sized>(
    dynamic: &D,
    index: &SpatialIndex,
    tiles: &'a [StaticCollider],
) -> Result<Vec<ContactResult<'a>>> {
    let mask = dynamic.mask();
    if mask.is_empty() {
        return Err(CollisionError::EmptyMask);
    }

    let pos = dynamic.position();
    let contacts: Vec<_> = index
        .query_colliders(&dynamic.bounds(), tiles)
        .filter_map(|(id, tile)| {
            overlap(mask, pos, tile.mask(), tile.position()).map(|point| ContactResult {
                id,
                tile,
                offset: tile.position() - pos,
                point,
            })
        })
        .collect();

    log::trace!("Resolved {} contacts at {:?}", contacts.len(), pos);
    Ok(contacts)
}

/// Resolve several independent dynamic colliders against the same tiles.
///
/// Results come back in input order.
pub fn resolve_many<'a>(
    dynamics: &[DynamicCollider],
    index: &SpatialIndex,
    tiles: &'a [StaticCollider],
) -> Vec<Result<Vec<ContactResult<'a>>>> {
    #[cfg(feature = "parallel")]
    {
        dynamics
            .par_iter()
            .map(|d| resolve(d, index, tiles))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        dynamics.iter().map(|d| resolve(d, index, tiles)).collect()
    }
}
