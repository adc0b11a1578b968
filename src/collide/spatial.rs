//! Uniform-grid broad phase
//!
//! Static colliders are bucketed into `cell_size` × `cell_size` cells, one
//! entry per cell their bounding box touches. Cells are kept in a `BTreeMap`
//! keyed by (cell y, cell x) so a query walks them in row-major order and the
//! candidate order is stable for a given index.

use std::collections::{BTreeMap, HashSet};

use glam::IVec2;

use super::{Collider, ColliderId, Rect};
use crate::error::{CollisionError, Result};

/// Grid index over a slice of static colliders. Holds ids, never colliders.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: u32,
    /// (cell y, cell x) -> ids in insertion order
    cells: BTreeMap<(i32, i32), Vec<ColliderId>>,
    /// Inclusive min/max occupied cell, `None` when nothing is indexed
    extent: Option<(IVec2, IVec2)>,
    /// Number of colliders the index was built from
    len: usize,
}

impl SpatialIndex {
    /// Bucket every collider into each cell its bounds touch
    pub fn build<C: Collider>(colliders: &[C], cell_size: u32) -> Result<Self> {
        let mut index = Self {
            cell_size: cell_size.max(1),
            cells: BTreeMap::new(),
            extent: None,
            len: 0,
        };
        index.rebuild(colliders, cell_size)?;
        Ok(index)
    }

    /// Discard all memberships and re-partition from scratch
    pub fn rebuild<C: Collider>(&mut self, colliders: &[C], cell_size: u32) -> Result<()> {
        if cell_size == 0 {
            return Err(CollisionError::InvalidCellSize(cell_size));
        }

        self.cell_size = cell_size;
        self.cells.clear();
        self.extent = None;
        self.len = colliders.len();

        let mut entries = 0usize;
        for (i, collider) in colliders.iter().enumerate() {
            let Some((lo, hi)) = self.cell_range(&collider.bounds()) else {
                continue;
            };
            let id = ColliderId(i as u32);
            for cy in lo.y..=hi.y {
                for cx in lo.x..=hi.x {
                    self.cells.entry((cy, cx)).or_default().push(id);
                    entries += 1;
                }
            }
            self.extent = Some(match self.extent {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        }

        log::debug!(
            "Spatial index rebuilt: {} colliders, {} cells, {} entries (cell size {})",
            self.len,
            self.cells.len(),
            entries,
            cell_size
        );
        Ok(())
    }

    /// Ids registered in any cell `rect` touches.
    ///
    /// Each id appears once, at its first occurrence walking cells row-major
    /// and each cell in insertion order.
    pub fn query(&self, rect: &Rect) -> Vec<ColliderId> {
        let mut out = Vec::new();
        let (Some((lo, hi)), Some((min, max))) = (self.cell_range(rect), self.extent) else {
            return out;
        };
        // Clip to occupied cells so huge query boxes stay cheap
        let lo = lo.max(min);
        let hi = hi.min(max);
        if lo.x > hi.x || lo.y > hi.y {
            return out;
        }

        // Hop between occupied rows so empty rows and cells outside the
        // column span cost one map lookup each
        let mut seen = HashSet::new();
        let mut cursor = (lo.y, lo.x);
        while let Some((&(cy, cx), _)) = self.cells.range(cursor..=(hi.y, hi.x)).next() {
            if cx < lo.x {
                cursor = (cy, lo.x);
                continue;
            }
            if cx <= hi.x {
                for (_, ids) in self.cells.range((cy, cx)..=(cy, hi.x)) {
                    out.extend(ids.iter().copied().filter(|&id| seen.insert(id)));
                }
            }
            if cy >= hi.y {
                break;
            }
            cursor = (cy + 1, lo.x);
        }

        log::trace!("Broad phase: {} candidates for {:?}", out.len(), rect);
        out
    }

    /// Like `query`, resolving ids against the slice the index was built from
    pub fn query_colliders<'a, C>(
        &self,
        rect: &Rect,
        colliders: &'a [C],
    ) -> impl Iterator<Item = (ColliderId, &'a C)> + use<'a, C> {
        self.query(rect)
            .into_iter()
            .filter_map(move |id| colliders.get(id.index()).map(|c| (id, c)))
    }

    #[inline]
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Number of colliders indexed
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-empty cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Ids registered in one cell
    pub fn cell(&self, cell: IVec2) -> &[ColliderId] {
        self.cells
            .get(&(cell.y, cell.x))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cell containing a world pixel
    #[inline]
    pub fn cell_of(&self, p: IVec2) -> IVec2 {
        let cs = self.cell_size as i64;
        IVec2::new(
            (p.x as i64).div_euclid(cs) as i32,
            (p.y as i64).div_euclid(cs) as i32,
        )
    }

    /// Inclusive cell span covered by `rect`, `None` if it covers no pixel
    fn cell_range(&self, rect: &Rect) -> Option<(IVec2, IVec2)> {
        if rect.is_empty() {
            return None;
        }
        Some((self.cell_of(rect.min), self.cell_of(rect.max - IVec2::ONE)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::collide::{BitMask, StaticCollider};

    fn tile(x: i32, y: i32, size: u32) -> StaticCollider {
        StaticCollider::new(Arc::new(BitMask::filled(size, size).unwrap()), IVec2::new(x, y))
    }

    #[test]
    fn test_zero_cell_size_rejected() {
        let tiles = vec![tile(0, 0, 8)];
        assert!(matches!(
            SpatialIndex::build(&tiles, 0),
            Err(CollisionError::InvalidCellSize(0))
        ));
    }

    #[test]
    fn test_large_collider_spans_cells() {
        // 20x20 tile over 8px cells covers cells 0..=2 on both axes
        let tiles = vec![tile(0, 0, 20)];
        let index = SpatialIndex::build(&tiles, 8).unwrap();
        assert_eq!(index.occupied_cells(), 9);
        assert_eq!(index.cell(IVec2::new(2, 2)), &[ColliderId(0)]);
        assert!(index.cell(IVec2::new(3, 0)).is_empty());
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let tiles = vec![tile(-1, -1, 1)];
        let index = SpatialIndex::build(&tiles, 16).unwrap();
        assert_eq!(index.cell_of(IVec2::new(-1, -1)), IVec2::new(-1, -1));
        assert_eq!(index.cell(IVec2::new(-1, -1)), &[ColliderId(0)]);
        assert!(index.query(&Rect::new(0, 0, 16, 16)).is_empty());
        assert_eq!(index.query(&Rect::new(-3, -3, 2, 2)), vec![ColliderId(0)]);
    }

    #[test]
    fn test_query_dedups_and_orders() {
        // Big tile first, two small ones after, sharing cells
        let tiles = vec![tile(0, 0, 32), tile(16, 0, 8), tile(0, 16, 8)];
        let index = SpatialIndex::build(&tiles, 16).unwrap();
        let ids = index.query(&Rect::new(0, 0, 32, 32));
        assert_eq!(ids, vec![ColliderId(0), ColliderId(1), ColliderId(2)]);
    }

    #[test]
    fn test_small_query_on_large_index() {
        // 200x200 grid of 1px tiles, one per cell, plus a far outlier row
        let mut tiles: Vec<_> = (0..200 * 200).map(|i| tile(i % 200, i / 200, 1)).collect();
        tiles.push(tile(0, 1_000_000, 1));
        let index = SpatialIndex::build(&tiles, 1).unwrap();

        let ids = index.query(&Rect::new(57, 91, 1, 1));
        assert_eq!(ids, index.cell(IVec2::new(57, 91)));
        assert_eq!(ids, vec![ColliderId(91 * 200 + 57)]);

        // 2x2 block straddling a row break keeps row-major order
        let ids = index.query(&Rect::new(199, 3, 2, 2));
        assert_eq!(ids, vec![ColliderId(3 * 200 + 199), ColliderId(4 * 200 + 199)]);

        // Column span that skips the empty rows between the grid and the outlier
        let ids = index.query(&Rect::new(0, 199, 1, 1_000_000));
        assert_eq!(ids, vec![ColliderId(199 * 200), ColliderId(200 * 200)]);
    }

    #[test]
    fn test_query_prunes_distant_cells() {
        let tiles = vec![tile(5, 5, 10)];
        let index = SpatialIndex::build(&tiles, 10).unwrap();
        assert!(index.query(&Rect::new(20, 20, 10, 10)).is_empty());
        assert_eq!(index.query(&Rect::new(14, 14, 1, 1)), vec![ColliderId(0)]);
    }

    #[test]
    fn test_query_everything() {
        let tiles: Vec<_> = (0..50).map(|i| tile(i * 7 - 100, (i % 5) * 13, 9)).collect();
        for cell_size in [1, 3, 16, 1000] {
            let index = SpatialIndex::build(&tiles, cell_size).unwrap();
            let mut ids = index.query(&Rect::EVERYTHING);
            ids.sort();
            let expected: Vec<_> = (0..50).map(ColliderId).collect();
            assert_eq!(ids, expected);
        }
    }

    #[test]
    fn test_rebuild_replaces_membership() {
        let mut index = SpatialIndex::build(&[tile(0, 0, 4)], 4).unwrap();
        index.rebuild(&[tile(100, 100, 4), tile(0, 0, 4)], 8).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.cell_size(), 8);
        assert_eq!(index.query(&Rect::new(0, 0, 4, 4)), vec![ColliderId(1)]);
    }

    #[test]
    fn test_query_colliders_resolves_refs() {
        let tiles = vec![tile(0, 0, 4), tile(40, 0, 4)];
        let index = SpatialIndex::build(&tiles, 4).unwrap();
        let hits: Vec<_> = index.query_colliders(&Rect::new(38, 0, 4, 4), &tiles).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, ColliderId(1));
        assert_eq!(hits[0].1.position(), IVec2::new(40, 0));
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::build::<StaticCollider>(&[], 32).unwrap();
        assert!(index.is_empty());
        assert!(index.query(&Rect::EVERYTHING).is_empty());
    }
}
