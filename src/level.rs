//! Level loading: named masks, placed tiles and the grid over them
//!
//! A level file names each tile mask once and places it any number of times,
//! either explicitly or through an ASCII layout. Placed tiles share their
//! mask through an `Arc`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::collide::{
    BitMask, Collider, ColliderId, ContactResult, DynamicCollider, Rect, Rising, SpatialIndex,
    StaticCollider, resolve, resolve_many,
};
use crate::error::{CollisionError, Result};
use crate::settings::CollisionSettings;

/// How a named mask is produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskDesc {
    /// ASCII art, `#` solid
    Rows(Vec<String>),
    /// Image file, relative to the level file
    Image(PathBuf),
    /// Solid block of [width, height]
    Filled([u32; 2]),
    /// Right-triangle slope
    Ramp { size: u32, rising: Rising },
}

/// A single placed tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDesc {
    pub mask: String,
    pub x: i32,
    pub y: i32,
}

/// Grid layout: one character per tile slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDesc {
    /// Slot pitch in world pixels
    pub tile_size: u32,
    /// World position of slot (0, 0)
    #[serde(default)]
    pub origin: [i32; 2],
    /// Character -> mask name; unmapped characters are empty slots
    pub legend: BTreeMap<String, String>,
    pub rows: Vec<String>,
}

impl LayoutDesc {
    /// World position of the slot at `(col, row)`.
    ///
    /// Fails on a zero pitch, or when the slot falls outside `i32` world space.
    pub fn slot_position(&self, col: usize, row: usize) -> Result<IVec2> {
        if self.tile_size == 0 {
            return Err(CollisionError::InvalidLayout(
                "tile_size must be non-zero".to_string(),
            ));
        }
        let out_of_range = || {
            CollisionError::InvalidLayout(format!(
                "slot ({}, {}) with tile_size {} at origin {:?} is out of range",
                col, row, self.tile_size, self.origin
            ))
        };
        let pitch = i32::try_from(self.tile_size).map_err(|_| out_of_range())?;
        let axis = |origin: i32, slot: usize| {
            i32::try_from(slot)
                .ok()
                .and_then(|slot| slot.checked_mul(pitch))
                .and_then(|offset| origin.checked_add(offset))
        };
        let x = axis(self.origin[0], col).ok_or_else(out_of_range)?;
        let y = axis(self.origin[1], row).ok_or_else(out_of_range)?;
        Ok(IVec2::new(x, y))
    }
}

/// Level description as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDesc {
    #[serde(default)]
    pub settings: CollisionSettings,
    #[serde(default)]
    pub masks: BTreeMap<String, MaskDesc>,
    #[serde(default)]
    pub tiles: Vec<TileDesc>,
    #[serde(default)]
    pub layout: Option<LayoutDesc>,
}

/// The static colliders of one level plus the grid over them
#[derive(Debug, Clone)]
pub struct TileField {
    settings: CollisionSettings,
    masks: BTreeMap<String, Arc<BitMask>>,
    tiles: Vec<StaticCollider>,
    index: SpatialIndex,
}

impl TileField {
    /// Index an already-built set of tiles
    pub fn new(tiles: Vec<StaticCollider>, settings: CollisionSettings) -> Result<Self> {
        settings.validate()?;
        let index = SpatialIndex::build(&tiles, settings.cell_size)?;
        Ok(Self {
            settings,
            masks: BTreeMap::new(),
            tiles,
            index,
        })
    }

    /// Build masks, place tiles and index them.
    ///
    /// Explicit tiles come first, then layout slots in row-major order;
    /// `ColliderId`s follow that order. Image paths resolve against `base_dir`.
    pub fn from_desc(desc: &LevelDesc, base_dir: &Path) -> Result<Self> {
        let settings = desc.settings;
        settings.validate()?;

        let mut masks = BTreeMap::new();
        for (name, mask_desc) in &desc.masks {
            let mask = build_mask(mask_desc, base_dir, settings.alpha_threshold)?;
            masks.insert(name.clone(), Arc::new(mask));
        }

        let lookup = |name: &str| {
            masks
                .get(name)
                .cloned()
                .ok_or_else(|| CollisionError::UnknownMask(name.to_string()))
        };

        let mut tiles = Vec::with_capacity(desc.tiles.len());
        for tile in &desc.tiles {
            tiles.push(StaticCollider::new(lookup(&tile.mask)?, IVec2::new(tile.x, tile.y)));
        }

        if let Some(layout) = &desc.layout {
            for (row, line) in layout.rows.iter().enumerate() {
                for (col, ch) in line.chars().enumerate() {
                    let mut buf = [0; 4];
                    let Some(name) = layout.legend.get(&*ch.encode_utf8(&mut buf)) else {
                        continue;
                    };
                    let pos = layout.slot_position(col, row)?;
                    tiles.push(StaticCollider::new(lookup(name)?, pos));
                }
            }
        }

        let index = SpatialIndex::build(&tiles, settings.cell_size)?;
        log::debug!(
            "Level built: {} masks, {} tiles, {} occupied cells",
            masks.len(),
            tiles.len(),
            index.occupied_cells()
        );

        Ok(Self {
            settings,
            masks,
            tiles,
            index,
        })
    }

    /// Parse a level from JSON text
    pub fn from_json(json: &str, base_dir: &Path) -> Result<Self> {
        let desc: LevelDesc = serde_json::from_str(json)?;
        Self::from_desc(&desc, base_dir)
    }

    /// Read a level file; image paths resolve next to it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let field = Self::from_json(&json, base_dir)?;
        log::info!("Loaded level {:?} ({} tiles)", path, field.tiles.len());
        Ok(field)
    }

    /// Re-partition the grid, e.g. after changing the tile size
    pub fn rebuild_index(&mut self, cell_size: u32) -> Result<()> {
        self.index.rebuild(&self.tiles, cell_size)?;
        self.settings.cell_size = cell_size;
        Ok(())
    }

    pub fn settings(&self) -> &CollisionSettings {
        &self.settings
    }

    pub fn tiles(&self) -> &[StaticCollider] {
        &self.tiles
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn tile(&self, id: ColliderId) -> Option<&StaticCollider> {
        self.tiles.get(id.index())
    }

    /// Named mask from the level description
    pub fn mask(&self, name: &str) -> Option<&Arc<BitMask>> {
        self.masks.get(name)
    }

    /// World box covering every tile, `None` for an empty level
    pub fn bounds(&self) -> Option<Rect> {
        self.tiles
            .iter()
            .map(|t| t.bounds())
            .reduce(|a, b| a.union(&b))
    }

    /// Broad-phase candidates for a world box
    pub fn query(&self, rect: &Rect) -> Vec<ColliderId> {
        self.index.query(rect)
    }

    /// Contacts between a moving collider and this level's tiles
    pub fn resolve<D: Collider + ?Sized>(&self, dynamic: &D) -> Result<Vec<ContactResult<'_>>> {
        resolve(dynamic, &self.index, &self.tiles)
    }

    /// Contacts for several moving colliders, in input order
    pub fn resolve_many(
        &self,
        dynamics: &[DynamicCollider],
    ) -> Vec<Result<Vec<ContactResult<'_>>>> {
        resolve_many(dynamics, &self.index, &self.tiles)
    }
}

fn build_mask(desc: &MaskDesc, base_dir: &Path, alpha_threshold: u8) -> Result<BitMask> {
    match desc {
        MaskDesc::Rows(rows) => BitMask::from_rows(rows.as_slice()),
        MaskDesc::Image(path) => BitMask::load(base_dir.join(path), alpha_threshold),
        MaskDesc::Filled([w, h]) => BitMask::filled(*w, *h),
        MaskDesc::Ramp { size, rising } => BitMask::ramp(*size, *rising),
    }
}
