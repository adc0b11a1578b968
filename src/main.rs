//! Mask Collide demo
//!
//! Walks a player sprite across a slope scene (or a level file given as the
//! first argument) and logs the contacts reported each tick. The "step up
//! out of the ground" response here is demo policy, not part of the library.

#[cfg(not(target_arch = "wasm32"))]
use std::{collections::BTreeMap, path::Path, sync::Arc};

#[cfg(not(target_arch = "wasm32"))]
use glam::IVec2;

#[cfg(not(target_arch = "wasm32"))]
use mask_collide::{
    BitMask, CollisionSettings, DynamicCollider, LevelDesc, Result, TileField,
    collide::{FnSource, Rising},
    level::{LayoutDesc, MaskDesc},
};

/// Ticks to simulate
#[cfg(not(target_arch = "wasm32"))]
const TICKS: u32 = 240;
/// Horizontal walk speed (px/tick)
#[cfg(not(target_arch = "wasm32"))]
const WALK_SPEED: i32 = 1;
/// Terminal fall speed (px/tick)
#[cfg(not(target_arch = "wasm32"))]
const MAX_FALL: i32 = 4;
/// Tallest ledge the player climbs without jumping
#[cfg(not(target_arch = "wasm32"))]
const MAX_STEP_UP: i32 = 4;

#[cfg(not(target_arch = "wasm32"))]
const TILE: u32 = 16;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Mask Collide demo starting...");

    if let Err(e) = run() {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Native-only demo
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<()> {
    let field = match std::env::args().nth(1) {
        Some(path) => TileField::load(path)?,
        None => TileField::from_desc(&demo_level(), Path::new("."))?,
    };
    log::info!(
        "Level ready: {} tiles, cell size {}",
        field.tiles().len(),
        field.index().cell_size()
    );

    // Elliptical sprite: exercises alpha thresholding on a non-rectangular footprint
    let sprite = FnSource::new(10, 14, |x, y| {
        let dx = (x as f32 + 0.5 - 5.0) / 5.0;
        let dy = (y as f32 + 0.5 - 7.0) / 7.0;
        if dx * dx + dy * dy <= 1.0 { 255 } else { 0 }
    });
    let mask = Arc::new(BitMask::build(&sprite, field.settings().alpha_threshold)?);
    let mut player = DynamicCollider::new(mask, IVec2::new(4, 40));
    let mut fall = 0;

    for tick in 0..TICKS {
        let grounded = step(&mut player, &field, &mut fall)?;

        let contacts = field.resolve(&player)?;
        for c in &contacts {
            log::debug!(
                "tick {}: touching tile {:?} at {:?} (offset {:?})",
                tick,
                c.id,
                c.world_point(player.position),
                c.offset
            );
        }
        if tick % 30 == 0 {
            log::info!(
                "tick {}: player at {:?}, grounded={}",
                tick,
                player.position,
                grounded
            );
        }
    }

    log::info!("Finished at {:?}", player.position);
    Ok(())
}

/// Advance one tick: walk, climb slopes, fall. Returns true when standing.
#[cfg(not(target_arch = "wasm32"))]
fn step(player: &mut DynamicCollider, field: &TileField, fall: &mut i32) -> Result<bool> {
    player.translate(IVec2::new(WALK_SPEED, 0));
    if !field.resolve(&*player)?.is_empty() && !climb(player, field)? {
        player.translate(IVec2::new(-WALK_SPEED, 0));
    }

    *fall = (*fall + 1).min(MAX_FALL);
    for _ in 0..*fall {
        player.translate(IVec2::Y);
        if !field.resolve(&*player)?.is_empty() {
            player.translate(-IVec2::Y);
            *fall = 0;
            return Ok(true);
        }
    }

    // Check one pixel below to catch standing still on the ground
    player.translate(IVec2::Y);
    let grounded = !field.resolve(&*player)?.is_empty();
    player.translate(-IVec2::Y);
    Ok(grounded)
}

/// Lift the player out of a slope, up to `MAX_STEP_UP` pixels
#[cfg(not(target_arch = "wasm32"))]
fn climb(player: &mut DynamicCollider, field: &TileField) -> Result<bool> {
    for lift in 1..=MAX_STEP_UP {
        player.translate(-IVec2::Y);
        if field.resolve(&*player)?.is_empty() {
            log::trace!("Stepped up {} px", lift);
            return Ok(true);
        }
    }
    player.translate(IVec2::new(0, MAX_STEP_UP));
    Ok(false)
}

/// Flat ground, a ramp up to a ledge, and a ramp back down
#[cfg(not(target_arch = "wasm32"))]
fn demo_level() -> LevelDesc {
    let masks = BTreeMap::from([
        ("flat".to_string(), MaskDesc::Filled([TILE, TILE])),
        (
            "up".to_string(),
            MaskDesc::Ramp {
                size: TILE,
                rising: Rising::Right,
            },
        ),
        (
            "down".to_string(),
            MaskDesc::Ramp {
                size: TILE,
                rising: Rising::Left,
            },
        ),
    ]);
    let legend = BTreeMap::from([
        ("F".to_string(), "flat".to_string()),
        ("/".to_string(), "up".to_string()),
        ("\\".to_string(), "down".to_string()),
    ]);

    LevelDesc {
        settings: CollisionSettings {
            cell_size: TILE,
            ..Default::default()
        },
        masks,
        tiles: Vec::new(),
        layout: Some(LayoutDesc {
            tile_size: TILE,
            origin: [0, 64],
            legend,
            rows: vec![
                "....../FF\\.....".to_string(),
                "FFFFFFFFFFFFFFF".to_string(),
            ],
        }),
    }
}
