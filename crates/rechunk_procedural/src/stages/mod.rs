//! # Default Stages
//!
//! One implementation of every [`StageKind`](crate::stage::StageKind):
//!
//! | Stage                  | Module       | Scope              |
//! |------------------------|--------------|--------------------|
//! | structure starts       | `structures` | per tile, parallel |
//! | structure references   | `structures` | per tile, parallel |
//! | biome assignment       | `shaping`    | per tile, parallel |
//! | noise shaping          | `shaping`    | per tile, parallel |
//! | surface decoration     | `shaping`    | per tile, parallel |
//! | cave carving           | `carving`    | per tile, parallel |
//! | liquid carving         | `carving`    | per tile, parallel |
//! | feature placement      | `features`   | whole grid         |
//!
//! Feature placement is the only stage that writes across tile seams, so it
//! runs sequentially over the grid.

mod carving;
mod features;
mod shaping;
mod structures;

use std::sync::Arc;

use rechunk_core::{Tile, TILE_SIZE};

use crate::stage::GenerationStage;

pub use carving::{CaveCarvingStage, LiquidCarvingStage};
pub use features::FeaturePlacementStage;
pub use shaping::{BiomeStage, NoiseStage, SurfaceStage};
pub use structures::{StructureReferencesStage, StructureStartsStage};

/// The default stage set, in pipeline order.
#[must_use]
pub fn default_stages() -> Vec<Arc<dyn GenerationStage>> {
    vec![
        Arc::new(StructureStartsStage),
        Arc::new(StructureReferencesStage),
        Arc::new(BiomeStage),
        Arc::new(NoiseStage),
        Arc::new(SurfaceStage),
        Arc::new(CaveCarvingStage),
        Arc::new(LiquidCarvingStage),
        Arc::new(FeaturePlacementStage),
    ]
}

/// Highest non-filler, non-liquid Y of a local column.
pub(crate) fn solid_top(tile: &Tile, lx: usize, lz: usize) -> Option<i32> {
    let mut y = tile.highest_non_filler(lx, lz)?;
    while y >= 0 {
        let voxel = tile.get_voxel(lx, y, lz);
        if !voxel.is_filler() && !voxel.is_liquid() {
            return Some(y);
        }
        y -= 1;
    }
    None
}

/// Absolute coordinates of every local column of `tile`.
pub(crate) fn columns(tile: &Tile) -> impl Iterator<Item = (usize, usize, i32, i32)> {
    let coord = tile.coord();
    (0..TILE_SIZE).flat_map(move |lz| {
        (0..TILE_SIZE).map(move |lx| {
            (
                lx,
                lz,
                coord.min_voxel_x() + lx as i32,
                coord.min_voxel_z() + lz as i32,
            )
        })
    })
}
