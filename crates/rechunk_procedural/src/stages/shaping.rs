//! Biome, noise and surface stages.

use std::sync::Arc;

use rayon::prelude::*;

use rechunk_core::{ScratchGrid, Tile, Voxel};

use super::{columns, solid_top};
use crate::biome::Biome;
use crate::services::GenerationServices;
use crate::stage::{spawn_stage_work, GenerationStage, PendingStage, StageKind};
use crate::terrain::SUBSOIL_DEPTH;

/// Stores the biome of every column.
#[derive(Clone, Copy, Debug, Default)]
pub struct BiomeStage;

impl GenerationStage for BiomeStage {
    fn kind(&self) -> StageKind {
        StageKind::Biomes
    }

    fn run(&self, grid: ScratchGrid, services: Arc<GenerationServices>) -> PendingStage {
        spawn_stage_work(grid, services, |grid, services| {
            grid.tiles_mut().par_iter_mut().for_each(|tile| {
                let biomes: Vec<_> = columns(tile)
                    .map(|(lx, lz, x, z)| (lx, lz, services.terrain.biome_at(x, z)))
                    .collect();
                for (lx, lz, biome) in biomes {
                    tile.set_biome(lx, lz, biome.id());
                }
            });
            Ok(())
        })
    }
}

/// Fills bedrock, stone up to the terrain height and water up to sea level.
///
/// Nothing is written above `max(height, sea_level - 1)`, so upper sections
/// stay absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoiseStage;

impl NoiseStage {
    fn fill_tile(tile: &mut Tile, services: &GenerationServices) {
        let sea_level = services.terrain.sea_level();
        let heights: Vec<_> = columns(tile)
            .map(|(lx, lz, x, z)| (lx, lz, services.terrain.surface_height(x, z)))
            .collect();

        for (lx, lz, height) in heights {
            tile.set_voxel(lx, 0, lz, Voxel::BEDROCK);
            for y in 1..=height {
                tile.set_voxel(lx, y, lz, Voxel::STONE);
            }
            for y in (height + 1)..sea_level {
                tile.set_voxel(lx, y, lz, Voxel::WATER);
            }
        }
    }
}

impl GenerationStage for NoiseStage {
    fn kind(&self) -> StageKind {
        StageKind::Noise
    }

    fn run(&self, grid: ScratchGrid, services: Arc<GenerationServices>) -> PendingStage {
        spawn_stage_work(grid, services, |grid, services| {
            grid.tiles_mut()
                .par_iter_mut()
                .for_each(|tile| Self::fill_tile(tile, services));
            Ok(())
        })
    }
}

/// Replaces the top of every column with its biome's surface layers.
#[derive(Clone, Copy, Debug, Default)]
pub struct SurfaceStage;

impl SurfaceStage {
    fn decorate_tile(tile: &mut Tile) {
        for (lx, lz, _, _) in columns(tile).collect::<Vec<_>>() {
            let Some(top) = solid_top(tile, lx, lz) else {
                continue;
            };
            let biome = Biome::from_id(tile.biome(lx, lz));
            // Bedrock is never replaced.
            if top >= 1 {
                tile.set_voxel(lx, top, lz, biome.surface_voxel());
            }
            for y in (top - SUBSOIL_DEPTH).max(1)..top {
                tile.set_voxel(lx, y, lz, biome.subsoil_voxel());
            }
        }
    }
}

impl GenerationStage for SurfaceStage {
    fn kind(&self) -> StageKind {
        StageKind::Surface
    }

    fn run(&self, grid: ScratchGrid, services: Arc<GenerationServices>) -> PendingStage {
        spawn_stage_work(grid, services, |grid, _| {
            grid.tiles_mut().par_iter_mut().for_each(Self::decorate_tile);
            Ok(())
        })
    }
}
