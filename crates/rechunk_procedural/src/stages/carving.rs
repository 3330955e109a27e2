//! Cave and liquid carving stages.

use std::sync::Arc;

use rayon::prelude::*;

use rechunk_core::{ScratchGrid, Tile, Voxel};

use super::{columns, solid_top};
use crate::biome::Biome;
use crate::services::GenerationServices;
use crate::stage::{spawn_stage_work, GenerationStage, PendingStage, StageKind};
use crate::terrain::CaveBand;

/// Carves one tunnel band per column out of the solid terrain.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaveCarvingStage;

impl CaveCarvingStage {
    fn carve_tile(tile: &mut Tile, services: &GenerationServices) {
        let bands: Vec<(usize, usize, CaveBand)> = columns(tile)
            .filter_map(|(lx, lz, x, z)| {
                let surface = solid_top(tile, lx, lz)?;
                services
                    .terrain
                    .cave_band(x, z, surface)
                    .map(|band| (lx, lz, band))
            })
            .collect();

        for (lx, lz, band) in bands {
            for y in band.bottom..=band.top {
                let voxel = tile.get_voxel(lx, y, lz);
                if voxel != Voxel::BEDROCK && !voxel.is_liquid() {
                    tile.set_voxel(lx, y, lz, Voxel::FILLER);
                }
            }
        }
    }
}

impl GenerationStage for CaveCarvingStage {
    fn kind(&self) -> StageKind {
        StageKind::Carvers
    }

    fn run(&self, grid: ScratchGrid, services: Arc<GenerationServices>) -> PendingStage {
        spawn_stage_work(grid, services, |grid, services| {
            grid.tiles_mut()
                .par_iter_mut()
                .for_each(|tile| Self::carve_tile(tile, services));
            Ok(())
        })
    }
}

/// Cuts flooded channels into ocean floors, lined with gravel.
#[derive(Clone, Copy, Debug, Default)]
pub struct LiquidCarvingStage;

impl LiquidCarvingStage {
    fn carve_tile(tile: &mut Tile, services: &GenerationServices) {
        let sea_level = services.terrain.sea_level();
        let channels: Vec<(usize, usize, i32, i32)> = columns(tile)
            .filter(|&(lx, lz, _, _)| Biome::from_id(tile.biome(lx, lz)).is_ocean())
            .filter_map(|(lx, lz, x, z)| {
                let depth = services.terrain.channel_depth(x, z);
                let floor = solid_top(tile, lx, lz)?;
                (depth > 0 && floor < sea_level).then_some((lx, lz, floor, depth))
            })
            .collect();

        for (lx, lz, floor, depth) in channels {
            let bottom = (floor - depth + 1).max(2);
            for y in bottom..=floor {
                tile.set_voxel(lx, y, lz, Voxel::WATER);
            }
            tile.set_voxel(lx, bottom - 1, lz, Voxel::GRAVEL);
        }
    }
}

impl GenerationStage for LiquidCarvingStage {
    fn kind(&self) -> StageKind {
        StageKind::LiquidCarvers
    }

    fn run(&self, grid: ScratchGrid, services: Arc<GenerationServices>) -> PendingStage {
        spawn_stage_work(grid, services, |grid, services| {
            grid.tiles_mut()
                .par_iter_mut()
                .for_each(|tile| Self::carve_tile(tile, services));
            Ok(())
        })
    }
}
