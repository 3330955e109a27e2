//! Feature placement: structure pieces, trees and the final relight.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rechunk_core::{ScratchGrid, StructureStart, Voxel, VoxelPos, TILE_HEIGHT};

use super::{columns, solid_top};
use crate::biome::Biome;
use crate::services::GenerationServices;
use crate::stage::{spawn_stage_work, GenerationStage, PendingStage, StageError, StageKind};

/// Seed purpose for the feature RNG.
const FEATURE_PURPOSE: u64 = 0xFEA7;

/// Per-column tree chance at density 100.
const MAX_TREE_CHANCE: f64 = 0.04;

/// A tree to grow: trunk base and trunk height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TreeSite {
    base: VoxelPos,
    trunk: i32,
}

/// Builds structure pieces and trees, possibly across tile seams.
#[derive(Clone, Copy, Debug, Default)]
pub struct FeaturePlacementStage;

impl FeaturePlacementStage {
    fn place_structures(
        grid: &mut ScratchGrid,
        services: &GenerationServices,
    ) -> Result<(), StageError> {
        // Every structure reaching the center must have its holder in the grid.
        for holder in grid.center().structure_refs() {
            if !grid.contains(*holder) {
                return Err(StageError::MissingTile(*holder));
            }
        }

        let starts: Vec<StructureStart> = grid
            .tiles()
            .iter()
            .flat_map(|tile| tile.structure_starts().iter().copied())
            .collect();

        for start in &starts {
            for pos in services.structures.piece_positions(start) {
                grid.set_voxel(pos, Voxel::COBBLESTONE);
            }
        }
        Ok(())
    }

    fn tree_sites(grid: &ScratchGrid, services: &GenerationServices) -> Vec<TreeSite> {
        let seed = services.seed();
        let mut sites = Vec::new();

        for tile in grid.tiles() {
            let coord = tile.coord();
            let mut rng = ChaCha8Rng::seed_from_u64(
                seed.derive(FEATURE_PURPOSE).value()
                    ^ services.feature_salt
                    ^ seed.mix(coord.x, coord.z),
            );

            for (lx, lz, x, z) in columns(tile) {
                let density = Biome::from_id(tile.biome(lx, lz)).tree_density();
                if density == 0 {
                    continue;
                }
                let chance = f64::from(density) / 100.0 * MAX_TREE_CHANCE;
                if !rng.gen_bool(chance) {
                    continue;
                }
                let trunk = rng.gen_range(4..=6);
                let Some(top) = solid_top(tile, lx, lz) else {
                    continue;
                };
                let ground = tile.get_voxel(lx, top, lz);
                if ground != Voxel::GRASS && ground != Voxel::DIRT {
                    continue;
                }
                if !tile.get_voxel(lx, top + 1, lz).is_filler() {
                    continue;
                }
                if top + trunk + 2 >= TILE_HEIGHT as i32 {
                    continue;
                }
                sites.push(TreeSite {
                    base: VoxelPos::new(x, top + 1, z),
                    trunk,
                });
            }
        }
        sites
    }

    fn grow_tree(grid: &mut ScratchGrid, site: TreeSite) {
        let TreeSite { base, trunk } = site;
        let crown = base.y + trunk;

        for dy in -2..=1 {
            let radius: i32 = if dy >= 0 { 1 } else { 2 };
            for dx in -radius..=radius {
                for dz in -radius..=radius {
                    if dx.abs() == radius && dz.abs() == radius && radius == 2 {
                        continue;
                    }
                    let pos = VoxelPos::new(base.x + dx, crown + dy, base.z + dz);
                    if grid.voxel(pos).is_some_and(Voxel::is_filler) {
                        grid.set_voxel(pos, Voxel::LEAVES);
                    }
                }
            }
        }
        for dy in 0..trunk {
            grid.set_voxel(VoxelPos::new(base.x, base.y + dy, base.z), Voxel::WOOD);
        }
    }
}

impl GenerationStage for FeaturePlacementStage {
    fn kind(&self) -> StageKind {
        StageKind::Features
    }

    fn run(&self, grid: ScratchGrid, services: Arc<GenerationServices>) -> PendingStage {
        spawn_stage_work(grid, services, |grid, services| {
            Self::place_structures(grid, services)?;

            let sites = Self::tree_sites(grid, services);
            let trees = sites.len();
            for site in sites {
                Self::grow_tree(grid, site);
            }

            services.lighting.relight(grid);
            tracing::trace!(
                trees,
                center = %grid.center_coord(),
                "Features placed"
            );
            Ok(())
        })
    }
}
