//! Structure start and reference stages.

use std::sync::Arc;

use rayon::prelude::*;

use rechunk_core::{ScratchGrid, StructureStart, TileCoord};

use crate::services::GenerationServices;
use crate::stage::{spawn_stage_work, GenerationStage, PendingStage, StageKind};
use crate::structure::record_references;

/// Anchors structure starts in the tiles chosen by the catalog.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructureStartsStage;

impl GenerationStage for StructureStartsStage {
    fn kind(&self) -> StageKind {
        StageKind::StructureStarts
    }

    fn run(&self, grid: ScratchGrid, services: Arc<GenerationServices>) -> PendingStage {
        spawn_stage_work(grid, services, |grid, services| {
            services.structures.validate()?;
            let seed = services.seed();
            let terrain = &services.terrain;

            grid.tiles_mut().par_iter_mut().for_each(|tile| {
                let starts = services.structures.starts_for(seed, tile.coord(), |x, z| {
                    terrain.surface_height(x, z)
                });
                for start in starts {
                    tile.add_structure_start(start);
                }
            });

            let total: usize = grid.tiles().iter().map(|t| t.structure_starts().len()).sum();
            tracing::trace!(starts = total, "Structure starts placed");
            Ok(())
        })
    }
}

/// Records, on every tile, the starts whose footprint covers it.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructureReferencesStage;

impl GenerationStage for StructureReferencesStage {
    fn kind(&self) -> StageKind {
        StageKind::StructureReferences
    }

    fn run(&self, grid: ScratchGrid, services: Arc<GenerationServices>) -> PendingStage {
        spawn_stage_work(grid, services, |grid, services| {
            services.structures.validate()?;

            let starts: Vec<(TileCoord, StructureStart)> = grid
                .tiles()
                .iter()
                .flat_map(|tile| {
                    let holder = tile.coord();
                    tile.structure_starts().iter().map(move |start| (holder, *start))
                })
                .collect();

            grid.tiles_mut()
                .par_iter_mut()
                .for_each(|tile| record_references(&services.structures, tile, &starts));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::WorldSeed;
    use crate::stage::StageError;
    use crate::structure::{StructureCatalog, StructureKind};

    fn services_with(kinds: Vec<StructureKind>) -> Arc<GenerationServices> {
        Arc::new(
            GenerationServices::new(WorldSeed::new(21))
                .with_structures(StructureCatalog::unchecked(kinds)),
        )
    }

    fn tower(spacing: i32, separation: i32) -> StructureKind {
        StructureKind {
            id: 1,
            name: "tower".to_string(),
            spacing,
            separation,
            salt: 1,
            radius: 12,
            height: 5,
        }
    }

    #[tokio::test]
    async fn test_starts_and_references() {
        let services = services_with(vec![tower(4, 1)]);
        let grid = ScratchGrid::build(TileCoord::new(0, 0));

        let grid = StructureStartsStage.run(grid, services.clone()).await.unwrap();
        let holders: Vec<TileCoord> = grid
            .tiles()
            .iter()
            .filter(|t| !t.structure_starts().is_empty())
            .map(|t| t.coord())
            .collect();
        assert!(!holders.is_empty());

        let grid = StructureReferencesStage.run(grid, services).await.unwrap();
        for holder in holders {
            let tile = grid.tile(holder).unwrap();
            assert!(
                tile.structure_refs().contains(&holder),
                "a holder is covered by its own footprint"
            );
        }
    }

    #[tokio::test]
    async fn test_corrupt_catalog_fails_stage() {
        let services = services_with(vec![tower(0, 0)]);
        let grid = ScratchGrid::build(TileCoord::new(0, 0));
        let result = StructureStartsStage.run(grid, services).await;
        assert!(matches!(result, Err(StageError::CorruptStructureData(_))));
    }
}
