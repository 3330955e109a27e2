//! # Lighting Provider
//!
//! Keeps the per-column height maps of scratch tiles in step with their
//! voxels after features have been placed.

use rayon::prelude::*;

use rechunk_core::{ScratchGrid, Tile};

/// Height map service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightingProvider;

impl LightingProvider {
    /// Creates a provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Recomputes the height map of every tile in the grid.
    pub fn relight(&self, grid: &mut ScratchGrid) {
        grid.tiles_mut().par_iter_mut().for_each(|tile| self.relight_tile(tile));
    }

    /// Recomputes the height map of one tile.
    pub fn relight_tile(&self, tile: &mut Tile) {
        tile.recompute_height_map();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rechunk_core::{TileCoord, Voxel};

    #[test]
    fn test_relight_updates_every_tile() {
        let mut grid = ScratchGrid::build(TileCoord::new(0, 0));
        grid.center_mut().set_voxel(3, 90, 3, Voxel::STONE);
        grid.tiles_mut()[0].set_voxel(0, 12, 0, Voxel::DIRT);

        LightingProvider::new().relight(&mut grid);

        assert_eq!(grid.center().height(3, 3), 90);
        assert_eq!(grid.tiles()[0].height(0, 0), 12);
    }
}
