//! # Scratch Neighborhood
//!
//! Regeneration never patches persisted tiles. Instead it builds a
//! disconnected 17x17 grid of empty proto tiles around the target, runs the
//! whole generation pipeline over it (later stages read the neighbors to
//! avoid seams), and only the center tile ever leaves the grid.
//!
//! ## Layout
//!
//! ```text
//!  dx = -8 ........................ +8
//!  +---------------------------------+  dz = -8
//!  |                                 |
//!  |                C                |  C = (R, R), linear index 144
//!  |                                 |
//!  +---------------------------------+  dz = +8
//! ```
//!
//! Tiles are stored row-major by x offset, then z offset.

use crate::coord::{local_coordinate, TileCoord, VoxelPos, TILE_SIZE};
use crate::tile::{Tile, TileVoxels};
use crate::voxel::Voxel;

/// Neighborhood radius in tiles.
pub const SCRATCH_RADIUS: i32 = 8;

/// Side length of the scratch grid (always odd).
pub const SCRATCH_SIDE: usize = (2 * SCRATCH_RADIUS + 1) as usize;

/// Number of tiles in a scratch grid.
pub const SCRATCH_TILE_COUNT: usize = SCRATCH_SIDE * SCRATCH_SIDE;

/// Largest `|x|` or `|z|` of a grid center.
///
/// Keeps every absolute voxel coordinate of the grid, plus a margin of one
/// grid side for features reaching past its edge, inside `i32`.
pub const MAX_SCRATCH_CENTER: i32 =
    i32::MAX / TILE_SIZE as i32 - SCRATCH_RADIUS - 2 * SCRATCH_SIDE as i32;

/// Ephemeral grid of proto tiles centered on a regeneration target.
///
/// Owned by exactly one regeneration call; never registered anywhere.
#[derive(Clone, Debug)]
pub struct ScratchGrid {
    /// Target tile.
    center: TileCoord,
    /// `SCRATCH_TILE_COUNT` tiles, row-major by x offset then z offset.
    tiles: Vec<Tile>,
}

impl ScratchGrid {
    /// True if a grid around `center` stays addressable in `i32` voxel
    /// coordinates. See [`MAX_SCRATCH_CENTER`].
    #[inline]
    #[must_use]
    pub const fn fits(center: TileCoord) -> bool {
        center.x >= -MAX_SCRATCH_CENTER
            && center.x <= MAX_SCRATCH_CENTER
            && center.z >= -MAX_SCRATCH_CENTER
            && center.z <= MAX_SCRATCH_CENTER
    }

    /// Builds the 17x17 grid of fresh proto tiles around `center`.
    ///
    /// No tile is read from or shared with any world. `center` must satisfy
    /// [`ScratchGrid::fits`].
    #[must_use]
    pub fn build(center: TileCoord) -> Self {
        let mut tiles = Vec::with_capacity(SCRATCH_TILE_COUNT);
        for dx in -SCRATCH_RADIUS..=SCRATCH_RADIUS {
            for dz in -SCRATCH_RADIUS..=SCRATCH_RADIUS {
                tiles.push(Tile::new(center.offset(dx, dz)));
            }
        }
        Self { center, tiles }
    }

    /// Target tile coordinate.
    #[inline]
    #[must_use]
    pub const fn center_coord(&self) -> TileCoord {
        self.center
    }

    /// Linear index of the center tile.
    #[inline]
    #[must_use]
    pub const fn center_index() -> usize {
        SCRATCH_TILE_COUNT / 2
    }

    /// Number of tiles (always `SCRATCH_TILE_COUNT`).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false; present for API symmetry with `len`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// The center tile.
    #[inline]
    #[must_use]
    pub fn center(&self) -> &Tile {
        &self.tiles[Self::center_index()]
    }

    /// Mutable center tile.
    #[inline]
    pub fn center_mut(&mut self) -> &mut Tile {
        &mut self.tiles[Self::center_index()]
    }

    /// Consumes the grid, keeping only the center tile's voxels.
    #[must_use]
    pub fn into_center(mut self) -> TileVoxels {
        self.tiles.swap_remove(Self::center_index()).into_voxels()
    }

    /// Linear index of the tile at `coord`, if inside the grid.
    #[must_use]
    pub fn index_of(&self, coord: TileCoord) -> Option<usize> {
        let dx = coord.x.checked_sub(self.center.x)?;
        let dz = coord.z.checked_sub(self.center.z)?;
        if dx.unsigned_abs() > SCRATCH_RADIUS as u32 || dz.unsigned_abs() > SCRATCH_RADIUS as u32 {
            return None;
        }
        let row = (dx + SCRATCH_RADIUS) as usize;
        let col = (dz + SCRATCH_RADIUS) as usize;
        Some(row * SCRATCH_SIDE + col)
    }

    /// Returns true if `coord` lies inside the grid.
    #[inline]
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.index_of(coord).is_some()
    }

    /// Tile at `coord`.
    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index_of(coord).map(|i| &self.tiles[i])
    }

    /// Mutable tile at `coord`.
    pub fn tile_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.index_of(coord).map(move |i| &mut self.tiles[i])
    }

    /// All tiles in storage order.
    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// All tiles, mutable, in storage order.
    #[inline]
    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Reads a voxel by absolute position anywhere in the grid.
    ///
    /// `None` outside the grid's horizontal extent.
    #[must_use]
    pub fn voxel(&self, pos: VoxelPos) -> Option<Voxel> {
        self.tile(pos.tile()).map(|tile| {
            tile.get_voxel(local_coordinate(pos.x), pos.y, local_coordinate(pos.z))
        })
    }

    /// Writes a voxel by absolute position anywhere in the grid.
    ///
    /// Returns false when the position is outside the grid.
    pub fn set_voxel(&mut self, pos: VoxelPos, voxel: Voxel) -> bool {
        match self.tile_mut(pos.tile()) {
            Some(tile) => {
                tile.set_voxel(local_coordinate(pos.x), pos.y, local_coordinate(pos.z), voxel);
                true
            }
            None => false,
        }
    }

    /// Records one applied stage on every tile.
    pub fn mark_stage_applied(&mut self) {
        for tile in &mut self.tiles {
            tile.mark_stage_applied();
        }
    }

    /// Marks every tile as fully generated.
    pub fn mark_complete(&mut self) {
        for tile in &mut self.tiles {
            tile.mark_complete();
        }
    }

    /// Returns true if every tile is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tiles.iter().all(Tile::is_complete)
    }
}
