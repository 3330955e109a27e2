//! # Persisted World
//!
//! The long-lived voxel store a regeneration eventually writes into.
//!
//! The world is owned by the host, not by the regeneration engine. The
//! engine only reads through [`VoxelWorld`] and, after a fully successful
//! pipeline, writes the single target tile through [`WritableWorld`].
//! Worlds that cannot be written return `None` from
//! [`VoxelWorld::as_writable`].
//!
//! [`MemoryWorld`] is the in-memory implementation used by the CLI and the
//! tests. It takes its lock only for the instant of each write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::coord::{local_coordinate, section_index_at, TileCoord, VoxelPos};
use crate::error::{WorldError, WorldResult};
use crate::tile::TileVoxels;
use crate::voxel::Voxel;

/// Read access to a persisted voxel world.
pub trait VoxelWorld: Send + Sync {
    /// Human-readable world name.
    fn name(&self) -> &str;

    /// Reads the voxel at an absolute position (filler where nothing is stored).
    fn voxel(&self, pos: VoxelPos) -> Voxel;

    /// Returns true if `coord` lies inside the world border.
    fn contains_tile(&self, coord: TileCoord) -> bool;

    /// Resolves this world to its writable form, if it has one.
    fn as_writable(&self) -> Option<&dyn WritableWorld>;
}

/// Write access to a persisted voxel world.
pub trait WritableWorld: VoxelWorld {
    /// Writes one voxel at an absolute position.
    ///
    /// # Errors
    ///
    /// Returns an error if the world refuses the position.
    fn set_voxel(&self, pos: VoxelPos, voxel: Voxel) -> WorldResult<()>;

    /// Replaces every voxel of one tile in a single step.
    ///
    /// # Errors
    ///
    /// Returns an error if the world refuses the tile. Nothing is written
    /// in that case.
    fn replace_tile(&self, coord: TileCoord, voxels: TileVoxels) -> WorldResult<()>;
}

/// Whether a [`MemoryWorld`] accepts writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorldAccess {
    /// Reads and writes.
    #[default]
    ReadWrite,
    /// Reads only; `as_writable` returns `None`.
    ReadOnly,
}

/// In-memory persisted world.
pub struct MemoryWorld {
    /// World name.
    name: String,
    /// Read/write access.
    access: WorldAccess,
    /// Largest allowed `|tile.x|` and `|tile.z|`, if bordered.
    border: Option<i32>,
    /// Stored tiles. Missing tiles read as filler.
    tiles: RwLock<HashMap<TileCoord, TileVoxels>>,
    /// Successful write operations (voxel writes and tile replacements).
    writes: AtomicU64,
}

impl MemoryWorld {
    /// Creates an empty, writable, unbounded world.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: WorldAccess::ReadWrite,
            border: None,
            tiles: RwLock::new(HashMap::new()),
            writes: AtomicU64::new(0),
        }
    }

    /// Sets the access mode.
    #[must_use]
    pub fn with_access(mut self, access: WorldAccess) -> Self {
        self.access = access;
        self
    }

    /// Limits the world to tiles with `|x| <= radius` and `|z| <= radius`.
    #[must_use]
    pub fn with_border(mut self, radius: i32) -> Self {
        self.border = Some(radius);
        self
    }

    /// Access mode of this world.
    #[must_use]
    pub const fn access(&self) -> WorldAccess {
        self.access
    }

    /// Stores a tile directly, bypassing access checks.
    ///
    /// Used by hosts to populate a world before handing it out.
    pub fn load_tile(&self, coord: TileCoord, mut voxels: TileVoxels) {
        voxels.compact();
        self.tiles.write().insert(coord, voxels);
    }

    /// Copies the current content of a tile.
    #[must_use]
    pub fn snapshot_tile(&self, coord: TileCoord) -> TileVoxels {
        self.tiles.read().get(&coord).cloned().unwrap_or_default()
    }

    /// Number of stored tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.read().len()
    }

    /// Coordinates of all stored tiles, sorted.
    #[must_use]
    pub fn tile_coords(&self) -> Vec<TileCoord> {
        let mut coords: Vec<_> = self.tiles.read().keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Number of successful write operations so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    fn check_tile(&self, coord: TileCoord) -> WorldResult<()> {
        if self.contains_tile(coord) {
            Ok(())
        } else {
            Err(WorldError::TileOutOfBounds(coord))
        }
    }

    fn check_writable(&self) -> WorldResult<()> {
        match self.access {
            WorldAccess::ReadWrite => Ok(()),
            WorldAccess::ReadOnly => Err(WorldError::ReadOnly(self.name.clone())),
        }
    }
}

impl VoxelWorld for MemoryWorld {
    fn name(&self) -> &str {
        &self.name
    }

    fn voxel(&self, pos: VoxelPos) -> Voxel {
        if section_index_at(pos.y).is_none() {
            return Voxel::FILLER;
        }
        self.tiles.read().get(&pos.tile()).map_or(Voxel::FILLER, |tile| {
            tile.get(local_coordinate(pos.x), pos.y, local_coordinate(pos.z))
        })
    }

    fn contains_tile(&self, coord: TileCoord) -> bool {
        match self.border {
            Some(radius) => {
                radius >= 0
                    && coord.x.unsigned_abs() <= radius as u32
                    && coord.z.unsigned_abs() <= radius as u32
            }
            None => true,
        }
    }

    fn as_writable(&self) -> Option<&dyn WritableWorld> {
        match self.access {
            WorldAccess::ReadWrite => Some(self),
            WorldAccess::ReadOnly => None,
        }
    }
}

impl WritableWorld for MemoryWorld {
    fn set_voxel(&self, pos: VoxelPos, voxel: Voxel) -> WorldResult<()> {
        self.check_writable()?;
        self.check_tile(pos.tile())?;
        if section_index_at(pos.y).is_none() {
            return Err(WorldError::VoxelOutOfBounds(pos));
        }

        self.tiles
            .write()
            .entry(pos.tile())
            .or_default()
            .set(local_coordinate(pos.x), pos.y, local_coordinate(pos.z), voxel);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn replace_tile(&self, coord: TileCoord, mut voxels: TileVoxels) -> WorldResult<()> {
        self.check_writable()?;
        self.check_tile(coord)?;

        voxels.compact();
        self.tiles.write().insert(coord, voxels);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryWorld")
            .field("name", &self.name)
            .field("access", &self.access)
            .field("border", &self.border)
            .field("tiles", &self.tile_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unstored_tiles_read_filler() {
        let world = MemoryWorld::new("test");
        assert_eq!(world.voxel(VoxelPos::new(5, 64, 5)), Voxel::FILLER);
        assert_eq!(world.voxel(VoxelPos::new(5, -1, 5)), Voxel::FILLER);
    }

    #[test]
    fn test_set_and_read_voxel() {
        let world = MemoryWorld::new("test");
        let pos = VoxelPos::new(-20, 70, 33);
        world.set_voxel(pos, Voxel::STONE).unwrap();
        assert_eq!(world.voxel(pos), Voxel::STONE);
        assert_eq!(world.write_count(), 1);
        assert_eq!(world.tile_coords(), vec![TileCoord::new(-2, 2)]);
    }

    #[test]
    fn test_read_only_world_is_not_writable() {
        let world = MemoryWorld::new("frozen").with_access(WorldAccess::ReadOnly);
        assert!(world.as_writable().is_none());
        assert_eq!(
            world.set_voxel(VoxelPos::new(0, 0, 0), Voxel::STONE),
            Err(WorldError::ReadOnly("frozen".into()))
        );
    }

    #[test]
    fn test_border_rejects_writes() {
        let world = MemoryWorld::new("small").with_border(2);
        assert!(world.contains_tile(TileCoord::new(2, -2)));
        assert!(!world.contains_tile(TileCoord::new(3, 0)));
        assert!(!world.contains_tile(TileCoord::new(i32::MIN, 0)));

        let outside = VoxelPos::new(16 * 3, 10, 0);
        assert_eq!(
            world.set_voxel(outside, Voxel::STONE),
            Err(WorldError::TileOutOfBounds(TileCoord::new(3, 0)))
        );
        assert_eq!(world.write_count(), 0);
    }

    #[test]
    fn test_vertical_bounds() {
        let world = MemoryWorld::new("test");
        let pos = VoxelPos::new(0, 256, 0);
        assert_eq!(
            world.set_voxel(pos, Voxel::STONE),
            Err(WorldError::VoxelOutOfBounds(pos))
        );
    }

    #[test]
    fn test_replace_tile() {
        let world = MemoryWorld::new("test");
        let coord = TileCoord::new(1, 1);
        world.set_voxel(VoxelPos::new(16, 5, 16), Voxel::DIRT).unwrap();

        let mut voxels = TileVoxels::new();
        voxels.set(3, 100, 4, Voxel::WOOD);
        world.replace_tile(coord, voxels).unwrap();

        assert_eq!(world.voxel(VoxelPos::new(16, 5, 16)), Voxel::FILLER);
        assert_eq!(world.voxel(VoxelPos::new(19, 100, 20)), Voxel::WOOD);
        assert_eq!(world.snapshot_tile(coord).non_filler_count(), 1);
    }
}
