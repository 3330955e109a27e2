//! # Commit Writer
//!
//! Copies the generated center tile into the persisted world. This is the
//! only code that writes to the world, and it runs only after every stage
//! succeeded.
//!
//! Every one of the 16 sections is written. An absent section is written as
//! sixteen layers of filler, so whatever the world held at that height is
//! cleared. Positions are computed from the tile origin; storage is read
//! with the local (`& 15`) coordinate of each absolute position.

use serde::{Deserialize, Serialize};

use rechunk_core::{
    local_coordinate, Section, TileCoord, TileVoxels, Voxel, VoxelPos, WritableWorld,
    SECTIONS_PER_TILE, SECTION_SIZE, TILE_SIZE, VOXELS_PER_TILE,
};

use crate::error::RegenResult;

/// How the center tile is written back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Materialise the whole tile, then swap it in with one
    /// `replace_tile` call. A refused commit leaves the world untouched.
    #[default]
    Atomic,
    /// One `set_voxel` per voxel. A refused write stops the commit and
    /// earlier writes stay in place.
    BestEffort,
}

/// Outcome of a successful commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitReport {
    /// Target tile.
    pub tile: TileCoord,
    /// Voxel states written (always the full tile on success).
    pub voxels_written: usize,
    /// Sections that were absent and written as filler.
    pub absent_sections: usize,
    /// Mode used.
    pub mode: CommitMode,
}

/// Writes one generated tile into a persisted world.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommitWriter {
    mode: CommitMode,
}

impl CommitWriter {
    /// Creates a writer using `mode`.
    #[must_use]
    pub const fn new(mode: CommitMode) -> Self {
        Self { mode }
    }

    /// Mode of this writer.
    #[must_use]
    pub const fn mode(&self) -> CommitMode {
        self.mode
    }

    /// Writes `voxels` as tile `coord` of `world`.
    ///
    /// # Errors
    ///
    /// Returns `RegenError::Commit` with the world's reason if a write is
    /// refused.
    pub fn commit(
        &self,
        world: &dyn WritableWorld,
        coord: TileCoord,
        voxels: &TileVoxels,
    ) -> RegenResult<CommitReport> {
        let absent_sections = voxels.sections().iter().filter(|s| s.is_absent()).count();

        match self.mode {
            CommitMode::Atomic => {
                world.replace_tile(coord, materialise(coord, voxels))?;
            }
            CommitMode::BestEffort => {
                for (pos, voxel) in tile_writes(coord, voxels) {
                    world.set_voxel(pos, voxel)?;
                }
            }
        }

        tracing::debug!(
            tile = %coord,
            mode = ?self.mode,
            absent_sections,
            "Tile committed"
        );
        Ok(CommitReport {
            tile: coord,
            voxels_written: VOXELS_PER_TILE,
            absent_sections,
            mode: self.mode,
        })
    }
}

/// Every `(absolute position, state)` pair the commit writes, section by
/// section, then Y, Z, X.
pub fn tile_writes(
    coord: TileCoord,
    voxels: &TileVoxels,
) -> impl Iterator<Item = (VoxelPos, Voxel)> + '_ {
    let (min_x, min_z) = (coord.min_voxel_x(), coord.min_voxel_z());
    (0..SECTIONS_PER_TILE).flat_map(move |index| {
        let section = voxels.section(index);
        let base_y = Section::y_offset(index);
        (0..SECTION_SIZE as i32).flat_map(move |dy| {
            (0..TILE_SIZE as i32).flat_map(move |dz| {
                (0..TILE_SIZE as i32).map(move |dx| {
                    let pos = VoxelPos::new(min_x + dx, base_y + dy, min_z + dz);
                    (pos, section_state(section, pos))
                })
            })
        })
    })
}

/// State an absolute position takes from its section.
fn section_state(section: &Section, pos: VoxelPos) -> Voxel {
    match section {
        Section::Absent => Voxel::FILLER,
        Section::Present(data) => data.get(
            local_coordinate(pos.x),
            local_coordinate(pos.y),
            local_coordinate(pos.z),
        ),
    }
}

/// Builds the complete replacement tile, absent sections included.
fn materialise(coord: TileCoord, voxels: &TileVoxels) -> TileVoxels {
    let mut out = TileVoxels::new();
    for (pos, voxel) in tile_writes(coord, voxels) {
        out.set(local_coordinate(pos.x), pos.y, local_coordinate(pos.z), voxel);
    }
    out
}
