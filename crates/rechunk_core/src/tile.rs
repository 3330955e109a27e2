//! # Tiles
//!
//! A tile is a 16x16 column footprint split into 16 stacked sections.
//!
//! Generation state lives next to the voxels: per-column biome ids and
//! height map, the structure starts anchored in the tile and the tiles
//! whose structures reach into it. A tile is `Proto` while the pipeline is
//! still filling it in and `Complete` once every stage was applied.

use crate::coord::{
    local_coordinate, section_index_at, TileCoord, VoxelPos, SECTIONS_PER_TILE, SECTION_SIZE,
    TILE_HEIGHT, TILE_SIZE,
};
use crate::section::Section;
use crate::voxel::Voxel;

/// Generation status of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TileStatus {
    /// Freshly allocated, stage data not yet computed.
    #[default]
    Proto,
    /// All pipeline stages applied.
    Complete,
}

/// A structure anchored in a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StructureStart {
    /// Catalog ID of the structure kind.
    pub kind: u16,
    /// Absolute position of the structure origin.
    pub origin: VoxelPos,
}

/// The 16 sections of one tile, detached from any generation state.
///
/// Used for snapshots and for swapping a whole tile into a world at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileVoxels {
    sections: [Section; SECTIONS_PER_TILE],
}

impl TileVoxels {
    /// Creates an all-filler tile buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps existing sections.
    #[must_use]
    pub fn from_sections(sections: [Section; SECTIONS_PER_TILE]) -> Self {
        Self { sections }
    }

    /// Reads the voxel at local column `(lx, lz)` and absolute `y`.
    #[inline]
    #[must_use]
    pub fn get(&self, lx: usize, y: i32, lz: usize) -> Voxel {
        match section_index_at(y) {
            Some(index) => self.sections[index].get(lx, local_coordinate(y), lz),
            None => Voxel::FILLER,
        }
    }

    /// Writes the voxel at local column `(lx, lz)` and absolute `y`.
    ///
    /// Writes outside the tile height are ignored.
    #[inline]
    pub fn set(&mut self, lx: usize, y: i32, lz: usize, voxel: Voxel) {
        if let Some(index) = section_index_at(y) {
            self.sections[index].set(lx, local_coordinate(y), lz, voxel);
        }
    }

    /// Section at `index`.
    #[inline]
    #[must_use]
    pub fn section(&self, index: usize) -> &Section {
        &self.sections[index]
    }

    /// All sections, bottom to top.
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[Section; SECTIONS_PER_TILE] {
        &self.sections
    }

    /// Mutable access to all sections.
    #[inline]
    pub fn sections_mut(&mut self) -> &mut [Section; SECTIONS_PER_TILE] {
        &mut self.sections
    }

    /// Number of non-filler voxels over all sections.
    #[must_use]
    pub fn non_filler_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| usize::from(s.non_filler_count()))
            .sum()
    }

    /// Drops storage of sections that hold only filler.
    pub fn compact(&mut self) {
        for section in &mut self.sections {
            section.compact();
        }
    }
}

/// A tile of voxel data plus its generation state.
#[derive(Clone, Debug)]
pub struct Tile {
    /// Tile position in the world.
    coord: TileCoord,
    /// Generation status.
    status: TileStatus,
    /// Number of generation stages applied so far.
    stages_applied: u8,
    /// Voxel data.
    voxels: TileVoxels,
    /// Biome IDs per column (indexed as [z][x]).
    biomes: [[u8; TILE_SIZE]; TILE_SIZE],
    /// Highest non-filler Y per column (indexed as [z][x]).
    height_map: [[u8; TILE_SIZE]; TILE_SIZE],
    /// Structures anchored in this tile.
    structure_starts: Vec<StructureStart>,
    /// Tiles holding starts whose structures reach into this tile.
    structure_refs: Vec<TileCoord>,
}

impl Tile {
    /// Creates a new proto tile with all sections absent.
    #[must_use]
    pub fn new(coord: TileCoord) -> Self {
        Self {
            coord,
            status: TileStatus::Proto,
            stages_applied: 0,
            voxels: TileVoxels::new(),
            biomes: [[0; TILE_SIZE]; TILE_SIZE],
            height_map: [[0; TILE_SIZE]; TILE_SIZE],
            structure_starts: Vec::new(),
            structure_refs: Vec::new(),
        }
    }

    /// Tile position in the world.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Generation status.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> TileStatus {
        self.status
    }

    /// Returns true once every stage has been applied.
    #[inline]
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.status, TileStatus::Complete)
    }

    /// Number of generation stages applied so far.
    #[inline]
    #[must_use]
    pub const fn stages_applied(&self) -> u8 {
        self.stages_applied
    }

    /// Records that one more stage ran over this tile.
    #[inline]
    pub fn mark_stage_applied(&mut self) {
        self.stages_applied = self.stages_applied.saturating_add(1);
    }

    /// Marks the tile as fully generated.
    #[inline]
    pub fn mark_complete(&mut self) {
        self.status = TileStatus::Complete;
    }

    /// Section at `index` (0 is the bottom).
    #[inline]
    #[must_use]
    pub fn section(&self, index: usize) -> &Section {
        self.voxels.section(index)
    }

    /// Voxel data of this tile.
    #[inline]
    #[must_use]
    pub fn voxels(&self) -> &TileVoxels {
        &self.voxels
    }

    /// Mutable voxel data of this tile.
    #[inline]
    pub fn voxels_mut(&mut self) -> &mut TileVoxels {
        &mut self.voxels
    }

    /// Consumes the tile, keeping only its voxel data.
    #[must_use]
    pub fn into_voxels(self) -> TileVoxels {
        self.voxels
    }

    /// Gets a voxel at local column `(lx, lz)` and absolute `y`.
    #[inline]
    #[must_use]
    pub fn get_voxel(&self, lx: usize, y: i32, lz: usize) -> Voxel {
        if lx < TILE_SIZE && lz < TILE_SIZE {
            self.voxels.get(lx, y, lz)
        } else {
            Voxel::FILLER
        }
    }

    /// Sets a voxel at local column `(lx, lz)` and absolute `y`.
    #[inline]
    pub fn set_voxel(&mut self, lx: usize, y: i32, lz: usize, voxel: Voxel) {
        if lx < TILE_SIZE && lz < TILE_SIZE {
            self.voxels.set(lx, y, lz, voxel);
        }
    }

    /// Gets the biome ID at a local column.
    #[inline]
    #[must_use]
    pub fn biome(&self, lx: usize, lz: usize) -> u8 {
        if lx < TILE_SIZE && lz < TILE_SIZE {
            self.biomes[lz][lx]
        } else {
            0
        }
    }

    /// Sets the biome ID at a local column.
    #[inline]
    pub fn set_biome(&mut self, lx: usize, lz: usize, biome: u8) {
        if lx < TILE_SIZE && lz < TILE_SIZE {
            self.biomes[lz][lx] = biome;
        }
    }

    /// Gets the height map value at a local column.
    #[inline]
    #[must_use]
    pub fn height(&self, lx: usize, lz: usize) -> u8 {
        if lx < TILE_SIZE && lz < TILE_SIZE {
            self.height_map[lz][lx]
        } else {
            0
        }
    }

    /// Sets the height map value at a local column.
    #[inline]
    pub fn set_height(&mut self, lx: usize, lz: usize, height: u8) {
        if lx < TILE_SIZE && lz < TILE_SIZE {
            self.height_map[lz][lx] = height;
        }
    }

    /// Scans a column from the top for the highest non-filler voxel.
    #[must_use]
    pub fn highest_non_filler(&self, lx: usize, lz: usize) -> Option<i32> {
        for index in (0..SECTIONS_PER_TILE).rev() {
            let section = self.section(index);
            if section.is_empty() {
                continue;
            }
            for ly in (0..SECTION_SIZE).rev() {
                if !section.get(lx, ly, lz).is_filler() {
                    return Some(Section::y_offset(index) + ly as i32);
                }
            }
        }
        None
    }

    /// Rebuilds the whole height map from voxel data.
    pub fn recompute_height_map(&mut self) {
        for lz in 0..TILE_SIZE {
            for lx in 0..TILE_SIZE {
                let top = self.highest_non_filler(lx, lz).unwrap_or(0);
                self.height_map[lz][lx] = top.clamp(0, TILE_HEIGHT as i32 - 1) as u8;
            }
        }
    }

    /// Structures anchored in this tile.
    #[inline]
    #[must_use]
    pub fn structure_starts(&self) -> &[StructureStart] {
        &self.structure_starts
    }

    /// Anchors a structure in this tile.
    pub fn add_structure_start(&mut self, start: StructureStart) {
        self.structure_starts.push(start);
    }

    /// Tiles whose structures reach into this tile.
    #[inline]
    #[must_use]
    pub fn structure_refs(&self) -> &[TileCoord] {
        &self.structure_refs
    }

    /// Records a reference to a tile holding a structure start.
    pub fn add_structure_ref(&mut self, holder: TileCoord) {
        if !self.structure_refs.contains(&holder) {
            self.structure_refs.push(holder);
        }
    }
}
