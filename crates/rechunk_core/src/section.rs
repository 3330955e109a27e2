//! # Sections
//!
//! A section is the 16x16x16 vertical unit of a tile. Most sections high in
//! the air (and every section of a fresh proto tile) hold nothing but the
//! filler voxel, so a section is either [`Section::Present`] with its own
//! voxel buffer or [`Section::Absent`], which reads as filler everywhere.
//!
//! Voxels are stored in YZX order (`index = (y * 16 + z) * 16 + x`).

use crate::coord::{SECTION_SIZE, VOXELS_PER_SECTION};
use crate::voxel::Voxel;

/// Linear index of local `(x, y, z)` inside a section buffer.
#[inline]
#[must_use]
pub const fn section_offset(lx: usize, ly: usize, lz: usize) -> usize {
    (ly * SECTION_SIZE + lz) * SECTION_SIZE + lx
}

/// Owned voxel storage of a present section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionData {
    /// Voxels in YZX order.
    voxels: Box<[Voxel; VOXELS_PER_SECTION]>,
    /// Number of non-filler voxels.
    non_filler: u16,
}

impl SectionData {
    /// Creates a section buffer filled with the filler voxel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            voxels: Box::new([Voxel::FILLER; VOXELS_PER_SECTION]),
            non_filler: 0,
        }
    }

    /// Creates a section buffer where every voxel is `voxel`.
    #[must_use]
    pub fn filled(voxel: Voxel) -> Self {
        Self {
            voxels: Box::new([voxel; VOXELS_PER_SECTION]),
            non_filler: if voxel.is_filler() {
                0
            } else {
                VOXELS_PER_SECTION as u16
            },
        }
    }

    /// Reads a voxel at local coordinates.
    #[inline]
    #[must_use]
    pub fn get(&self, lx: usize, ly: usize, lz: usize) -> Voxel {
        self.voxels[section_offset(lx, ly, lz)]
    }

    /// Writes a voxel at local coordinates, returning the previous state.
    #[inline]
    pub fn set(&mut self, lx: usize, ly: usize, lz: usize, voxel: Voxel) -> Voxel {
        let slot = &mut self.voxels[section_offset(lx, ly, lz)];
        let previous = *slot;
        *slot = voxel;

        match (previous.is_filler(), voxel.is_filler()) {
            (true, false) => self.non_filler += 1,
            (false, true) => self.non_filler -= 1,
            _ => {}
        }
        previous
    }

    /// Number of non-filler voxels.
    #[inline]
    #[must_use]
    pub const fn non_filler_count(&self) -> u16 {
        self.non_filler
    }

    /// Returns true if every voxel is filler.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.non_filler == 0
    }

    /// Raw voxel slice in YZX order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Voxel] {
        self.voxels.as_slice()
    }
}

impl Default for SectionData {
    fn default() -> Self {
        Self::new()
    }
}

/// A 16x16x16 section, present or absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Section {
    /// The section has its own storage.
    Present(SectionData),
    /// The section is entirely filler.
    #[default]
    Absent,
}

impl Section {
    /// Absolute Y of the bottom layer of the section at `index`.
    #[inline]
    #[must_use]
    pub const fn y_offset(index: usize) -> i32 {
        (index * SECTION_SIZE) as i32
    }

    /// Returns true if the section is absent.
    #[inline]
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns true if the section reads as filler everywhere.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        match self {
            Self::Present(data) => data.is_empty(),
            Self::Absent => true,
        }
    }

    /// Reads a voxel at local coordinates.
    #[inline]
    #[must_use]
    pub fn get(&self, lx: usize, ly: usize, lz: usize) -> Voxel {
        voxel_at(self, lx, ly, lz)
    }

    /// Writes a voxel at local coordinates.
    ///
    /// Writing filler into an absent section leaves it absent. Writing
    /// anything else materialises the section first.
    pub fn set(&mut self, lx: usize, ly: usize, lz: usize, voxel: Voxel) -> Voxel {
        match self {
            Self::Present(data) => data.set(lx, ly, lz, voxel),
            Self::Absent if voxel.is_filler() => Voxel::FILLER,
            Self::Absent => {
                let mut data = SectionData::new();
                data.set(lx, ly, lz, voxel);
                *self = Self::Present(data);
                Voxel::FILLER
            }
        }
    }

    /// Drops storage of a present section that holds only filler.
    pub fn compact(&mut self) {
        if matches!(self, Self::Present(data) if data.is_empty()) {
            *self = Self::Absent;
        }
    }

    /// Number of non-filler voxels.
    #[must_use]
    pub const fn non_filler_count(&self) -> u16 {
        match self {
            Self::Present(data) => data.non_filler_count(),
            Self::Absent => 0,
        }
    }
}

/// Reads the voxel at local coordinates, substituting filler for absence.
#[inline]
#[must_use]
pub fn voxel_at(section: &Section, lx: usize, ly: usize, lz: usize) -> Voxel {
    match section {
        Section::Present(data) => data.get(lx, ly, lz),
        Section::Absent => Voxel::FILLER,
    }
}
