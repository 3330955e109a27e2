//! # Voxel State
//!
//! The content of one unit cube. Voxels are plain values: copied and
//! compared by value, never aliased between tiles.

use bytemuck::{Pod, Zeroable};

/// A single voxel in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Voxel {
    /// Voxel type ID.
    pub id: u16,
    /// Voxel metadata (orientation, growth stage, etc.).
    pub meta: u16,
}

impl Voxel {
    /// The filler voxel. Absent sections are entirely made of it.
    pub const FILLER: Self = Self { id: 0, meta: 0 };
    /// Grass.
    pub const GRASS: Self = Self { id: 1, meta: 0 };
    /// Stone.
    pub const STONE: Self = Self { id: 2, meta: 0 };
    /// Dirt.
    pub const DIRT: Self = Self { id: 3, meta: 0 };
    /// Wood/Log.
    pub const WOOD: Self = Self { id: 4, meta: 0 };
    /// Leaves.
    pub const LEAVES: Self = Self { id: 5, meta: 0 };
    /// Cobblestone, used by structure pieces.
    pub const COBBLESTONE: Self = Self { id: 6, meta: 0 };
    /// Bedrock.
    pub const BEDROCK: Self = Self { id: 7, meta: 0 };
    /// Gravel, lines carved liquid channels.
    pub const GRAVEL: Self = Self { id: 8, meta: 0 };
    /// Water.
    pub const WATER: Self = Self { id: 10, meta: 0 };
    /// Sand.
    pub const SAND: Self = Self { id: 11, meta: 0 };

    /// Creates a new voxel with given ID.
    #[inline]
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self { id, meta: 0 }
    }

    /// Creates a voxel with ID and metadata.
    #[inline]
    #[must_use]
    pub const fn with_meta(id: u16, meta: u16) -> Self {
        Self { id, meta }
    }

    /// Returns true if this is the filler voxel.
    #[inline]
    #[must_use]
    pub const fn is_filler(self) -> bool {
        self.id == Self::FILLER.id && self.meta == Self::FILLER.meta
    }

    /// Returns true if this voxel is a liquid.
    #[inline]
    #[must_use]
    pub const fn is_liquid(self) -> bool {
        self.id == Self::WATER.id
    }
}
