//! # Coordinates
//!
//! Tile and voxel addressing.
//!
//! Storage inside tiles and sections is always addressed by local indices
//! in `0..16`, regardless of where the tile sits in the world. Absolute
//! coordinates are translated with [`local_coordinate`], which keeps the
//! low four bits and is therefore periodic with period 16 (negative
//! coordinates included).

/// Tile width/depth in voxels.
pub const TILE_SIZE: usize = 16;

/// Section edge length in voxels.
pub const SECTION_SIZE: usize = 16;

/// Number of vertically stacked sections in a tile.
pub const SECTIONS_PER_TILE: usize = 16;

/// Tile height in voxels.
pub const TILE_HEIGHT: usize = SECTION_SIZE * SECTIONS_PER_TILE;

/// Voxels stored in one present section.
pub const VOXELS_PER_SECTION: usize = SECTION_SIZE * SECTION_SIZE * SECTION_SIZE;

/// Voxels covered by one tile (all sections).
pub const VOXELS_PER_TILE: usize = VOXELS_PER_SECTION * SECTIONS_PER_TILE;

/// Maps an absolute coordinate onto local `0..16` addressing.
///
/// `local_coordinate(c) == local_coordinate(c + 16 * k)` for every `k`.
#[inline]
#[must_use]
pub const fn local_coordinate(world_coordinate: i32) -> usize {
    (world_coordinate & 15) as usize
}

/// Returns the index of the section containing `world_y`.
///
/// `None` outside `0..TILE_HEIGHT`.
#[inline]
#[must_use]
pub const fn section_index_at(world_y: i32) -> Option<usize> {
    if world_y < 0 || world_y >= TILE_HEIGHT as i32 {
        None
    } else {
        Some(world_y as usize / SECTION_SIZE)
    }
}

/// Tile coordinate (identifies a tile in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// X coordinate (in tiles, not voxels).
    pub x: i32,
    /// Z coordinate (in tiles, not voxels).
    pub z: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world voxel coordinates to the containing tile.
    #[inline]
    #[must_use]
    pub const fn from_voxel(voxel_x: i32, voxel_z: i32) -> Self {
        Self {
            x: voxel_x.div_euclid(TILE_SIZE as i32),
            z: voxel_z.div_euclid(TILE_SIZE as i32),
        }
    }

    /// Returns the tile offset by `(dx, dz)` tiles.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
        }
    }

    /// First world X covered by this tile.
    #[inline]
    #[must_use]
    pub const fn min_voxel_x(self) -> i32 {
        self.x * TILE_SIZE as i32
    }

    /// First world Z covered by this tile.
    #[inline]
    #[must_use]
    pub const fn min_voxel_z(self) -> i32 {
        self.z * TILE_SIZE as i32
    }

    /// Last world X covered by this tile.
    #[inline]
    #[must_use]
    pub const fn max_voxel_x(self) -> i32 {
        self.min_voxel_x() + TILE_SIZE as i32 - 1
    }

    /// Last world Z covered by this tile.
    #[inline]
    #[must_use]
    pub const fn max_voxel_z(self) -> i32 {
        self.min_voxel_z() + TILE_SIZE as i32 - 1
    }

    /// Chebyshev distance in tiles.
    #[inline]
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> i32 {
        let dx = (self.x - other.x).abs();
        let dz = (self.z - other.z).abs();
        if dx > dz {
            dx
        } else {
            dz
        }
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

/// Absolute voxel position in the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VoxelPos {
    /// World X.
    pub x: i32,
    /// World Y (0 is the bottom of the world).
    pub y: i32,
    /// World Z.
    pub z: i32,
}

impl VoxelPos {
    /// Creates a new voxel position.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Tile containing this position.
    #[inline]
    #[must_use]
    pub const fn tile(self) -> TileCoord {
        TileCoord::from_voxel(self.x, self.z)
    }

    /// Section index containing this position, if within world height.
    #[inline]
    #[must_use]
    pub const fn section_index(self) -> Option<usize> {
        section_index_at(self.y)
    }

    /// Local `(x, y, z)` within the containing section.
    #[inline]
    #[must_use]
    pub const fn local(self) -> (usize, usize, usize) {
        (
            local_coordinate(self.x),
            local_coordinate(self.y),
            local_coordinate(self.z),
        )
    }
}

impl std::fmt::Display for VoxelPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
