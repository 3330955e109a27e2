//! # Structures
//!
//! Structures are placed on a coarse region grid: each kind splits the
//! world into `spacing` x `spacing` tile regions and anchors at most one
//! start per region. A start's footprint can span several tiles, so tiles
//! that a structure reaches into keep a reference to the tile holding the
//! start. The feature stage later builds the pieces across tile seams.

use serde::{Deserialize, Serialize};

use rechunk_core::{
    StructureStart, Tile, TileCoord, VoxelPos, SCRATCH_RADIUS, TILE_HEIGHT, TILE_SIZE,
};

use crate::noise::WorldSeed;
use crate::stage::StageError;

/// One kind of structure the catalog can place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureKind {
    /// Catalog ID stored in structure starts.
    pub id: u16,
    /// Display name.
    pub name: String,
    /// Region size in tiles.
    pub spacing: i32,
    /// Minimum gap in tiles between starts of neighbouring regions.
    pub separation: i32,
    /// Seed salt for placement.
    pub salt: u64,
    /// Horizontal half-extent of the structure in voxels.
    pub radius: i32,
    /// Wall height in voxels.
    pub height: i32,
}

impl StructureKind {
    /// Footprint half-extent in tiles, rounded up.
    #[must_use]
    pub const fn tile_reach(&self) -> i32 {
        (self.radius + TILE_SIZE as i32 - 1) / TILE_SIZE as i32
    }

    /// Tile chosen to hold the start for the region containing `coord`.
    fn candidate(&self, seed: WorldSeed, coord: TileCoord) -> (TileCoord, u64) {
        let region_x = coord.x.div_euclid(self.spacing);
        let region_z = coord.z.div_euclid(self.spacing);
        let hash = seed.derive(self.salt).mix(region_x, region_z);

        let window = (self.spacing - self.separation).max(1) as u64;
        let offset_x = (hash % window) as i32;
        let offset_z = ((hash >> 32) % window) as i32;

        let tile = TileCoord::new(
            region_x * self.spacing + offset_x,
            region_z * self.spacing + offset_z,
        );
        (tile, hash)
    }
}

/// The built-in structure kinds.
#[must_use]
pub fn default_structures() -> Vec<StructureKind> {
    vec![
        StructureKind {
            id: 1,
            name: "watchtower".to_string(),
            spacing: 6,
            separation: 2,
            salt: 0x7a11,
            radius: 3,
            height: 9,
        },
        StructureKind {
            id: 2,
            name: "ruin".to_string(),
            spacing: 10,
            separation: 4,
            salt: 0x2b1e,
            radius: 20,
            height: 4,
        },
    ]
}

/// Validated set of structure kinds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StructureCatalog {
    kinds: Vec<StructureKind>,
}

impl StructureCatalog {
    /// Builds and validates a catalog.
    ///
    /// # Errors
    ///
    /// Returns `StageError::CorruptStructureData` for zero spacing, a
    /// separation not smaller than the spacing, non-positive extents or
    /// duplicate IDs.
    pub fn new(kinds: Vec<StructureKind>) -> Result<Self, StageError> {
        let catalog = Self::unchecked(kinds);
        catalog.validate()?;
        Ok(catalog)
    }

    /// Wraps kinds without validating them.
    ///
    /// The structure stages call [`StructureCatalog::validate`] before
    /// placing anything, so a bad catalog fails the run instead of this
    /// constructor.
    #[must_use]
    pub fn unchecked(kinds: Vec<StructureKind>) -> Self {
        Self { kinds }
    }

    /// The built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self::unchecked(default_structures())
    }

    /// Catalog entries.
    #[must_use]
    pub fn kinds(&self) -> &[StructureKind] {
        &self.kinds
    }

    /// Entry by ID.
    #[must_use]
    pub fn get(&self, id: u16) -> Option<&StructureKind> {
        self.kinds.iter().find(|kind| kind.id == id)
    }

    /// Checks every entry.
    ///
    /// # Errors
    ///
    /// See [`StructureCatalog::new`].
    pub fn validate(&self) -> Result<(), StageError> {
        for (index, kind) in self.kinds.iter().enumerate() {
            if kind.spacing <= 0 {
                return Err(StageError::CorruptStructureData(format!(
                    "'{}' has spacing {}",
                    kind.name, kind.spacing
                )));
            }
            if kind.separation < 0 || kind.separation >= kind.spacing {
                return Err(StageError::CorruptStructureData(format!(
                    "'{}' separation {} must be below spacing {}",
                    kind.name, kind.separation, kind.spacing
                )));
            }
            if kind.radius <= 0 || kind.height <= 0 {
                return Err(StageError::CorruptStructureData(format!(
                    "'{}' has an empty footprint",
                    kind.name
                )));
            }
            if kind.tile_reach() > SCRATCH_RADIUS || kind.height >= TILE_HEIGHT as i32 {
                return Err(StageError::CorruptStructureData(format!(
                    "'{}' does not fit in a scratch grid",
                    kind.name
                )));
            }
            if self.kinds[..index].iter().any(|other| other.id == kind.id) {
                return Err(StageError::CorruptStructureData(format!(
                    "duplicate structure id {}",
                    kind.id
                )));
            }
        }
        Ok(())
    }

    /// Starts anchored in `tile`, one per kind at most.
    ///
    /// `surface` gives the terrain height of an absolute column; starts sit
    /// one voxel above it.
    pub fn starts_for(
        &self,
        seed: WorldSeed,
        coord: TileCoord,
        surface: impl Fn(i32, i32) -> i32,
    ) -> Vec<StructureStart> {
        self.kinds
            .iter()
            .filter_map(|kind| {
                let (chosen, hash) = kind.candidate(seed, coord);
                if chosen != coord {
                    return None;
                }
                let x = coord.min_voxel_x() + ((hash >> 8) % TILE_SIZE as u64) as i32;
                let z = coord.min_voxel_z() + ((hash >> 16) % TILE_SIZE as u64) as i32;
                Some(StructureStart {
                    kind: kind.id,
                    origin: VoxelPos::new(x, surface(x, z) + 1, z),
                })
            })
            .collect()
    }

    /// True if the footprint of `start` covers tile `coord`.
    #[must_use]
    pub fn covers(&self, start: &StructureStart, coord: TileCoord) -> bool {
        let Some(kind) = self.get(start.kind) else {
            return false;
        };
        if start.origin.tile().chebyshev_distance(coord) > kind.tile_reach() {
            return false;
        }
        let min = TileCoord::from_voxel(start.origin.x - kind.radius, start.origin.z - kind.radius);
        let max = TileCoord::from_voxel(start.origin.x + kind.radius, start.origin.z + kind.radius);
        (min.x..=max.x).contains(&coord.x) && (min.z..=max.z).contains(&coord.z)
    }

    /// Hollow square wall of `start`, as absolute positions.
    #[must_use]
    pub fn piece_positions(&self, start: &StructureStart) -> Vec<VoxelPos> {
        let Some(kind) = self.get(start.kind) else {
            return Vec::new();
        };
        let origin = start.origin;
        let r = kind.radius;
        let mut positions = Vec::new();
        for dy in 0..kind.height {
            for d in -r..=r {
                positions.push(VoxelPos::new(origin.x + d, origin.y + dy, origin.z - r));
                positions.push(VoxelPos::new(origin.x + d, origin.y + dy, origin.z + r));
                if d != -r && d != r {
                    positions.push(VoxelPos::new(origin.x - r, origin.y + dy, origin.z + d));
                    positions.push(VoxelPos::new(origin.x + r, origin.y + dy, origin.z + d));
                }
            }
        }
        positions
    }
}

/// Records on `tile` every start in `starts` whose footprint covers it.
pub fn record_references(
    catalog: &StructureCatalog,
    tile: &mut Tile,
    starts: &[(TileCoord, StructureStart)],
) {
    let coord = tile.coord();
    for (holder, start) in starts {
        if catalog.covers(start, coord) {
            tile.add_structure_ref(*holder);
        }
    }
}
