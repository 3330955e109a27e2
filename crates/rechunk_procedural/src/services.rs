//! Generation services shared by every stage of a run.

use crate::lighting::LightingProvider;
use crate::noise::WorldSeed;
use crate::structure::StructureCatalog;
use crate::terrain::TerrainGenerator;

/// Context handed to stages: terrain, structures and lighting.
///
/// Read-only during a run, so stages share it behind an `Arc`.
#[derive(Debug)]
pub struct GenerationServices {
    /// Column-level terrain shape.
    pub terrain: TerrainGenerator,
    /// Structure kinds.
    pub structures: StructureCatalog,
    /// Height map maintenance.
    pub lighting: LightingProvider,
    /// Salt mixed into the feature RNG. Changing it changes decoration
    /// without touching terrain.
    pub feature_salt: u64,
}

impl GenerationServices {
    /// Services for `seed` with the built-in structures.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            terrain: TerrainGenerator::new(seed),
            structures: StructureCatalog::builtin(),
            lighting: LightingProvider::new(),
            feature_salt: 0,
        }
    }

    /// Replaces the sea level.
    #[must_use]
    pub fn with_sea_level(mut self, sea_level: i32) -> Self {
        self.terrain = TerrainGenerator::with_sea_level(self.terrain.seed(), sea_level);
        self
    }

    /// Replaces the structure catalog.
    #[must_use]
    pub fn with_structures(mut self, structures: StructureCatalog) -> Self {
        self.structures = structures;
        self
    }

    /// Replaces the feature salt.
    #[must_use]
    pub fn with_feature_salt(mut self, salt: u64) -> Self {
        self.feature_salt = salt;
        self
    }

    /// World seed.
    #[inline]
    #[must_use]
    pub fn seed(&self) -> WorldSeed {
        self.terrain.seed()
    }
}
