//! # Terrain Generator
//!
//! Column-level answers for the shaping and carving stages: surface
//! height, biome, cave bands and ocean channels. Everything is a pure
//! function of the seed and the absolute column, so neighbouring tiles
//! agree at their shared edges.

use rechunk_core::TILE_HEIGHT;

use crate::biome::{Biome, BiomeClassifier};
use crate::noise::{SimplexNoise, WorldSeed};

/// Default sea level.
pub const DEFAULT_SEA_LEVEL: i32 = 64;

/// Highest Y a generated surface may reach.
pub const MAX_SURFACE_HEIGHT: i32 = 200;

/// Number of subsoil layers under the surface voxel.
pub const SUBSOIL_DEPTH: i32 = 3;

/// Lowest Y a cave may open at (bedrock stays intact).
pub const CAVE_FLOOR: i32 = 2;

/// Solid voxels kept between a cave roof and the surface.
pub const CAVE_ROOF_MARGIN: i32 = 5;

/// Vertical band carved out of one column by the cave carver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaveBand {
    /// Lowest carved Y (inclusive).
    pub bottom: i32,
    /// Highest carved Y (inclusive).
    pub top: i32,
}

/// Deterministic terrain shape for one world seed.
#[derive(Debug)]
pub struct TerrainGenerator {
    seed: WorldSeed,
    sea_level: i32,
    classifier: BiomeClassifier,
    cave_center: SimplexNoise,
    cave_width: SimplexNoise,
    channel: SimplexNoise,
}

impl TerrainGenerator {
    const CAVE_SCALE: f64 = 0.03;
    const CHANNEL_SCALE: f64 = 0.02;
    const CHANNEL_THRESHOLD: f64 = 0.55;

    /// Creates a generator with the default sea level.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self::with_sea_level(seed, DEFAULT_SEA_LEVEL)
    }

    /// Creates a generator with a custom sea level.
    #[must_use]
    pub fn with_sea_level(seed: WorldSeed, sea_level: i32) -> Self {
        Self {
            seed,
            sea_level: sea_level.clamp(1, TILE_HEIGHT as i32 - 1),
            classifier: BiomeClassifier::new(seed),
            cave_center: SimplexNoise::new(seed.derive(100)),
            cave_width: SimplexNoise::new(seed.derive(101)),
            channel: SimplexNoise::new(seed.derive(102)),
        }
    }

    /// World seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Sea level.
    #[inline]
    #[must_use]
    pub const fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// Biome of an absolute column.
    #[inline]
    #[must_use]
    pub fn biome_at(&self, x: i32, z: i32) -> Biome {
        self.classifier.classify(x, z)
    }

    /// Height of the topmost solid voxel of an absolute column.
    #[inline]
    #[must_use]
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        self.classifier
            .surface_height(x, z, self.sea_level, MAX_SURFACE_HEIGHT)
    }

    /// Cave band of a column whose surface is at `surface`, if any.
    ///
    /// The band never reaches bedrock and never breaks through the surface.
    #[must_use]
    pub fn cave_band(&self, x: i32, z: i32, surface: i32) -> Option<CaveBand> {
        let (fx, fz) = (f64::from(x) * Self::CAVE_SCALE, f64::from(z) * Self::CAVE_SCALE);
        let half_width = (self.cave_width.sample(fx, fz) * 4.0 - 1.0).floor() as i32;
        if half_width <= 0 {
            return None;
        }

        let center = 12 + (self.cave_center.sample_unit(fx, fz) * 40.0) as i32;
        let bottom = (center - half_width).max(CAVE_FLOOR);
        let top = (center + half_width).min(surface - CAVE_ROOF_MARGIN);
        (bottom <= top).then_some(CaveBand { bottom, top })
    }

    /// Depth of the ocean channel cut into a column, 0 for none.
    #[must_use]
    pub fn channel_depth(&self, x: i32, z: i32) -> i32 {
        let n = self.channel.ridged(
            f64::from(x) * Self::CHANNEL_SCALE,
            f64::from(z) * Self::CHANNEL_SCALE,
            2,
            0.5,
            2.0,
        );
        if n <= Self::CHANNEL_THRESHOLD {
            return 0;
        }
        1 + ((n - Self::CHANNEL_THRESHOLD) / (1.0 - Self::CHANNEL_THRESHOLD) * 4.0) as i32
    }
}
