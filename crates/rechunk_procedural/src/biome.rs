//! # Biome Classification
//!
//! Picks a biome per column from three noise channels: elevation,
//! temperature and humidity. Elevation also drives the terrain height, so
//! ocean biomes always sit below sea level.

use rechunk_core::Voxel;

use crate::noise::{SimplexNoise, WorldSeed};

/// Biome of a column. The discriminant is what tiles store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Biome {
    /// Deep ocean
    DeepOcean = 0,
    /// Shallow ocean
    Ocean = 1,
    /// Coastline
    Beach = 2,
    /// Grassland
    Plains = 3,
    /// Temperate forest
    Forest = 4,
    /// Arid sand
    Desert = 5,
    /// Cold forest
    Taiga = 6,
    /// Bare rock highlands
    Mountains = 7,
    /// Wetland
    Swamp = 8,
}

impl Biome {
    /// Every biome, in discriminant order.
    pub const ALL: [Self; 9] = [
        Self::DeepOcean,
        Self::Ocean,
        Self::Beach,
        Self::Plains,
        Self::Forest,
        Self::Desert,
        Self::Taiga,
        Self::Mountains,
        Self::Swamp,
    ];

    /// Stored biome ID.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Decodes a stored biome ID. Unknown IDs fall back to plains.
    #[must_use]
    pub const fn from_id(id: u8) -> Self {
        match id {
            0 => Self::DeepOcean,
            1 => Self::Ocean,
            2 => Self::Beach,
            4 => Self::Forest,
            5 => Self::Desert,
            6 => Self::Taiga,
            7 => Self::Mountains,
            8 => Self::Swamp,
            _ => Self::Plains,
        }
    }

    /// True for biomes whose floor lies under the sea.
    #[inline]
    #[must_use]
    pub const fn is_ocean(self) -> bool {
        matches!(self, Self::DeepOcean | Self::Ocean)
    }

    /// Top voxel of a column in this biome.
    #[must_use]
    pub const fn surface_voxel(self) -> Voxel {
        match self {
            Self::DeepOcean => Voxel::GRAVEL,
            Self::Ocean | Self::Beach | Self::Desert => Voxel::SAND,
            Self::Mountains => Voxel::STONE,
            Self::Plains | Self::Forest | Self::Taiga | Self::Swamp => Voxel::GRASS,
        }
    }

    /// Voxel of the layers directly under the surface.
    #[must_use]
    pub const fn subsoil_voxel(self) -> Voxel {
        match self {
            Self::DeepOcean => Voxel::GRAVEL,
            Self::Ocean | Self::Beach | Self::Desert => Voxel::SAND,
            Self::Mountains => Voxel::STONE,
            Self::Plains | Self::Forest | Self::Taiga | Self::Swamp => Voxel::DIRT,
        }
    }

    /// Average tree density (0-100).
    #[must_use]
    pub const fn tree_density(self) -> u8 {
        match self {
            Self::Forest => 50,
            Self::Taiga => 40,
            Self::Swamp => 30,
            Self::Plains => 5,
            _ => 0,
        }
    }
}

/// Classifies biomes and elevation from world coordinates.
pub struct BiomeClassifier {
    temperature_noise: SimplexNoise,
    humidity_noise: SimplexNoise,
    elevation_noise: SimplexNoise,
}

impl BiomeClassifier {
    const TEMPERATURE_SCALE: f64 = 0.002;
    const HUMIDITY_SCALE: f64 = 0.003;
    const ELEVATION_SCALE: f64 = 0.0025;

    /// Creates a classifier from a world seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            temperature_noise: SimplexNoise::new(seed.derive(1)),
            humidity_noise: SimplexNoise::new(seed.derive(2)),
            elevation_noise: SimplexNoise::new(seed.derive(3)),
        }
    }

    /// Biome at absolute column `(x, z)`.
    #[must_use]
    pub fn classify(&self, x: i32, z: i32) -> Biome {
        let (fx, fz) = (f64::from(x), f64::from(z));
        let elevation = self.elevation(fx, fz);
        let temperature = self.temperature(fx, fz, elevation);
        let humidity = self.humidity(fx, fz);
        Self::classify_climate(elevation, temperature, humidity)
    }

    /// Elevation in `[-1, 1]`. Negative below sea level.
    #[must_use]
    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        let base = self.elevation_noise.fbm(
            x * Self::ELEVATION_SCALE,
            z * Self::ELEVATION_SCALE,
            4,
            0.5,
            2.0,
        );
        let ridges = self.elevation_noise.ridged(
            x * Self::ELEVATION_SCALE * 1.5,
            z * Self::ELEVATION_SCALE * 1.5,
            3,
            0.5,
            2.0,
        );
        shape_elevation(base * 0.8 + ridges * 0.2)
    }

    fn temperature(&self, x: f64, z: f64, elevation: f64) -> f64 {
        let base = self
            .temperature_noise
            .sample(x * Self::TEMPERATURE_SCALE, z * Self::TEMPERATURE_SCALE);
        // Colder with altitude.
        (base - elevation.max(0.0) * 0.5).clamp(-1.0, 1.0)
    }

    fn humidity(&self, x: f64, z: f64) -> f64 {
        self.humidity_noise.fbm(
            x * Self::HUMIDITY_SCALE,
            z * Self::HUMIDITY_SCALE,
            4,
            0.5,
            2.0,
        )
    }

    fn classify_climate(elevation: f64, temperature: f64, humidity: f64) -> Biome {
        if elevation < -0.5 {
            return Biome::DeepOcean;
        }
        if elevation < -0.2 {
            return Biome::Ocean;
        }
        if elevation < -0.1 {
            return Biome::Beach;
        }
        if elevation > 0.6 {
            return Biome::Mountains;
        }

        match (temperature, humidity) {
            (t, h) if t < -0.2 && h > 0.0 => Biome::Taiga,
            (t, h) if t > 0.4 && h < -0.2 => Biome::Desert,
            (_, h) if h > 0.5 && elevation < 0.1 => Biome::Swamp,
            (_, h) if h > 0.15 => Biome::Forest,
            _ => Biome::Plains,
        }
    }

    /// Surface height at absolute column `(x, z)`.
    ///
    /// Elevation 0 maps to `sea_level`; the result is clamped to
    /// `[1, max_height]`.
    #[must_use]
    pub fn surface_height(&self, x: i32, z: i32, sea_level: i32, max_height: i32) -> i32 {
        let elevation = self.elevation(f64::from(x), f64::from(z));
        let range = if elevation >= 0.0 {
            f64::from(max_height - sea_level)
        } else {
            f64::from(sea_level - 1)
        };
        let height = sea_level + (elevation * range * 0.8) as i32;
        height.clamp(1, max_height)
    }
}

impl std::fmt::Debug for BiomeClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiomeClassifier").finish_non_exhaustive()
    }
}

/// Flattens lowlands and steepens mountains.
fn shape_elevation(raw: f64) -> f64 {
    let shaped = if raw < -0.3 {
        raw
    } else if raw < -0.1 {
        -0.3 + (raw + 0.3) * 0.5
    } else if raw < 0.3 {
        -0.2 + (raw + 0.1) / 0.4 * 0.3
    } else if raw < 0.5 {
        0.1 + (raw - 0.3) / 0.2 * 0.3
    } else {
        0.4 + (raw - 0.5) / 0.5 * 0.6
    };
    shaped.clamp(-1.0, 1.0)
}
