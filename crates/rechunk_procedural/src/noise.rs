//! # Seeds and Simplex Noise
//!
//! Every generation service derives its randomness from one [`WorldSeed`].
//! Given the same seed, every function here returns exactly the same value
//! on any platform, which is what lets a regenerated tile match the tile
//! that was generated the first time.

/// World seed for deterministic generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for one purpose (biomes, caves, ...).
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }

    /// Hashes an integer pair under this seed (splitmix64 finaliser).
    ///
    /// Used to pick per-tile and per-region values without noise sampling.
    #[inline]
    #[must_use]
    pub const fn mix(self, a: i32, b: i32) -> u64 {
        let mut z = self.0
            ^ (a as u32 as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ (b as u32 as u64).wrapping_mul(0xc2b2_ae3d_27d4_eb4f);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

/// Gradient directions for 2D simplex noise.
const GRADIENTS: [[i8; 2]; 12] = [
    [1, 0], [1, 1], [0, 1], [-1, 1],
    [-1, 0], [-1, -1], [0, -1], [1, -1],
    [1, 0], [0, 1], [-1, 0], [0, -1],
];

/// 2D Simplex noise generator.
///
/// Produces smooth, continuous values in `[-1, 1]`. Sampling is O(1) and
/// allocation free; the permutation table is built once per seed.
#[derive(Clone)]
pub struct SimplexNoise {
    /// 256-entry permutation, doubled so lookups never wrap.
    perm: [u8; 512],
}

impl SimplexNoise {
    /// Skewing factor for the 2D simplex grid, (sqrt(3) - 1) / 2.
    const F2: f64 = 0.366_025_403_784_439;
    /// Unskewing factor, (3 - sqrt(3)) / 6.
    const G2: f64 = 0.211_324_865_405_187;

    /// Creates a noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates with xorshift64; zero state would never move.
        let mut state = seed.value() | 1;
        for i in (1..256).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        let (low, high) = perm.split_at_mut(256);
        high.copy_from_slice(low);

        Self { perm }
    }

    #[inline]
    fn hash(&self, index: usize) -> u8 {
        self.perm[index & 511]
    }

    /// Samples noise at `(x, y)`. Returns a value in `[-1, 1]`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = floor_to_i32(x + skew);
        let j = floor_to_i32(y + skew);

        let unskew = f64::from(i + j) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1) + Self::G2;
        let y1 = y0 - f64::from(j1) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let i1 = i1 as usize;
        let j1 = j1 as usize;

        let g0 = self.hash(ii + self.hash(jj) as usize);
        let g1 = self.hash(ii + i1 + self.hash(jj + j1) as usize);
        let g2 = self.hash(ii + 1 + self.hash(jj + 1) as usize);

        let total = corner(x0, y0, g0) + corner(x1, y1, g1) + corner(x2, y2, g2);
        (70.0 * total).clamp(-1.0, 1.0)
    }

    /// Fractal Brownian motion: `octaves` layers of noise, normalised.
    ///
    /// `persistence` is the amplitude decay per octave, `lacunarity` the
    /// frequency growth. Result stays in `[-1, 1]`.
    #[must_use]
    pub fn fbm(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude == 0.0 {
            0.0
        } else {
            total / max_amplitude
        }
    }

    /// Ridged noise, `1 - |n|` squared per octave. Result in `[0, 1]`.
    #[must_use]
    pub fn ridged(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            let ridge = 1.0 - self.sample(x * frequency, y * frequency).abs();
            total += ridge * ridge * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude == 0.0 {
            0.0
        } else {
            total / max_amplitude
        }
    }

    /// Maps a sample onto `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn sample_unit(&self, x: f64, y: f64) -> f64 {
        (self.sample(x, y) + 1.0) * 0.5
    }
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise").finish_non_exhaustive()
    }
}

/// Contribution of one simplex corner.
#[inline]
fn corner(x: f64, y: f64, hash: u8) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let grad = GRADIENTS[(hash % 12) as usize];
    let t2 = t * t;
    t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
}

#[inline]
fn floor_to_i32(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi - 1
    } else {
        xi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = WorldSeed::new(12345);
        let a = SimplexNoise::new(seed);
        let b = SimplexNoise::new(seed);

        for i in 0..200 {
            let x = f64::from(i) * 0.37 - 20.0;
            let y = f64::from(i) * 0.11 + 5.0;
            assert_eq!(a.sample(x, y), b.sample(x, y));
            assert_eq!(a.fbm(x, y, 4, 0.5, 2.0), b.fbm(x, y, 4, 0.5, 2.0));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = SimplexNoise::new(WorldSeed::new(1));
        let b = SimplexNoise::new(WorldSeed::new(2));
        let differing = (0..50)
            .filter(|&i| {
                let x = f64::from(i) * 1.7 + 0.3;
                a.sample(x, x * 0.5) != b.sample(x, x * 0.5)
            })
            .count();
        assert!(differing > 40, "Seeds should decorrelate noise, only {differing} differ");
    }

    #[test]
    fn test_range() {
        let noise = SimplexNoise::new(WorldSeed::new(42));
        for i in 0..10_000 {
            let x = f64::from(i) * 0.1 - 500.0;
            let y = f64::from(i) * 0.13 - 650.0;
            let v = noise.sample(x, y);
            assert!((-1.0..=1.0).contains(&v), "Value {v} out of range at ({x}, {y})");
            let u = noise.sample_unit(x, y);
            assert!((0.0..=1.0).contains(&u));
        }
    }

    #[test]
    fn test_continuity() {
        let noise = SimplexNoise::new(WorldSeed::new(42));
        let v1 = noise.sample(100.0, 100.0);
        let v2 = noise.sample(100.001, 100.0);
        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_seed_derivation() {
        let base = WorldSeed::new(42);
        assert_ne!(base.derive(1), base.derive(2));
        assert_eq!(base.derive(1), base.derive(1));
        assert_ne!(base.derive(1), base);
    }

    #[test]
    fn test_mix_spreads_neighbors() {
        let seed = WorldSeed::new(7);
        assert_eq!(seed.mix(3, -4), seed.mix(3, -4));
        assert_ne!(seed.mix(3, -4), seed.mix(-4, 3));
        assert_ne!(seed.mix(0, 0), seed.mix(0, 1));
        assert_ne!(seed.mix(0, 0), WorldSeed::new(8).mix(0, 0));
    }
}
