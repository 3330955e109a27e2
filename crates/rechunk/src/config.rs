//! # Regeneration Configuration
//!
//! Loaded once from TOML. Every field has a default, so an empty file is a
//! valid config.
//!
//! ```toml
//! stage_timeout_ms = 10000
//! commit_mode = "atomic"
//! seed = 42
//! sea_level = 64
//! feature_salt = 0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use rechunk_core::TILE_HEIGHT;
use rechunk_procedural::{
    GenerationServices, StructureCatalog, StructureKind, WorldSeed, DEFAULT_SEA_LEVEL,
};

use crate::commit::CommitMode;
use crate::error::ConfigError;

/// Default per-stage time bound.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default world seed. TOML integers are signed 64-bit, so seeds stay small.
pub const DEFAULT_SEED: u64 = 42;

/// Largest accepted per-stage time bound.
pub const MAX_STAGE_TIMEOUT: Duration = Duration::from_secs(600);

/// Regeneration settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegenConfig {
    /// Time bound for each stage wait, in milliseconds.
    pub stage_timeout_ms: u64,
    /// How the center tile is written back.
    pub commit_mode: CommitMode,
    /// World seed.
    pub seed: u64,
    /// Sea level.
    pub sea_level: i32,
    /// Salt mixed into decorative feature placement.
    pub feature_salt: u64,
    /// Structure kinds; the built-in catalog when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structures: Option<Vec<StructureKind>>,
}

impl Default for RegenConfig {
    fn default() -> Self {
        Self {
            stage_timeout_ms: DEFAULT_STAGE_TIMEOUT.as_millis() as u64,
            commit_mode: CommitMode::Atomic,
            seed: DEFAULT_SEED,
            sea_level: DEFAULT_SEA_LEVEL,
            feature_salt: 0,
            structures: None,
        }
    }
}

impl RegenConfig {
    /// Settings for a live server: default bounds, atomic commit.
    #[must_use]
    pub fn production(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Settings for tests: default seed and a generous bound for
    /// unoptimised builds.
    #[must_use]
    pub fn testing() -> Self {
        Self {
            stage_timeout_ms: 60_000,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::Invalid` for out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`RegenConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Renders the config as TOML.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` if rendering fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stage_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "stage_timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.stage_timeout() > MAX_STAGE_TIMEOUT {
            return Err(ConfigError::Invalid {
                field: "stage_timeout_ms",
                reason: format!("must not exceed {}", MAX_STAGE_TIMEOUT.as_millis()),
            });
        }
        if i64::try_from(self.seed).is_err() || i64::try_from(self.feature_salt).is_err() {
            return Err(ConfigError::Invalid {
                field: "seed",
                reason: "seed and feature_salt must fit in a signed 64-bit integer".to_string(),
            });
        }
        if self.sea_level < 1 || self.sea_level >= TILE_HEIGHT as i32 {
            return Err(ConfigError::Invalid {
                field: "sea_level",
                reason: format!("must be in 1..{TILE_HEIGHT}"),
            });
        }
        Ok(())
    }

    /// Per-stage time bound.
    #[must_use]
    pub const fn stage_timeout(&self) -> Duration {
        Duration::from_millis(self.stage_timeout_ms)
    }

    /// Builds the generation services these settings describe.
    ///
    /// Structure entries are not checked here; a bad catalog fails the
    /// structure stages instead.
    #[must_use]
    pub fn services(&self) -> GenerationServices {
        let structures = self
            .structures
            .clone()
            .map_or_else(StructureCatalog::builtin, StructureCatalog::unchecked);
        GenerationServices::new(WorldSeed::new(self.seed))
            .with_sea_level(self.sea_level)
            .with_structures(structures)
            .with_feature_salt(self.feature_salt)
    }
}
