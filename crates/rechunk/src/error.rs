//! # Regeneration Error Types
//!
//! Everything that can stop a regeneration. The boolean entry points
//! collapse all of these to `false`; [`Regenerator::try_regenerate`]
//! returns them as-is.
//!
//! [`Regenerator::try_regenerate`]: crate::Regenerator::try_regenerate

use std::time::Duration;

use thiserror::Error;

use rechunk_core::{TileCoord, WorldError};
use rechunk_procedural::{StageError, StageKind};

/// Errors that can occur during regeneration.
#[derive(Error, Debug)]
pub enum RegenError {
    /// The world handed in cannot be written.
    #[error("world '{0}' is not a writable persisted world")]
    InvalidWorld(String),

    /// The target tile lies outside the world border.
    #[error("tile {0} is outside the world border")]
    OutOfBounds(TileCoord),

    /// A stage reported a failure.
    #[error("stage {stage} failed: {source}")]
    StageFailed {
        /// Stage that failed.
        stage: StageKind,
        /// Failure reported by the stage.
        #[source]
        source: StageError,
    },

    /// A stage did not finish within its time bound.
    #[error("stage {stage} timed out after {timeout:?}")]
    StageTimedOut {
        /// Stage that timed out.
        stage: StageKind,
        /// Bound that was exceeded.
        timeout: Duration,
    },

    /// The stage list is not the eight stages in pipeline order.
    #[error("invalid stage set: {0}")]
    InvalidStageSet(String),

    /// The persisted world refused the commit.
    #[error("commit failed: {0}")]
    Commit(#[from] WorldError),

    /// The async runtime could not be started.
    #[error("async runtime unavailable: {0}")]
    Runtime(#[from] std::io::Error),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RegenError {
    /// The stage this error is attributed to, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<StageKind> {
        match self {
            Self::StageFailed { stage, .. } | Self::StageTimedOut { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// True if the run stopped before the commit began.
    #[must_use]
    pub const fn is_pre_commit(&self) -> bool {
        !matches!(self, Self::Commit(_))
    }
}

/// Errors loading a [`RegenConfig`](crate::RegenConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range.
    #[error("invalid config value '{field}': {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for regeneration.
pub type RegenResult<T> = Result<T, RegenError>;
