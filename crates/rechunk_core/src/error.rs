//! # World Error Types
//!
//! Errors a persisted world can report to its writers.

use thiserror::Error;

use crate::coord::{TileCoord, VoxelPos};

/// Errors that can occur when writing to a persisted world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The world does not accept writes.
    #[error("world '{0}' is read-only")]
    ReadOnly(String),

    /// The tile lies outside the world border.
    #[error("tile {0} is outside the world border")]
    TileOutOfBounds(TileCoord),

    /// The voxel position lies outside the world.
    #[error("voxel {0} is outside the world")]
    VoxelOutOfBounds(VoxelPos),

    /// The world refused the write for its own reasons.
    #[error("write rejected at {pos}: {reason}")]
    Rejected {
        /// Position of the refused write.
        pos: VoxelPos,
        /// Reason given by the world.
        reason: String,
    },
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
