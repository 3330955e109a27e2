//! # Regenerator
//!
//! The entry point: regenerate one tile of a persisted world from scratch.
//!
//! 1. Resolve the world to its writable form (else `InvalidWorld`)
//! 2. Build a fresh 17x17 scratch grid around the tile
//! 3. Run the eight stages, each wait bounded by the stage timeout
//! 4. Commit the center tile, and only the center tile
//!
//! Any failure before step 4 leaves the world exactly as it was.

use std::path::Path;
use std::sync::Arc;

use rechunk_core::{ScratchGrid, TileCoord, VoxelWorld};
use rechunk_procedural::GenerationStage;

use crate::commit::{CommitReport, CommitWriter};
use crate::config::RegenConfig;
use crate::error::{RegenError, RegenResult};
use crate::pipeline::{PipelineDriver, StageSet};

/// Result of a regeneration with a human-readable explanation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegenOutcome {
    /// Whether the tile was regenerated.
    pub success: bool,
    /// What happened, suitable for showing to an operator.
    pub message: String,
    /// Commit details on success.
    pub report: Option<CommitReport>,
}

impl RegenOutcome {
    fn from_result(tile: TileCoord, result: RegenResult<CommitReport>) -> Self {
        match result {
            Ok(report) => Self {
                success: true,
                message: format!("Tile {tile} regenerated"),
                report: Some(report),
            },
            Err(err) => Self {
                success: false,
                message: format!("Tile {tile} not regenerated: {err}"),
                report: None,
            },
        }
    }
}

/// Regenerates single tiles.
///
/// Holds only configuration and the stage set. Generation services are
/// built per call and dropped when it returns.
#[derive(Debug, Default)]
pub struct Regenerator {
    config: RegenConfig,
    stages: StageSet,
}

impl Regenerator {
    /// Creates a regenerator with the default stages.
    ///
    /// # Errors
    ///
    /// Returns `RegenError::Config` if `config` is out of range.
    pub fn new(config: RegenConfig) -> RegenResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stages: StageSet::default(),
        })
    }

    /// Creates a regenerator with a custom stage list.
    ///
    /// # Errors
    ///
    /// Returns `RegenError::Config` for a bad config and
    /// `RegenError::InvalidStageSet` unless `stages` holds the eight
    /// stage kinds in pipeline order.
    pub fn with_stages(
        config: RegenConfig,
        stages: Vec<Arc<dyn GenerationStage>>,
    ) -> RegenResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stages: StageSet::new(stages)?,
        })
    }

    /// Creates a regenerator from a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns `RegenError::Config` if the file cannot be loaded.
    pub fn from_config_file(path: impl AsRef<Path>) -> RegenResult<Self> {
        Self::new(RegenConfig::load(path)?)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &RegenConfig {
        &self.config
    }

    /// Regenerates `tile`, blocking until done.
    ///
    /// Returns true only if every stage finished in time and the tile was
    /// written. On false the world is unchanged, unless a best-effort commit
    /// was refused part way.
    pub fn regenerate(&self, world: &dyn VoxelWorld, tile: TileCoord) -> bool {
        self.regenerate_with_feedback(world, tile).success
    }

    /// Like [`Regenerator::regenerate`], with an explanation.
    pub fn regenerate_with_feedback(
        &self,
        world: &dyn VoxelWorld,
        tile: TileCoord,
    ) -> RegenOutcome {
        let outcome = RegenOutcome::from_result(tile, self.try_regenerate(world, tile));
        if !outcome.success {
            tracing::warn!(tile = %tile, world = world.name(), "{}", outcome.message);
        }
        outcome
    }

    /// Regenerates `tile` from inside an async runtime.
    pub async fn regenerate_async(&self, world: &dyn VoxelWorld, tile: TileCoord) -> bool {
        match self.try_regenerate_async(world, tile).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(
                    tile = %tile,
                    world = world.name(),
                    error = %err,
                    "Regeneration failed"
                );
                false
            }
        }
    }

    /// Regenerates `tile` on an internal single-threaded runtime.
    ///
    /// # Errors
    ///
    /// Returns `RegenError::Runtime` when called from inside a tokio
    /// runtime (use [`Regenerator::try_regenerate_async`] there), otherwise
    /// as [`Regenerator::try_regenerate_async`].
    pub fn try_regenerate(
        &self,
        world: &dyn VoxelWorld,
        tile: TileCoord,
    ) -> RegenResult<CommitReport> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(RegenError::Runtime(std::io::Error::other(
                "blocking regeneration called from inside an async runtime",
            )));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let result = runtime.block_on(self.try_regenerate_async(world, tile));
        // A timed-out stage may still hold a blocking worker; do not wait for it.
        runtime.shutdown_background();
        result
    }

    /// Regenerates `tile`.
    ///
    /// # Errors
    ///
    /// - `InvalidWorld` if the world is not writable (no grid is built)
    /// - `OutOfBounds` if the tile is outside the world border, or too far
    ///   out for its neighborhood to be addressed
    /// - `StageFailed` / `StageTimedOut` if a stage did not finish
    /// - `Commit` if the world refused the write
    pub async fn try_regenerate_async(
        &self,
        world: &dyn VoxelWorld,
        tile: TileCoord,
    ) -> RegenResult<CommitReport> {
        tracing::info!(tile = %tile, world = world.name(), "Regenerating tile");

        let writable = world
            .as_writable()
            .ok_or_else(|| RegenError::InvalidWorld(world.name().to_string()))?;
        if !world.contains_tile(tile) || !ScratchGrid::fits(tile) {
            return Err(RegenError::OutOfBounds(tile));
        }

        let services = Arc::new(self.config.services());
        let mut driver = PipelineDriver::new(&self.stages, self.config.stage_timeout());
        let grid = driver.run(ScratchGrid::build(tile), services).await?;

        let center = grid.into_center();
        let writer = CommitWriter::new(self.config.commit_mode);
        let report = writer.commit(writable, tile, &center)?;

        tracing::info!(
            tile = %tile,
            world = world.name(),
            voxels = report.voxels_written,
            "Tile regenerated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rechunk_core::{MemoryWorld, WorldAccess};

    #[test]
    fn test_read_only_world_is_invalid() {
        let world = MemoryWorld::new("archive").with_access(WorldAccess::ReadOnly);
        let regen = Regenerator::new(RegenConfig::testing()).unwrap();

        let err = regen.try_regenerate(&world, TileCoord::new(0, 0)).unwrap_err();
        assert!(matches!(err, RegenError::InvalidWorld(ref name) if name == "archive"));
        assert!(!regen.regenerate(&world, TileCoord::new(0, 0)));
    }

    #[test]
    fn test_out_of_bounds_tile() {
        let world = MemoryWorld::new("small").with_border(4);
        let regen = Regenerator::new(RegenConfig::testing()).unwrap();

        let outcome = regen.regenerate_with_feedback(&world, TileCoord::new(5, 0));
        assert!(!outcome.success);
        assert!(outcome.message.contains("outside the world border"));
        assert_eq!(world.write_count(), 0);
    }

    #[test]
    fn test_tiles_at_coordinate_limit_are_out_of_bounds() {
        let world = MemoryWorld::new("unbounded");
        let regen = Regenerator::new(RegenConfig::testing()).unwrap();

        for tile in [
            TileCoord::new(i32::MAX - 2, 0),
            TileCoord::new(0, i32::MIN),
            TileCoord::new(200_000_000, 0),
            TileCoord::new(0, -(rechunk_core::MAX_SCRATCH_CENTER + 1)),
        ] {
            let err = regen.try_regenerate(&world, tile).unwrap_err();
            assert!(matches!(err, RegenError::OutOfBounds(t) if t == tile));
            assert!(!regen.regenerate(&world, tile));
        }
        assert_eq!(world.write_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RegenConfig {
            stage_timeout_ms: 0,
            ..RegenConfig::default()
        };
        assert!(matches!(Regenerator::new(config), Err(RegenError::Config(_))));
    }

    #[tokio::test]
    async fn test_blocking_call_inside_runtime_is_refused() {
        let world = MemoryWorld::new("w");
        let regen = Regenerator::new(RegenConfig::testing()).unwrap();
        let err = regen.try_regenerate(&world, TileCoord::new(0, 0)).unwrap_err();
        assert!(matches!(err, RegenError::Runtime(_)));
        assert_eq!(world.tile_count(), 0);
    }
}
