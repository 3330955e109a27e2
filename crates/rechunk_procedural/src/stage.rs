//! # Generation Stages
//!
//! A stage takes ownership of the scratch grid, transforms it and hands it
//! back through a [`PendingStage`] future. The regeneration driver bounds
//! every wait on that future; if the wait times out the future is dropped
//! and the grid it owned goes with it.
//!
//! Stage bodies are CPU bound, so [`spawn_stage_work`] moves them onto a
//! blocking worker. Nothing a stage does is visible outside its grid.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use rechunk_core::{ScratchGrid, TileCoord};

use crate::services::GenerationServices;

/// The eight stages, in the only order the pipeline runs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    /// Decide which structures are anchored in which tile.
    StructureStarts,
    /// Record which tiles each structure reaches into.
    StructureReferences,
    /// Assign a biome to every column.
    Biomes,
    /// Fill the base terrain shape.
    Noise,
    /// Replace the top layers with biome surface voxels.
    Surface,
    /// Carve caves.
    Carvers,
    /// Carve liquid-filled channels.
    LiquidCarvers,
    /// Place decorations and structure pieces, then relight.
    Features,
}

impl StageKind {
    /// Number of stages.
    pub const COUNT: usize = 8;

    /// Execution order.
    pub const ORDER: [Self; Self::COUNT] = [
        Self::StructureStarts,
        Self::StructureReferences,
        Self::Biomes,
        Self::Noise,
        Self::Surface,
        Self::Carvers,
        Self::LiquidCarvers,
        Self::Features,
    ];

    /// Position in [`StageKind::ORDER`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase name used in logs and config.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StructureStarts => "structure_starts",
            Self::StructureReferences => "structure_references",
            Self::Biomes => "biomes",
            Self::Noise => "noise",
            Self::Surface => "surface",
            Self::Carvers => "carvers",
            Self::LiquidCarvers => "liquid_carvers",
            Self::Features => "features",
        }
    }

    /// Parses a name produced by [`StageKind::name`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure reported by a stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// Structure catalog entries cannot be placed.
    #[error("corrupt structure data: {0}")]
    CorruptStructureData(String),

    /// A tile the stage needs is not part of the grid.
    #[error("tile {0} is not part of the scratch grid")]
    MissingTile(TileCoord),

    /// The stage worker panicked or was cancelled.
    #[error("stage worker failed: {0}")]
    WorkerPanicked(String),

    /// Stage-specific failure.
    #[error("{0}")]
    Custom(String),
}

/// Result of a stage run.
pub type StageResult = Result<ScratchGrid, StageError>;

/// Future completing with the transformed grid.
pub type PendingStage = Pin<Box<dyn Future<Output = StageResult> + Send + 'static>>;

/// One step of the generation pipeline.
pub trait GenerationStage: Send + Sync {
    /// Which stage this is.
    fn kind(&self) -> StageKind;

    /// Starts the stage over `grid`.
    ///
    /// The returned future owns the grid until it completes.
    fn run(&self, grid: ScratchGrid, services: Arc<GenerationServices>) -> PendingStage;
}

/// Runs `work` over the grid on a blocking worker.
///
/// Must be polled inside a tokio runtime. A panic inside `work` surfaces
/// as [`StageError::WorkerPanicked`].
pub fn spawn_stage_work<F>(
    mut grid: ScratchGrid,
    services: Arc<GenerationServices>,
    work: F,
) -> PendingStage
where
    F: FnOnce(&mut ScratchGrid, &GenerationServices) -> Result<(), StageError> + Send + 'static,
{
    Box::pin(async move {
        tokio::task::spawn_blocking(move || {
            work(&mut grid, &services)?;
            grid.mark_stage_applied();
            Ok(grid)
        })
        .await
        .map_err(|err| StageError::WorkerPanicked(err.to_string()))?
    })
}
