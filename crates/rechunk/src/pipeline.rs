//! # Stage Pipeline Driver
//!
//! Runs the eight stages over a scratch grid, strictly one after another.
//!
//! ```text
//! Idle -> Running(structure_starts) -> ... -> Running(features) -> Completed
//!                 |                                  |
//!                 +------- error or timeout ---------+--> Aborted(stage)
//! ```
//!
//! Each wait is bounded by the stage timeout. On the first failure or
//! timeout the driver stops: no further stage starts and the grid, still
//! owned by the abandoned stage future, is dropped with it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rechunk_core::ScratchGrid;
use rechunk_procedural::{default_stages, GenerationServices, GenerationStage, StageKind};

use crate::error::{RegenError, RegenResult};

/// Where a pipeline run is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PipelineState {
    /// No stage started yet.
    #[default]
    Idle,
    /// Waiting on this stage.
    Running(StageKind),
    /// Every stage finished and every tile is complete.
    Completed,
    /// Stopped at this stage; nothing after it ran.
    Aborted(StageKind),
}

impl PipelineState {
    /// True once the run can make no further progress.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted(_))
    }
}

/// The eight stages, checked to be in pipeline order.
#[derive(Clone)]
pub struct StageSet {
    stages: Vec<Arc<dyn GenerationStage>>,
}

impl StageSet {
    /// Validates a stage list.
    ///
    /// # Errors
    ///
    /// Returns `RegenError::InvalidStageSet` unless the list holds exactly
    /// one stage of every kind, in `StageKind::ORDER`.
    pub fn new(stages: Vec<Arc<dyn GenerationStage>>) -> RegenResult<Self> {
        if stages.len() != StageKind::COUNT {
            return Err(RegenError::InvalidStageSet(format!(
                "expected {} stages, got {}",
                StageKind::COUNT,
                stages.len()
            )));
        }
        for (stage, expected) in stages.iter().zip(StageKind::ORDER) {
            if stage.kind() != expected {
                return Err(RegenError::InvalidStageSet(format!(
                    "expected {expected} at position {}, got {}",
                    expected.index(),
                    stage.kind()
                )));
            }
        }
        Ok(Self { stages })
    }

    /// Stages in order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn GenerationStage>> {
        self.stages.iter()
    }

    /// Replaces the stage of the same kind.
    #[must_use]
    pub fn with_stage(mut self, stage: Arc<dyn GenerationStage>) -> Self {
        let index = stage.kind().index();
        self.stages[index] = stage;
        self
    }
}

impl Default for StageSet {
    fn default() -> Self {
        Self {
            stages: default_stages(),
        }
    }
}

impl std::fmt::Debug for StageSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|stage| stage.kind()))
            .finish()
    }
}

/// Drives one pipeline run.
#[derive(Debug)]
pub struct PipelineDriver<'a> {
    stages: &'a StageSet,
    stage_timeout: Duration,
    state: PipelineState,
    completed: Vec<StageKind>,
}

impl<'a> PipelineDriver<'a> {
    /// Creates an idle driver.
    #[must_use]
    pub fn new(stages: &'a StageSet, stage_timeout: Duration) -> Self {
        Self {
            stages,
            stage_timeout,
            state: PipelineState::Idle,
            completed: Vec::with_capacity(StageKind::COUNT),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Stages that finished, in the order they finished.
    #[must_use]
    pub fn completed_stages(&self) -> &[StageKind] {
        &self.completed
    }

    /// Runs every stage over `grid` and returns the completed grid.
    ///
    /// # Errors
    ///
    /// Returns `RegenError::StageFailed` or `RegenError::StageTimedOut` for
    /// the first stage that did not finish; the grid is dropped.
    pub async fn run(
        &mut self,
        mut grid: ScratchGrid,
        services: Arc<GenerationServices>,
    ) -> RegenResult<ScratchGrid> {
        let center = grid.center_coord();
        let stages = self.stages;

        for stage in stages.iter() {
            let kind = stage.kind();
            self.state = PipelineState::Running(kind);
            let started = Instant::now();

            let pending = stage.run(grid, Arc::clone(&services));
            grid = match tokio::time::timeout(self.stage_timeout, pending).await {
                Ok(Ok(next)) => next,
                Ok(Err(source)) => {
                    self.state = PipelineState::Aborted(kind);
                    tracing::warn!(
                        tile = %center,
                        stage = %kind,
                        error = %source,
                        "Stage failed"
                    );
                    return Err(RegenError::StageFailed {
                        stage: kind,
                        source,
                    });
                }
                Err(_) => {
                    self.state = PipelineState::Aborted(kind);
                    tracing::warn!(
                        tile = %center,
                        stage = %kind,
                        timeout_ms = self.stage_timeout.as_millis() as u64,
                        "Stage timed out"
                    );
                    return Err(RegenError::StageTimedOut {
                        stage: kind,
                        timeout: self.stage_timeout,
                    });
                }
            };

            self.completed.push(kind);
            tracing::debug!(
                tile = %center,
                stage = %kind,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Stage finished"
            );
        }

        grid.mark_complete();
        self.state = PipelineState::Completed;
        Ok(grid)
    }
}
