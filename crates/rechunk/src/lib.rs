//! # RECHUNK
//!
//! Regenerates a single tile of a persisted voxel world from the world seed.
//!
//! ## Guarantees
//!
//! - **Center only**: a 17x17 grid of tiles is generated so the center sees
//!   its neighbours, but only the center tile is written back
//! - **Bounded**: every stage wait is bounded by the stage timeout
//!   (10 seconds by default)
//! - **All or nothing**: a failing or timed-out stage leaves the world
//!   untouched
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rechunk::{RegenConfig, Regenerator};
//! use rechunk_core::{MemoryWorld, TileCoord};
//!
//! let world = MemoryWorld::new("overworld");
//! let regenerator = Regenerator::new(RegenConfig::production(42))?;
//! assert!(regenerator.regenerate(&world, TileCoord::new(10, 10)));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod commit;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod regen;

pub use commit::{tile_writes, CommitMode, CommitReport, CommitWriter};
pub use config::{RegenConfig, DEFAULT_SEED, DEFAULT_STAGE_TIMEOUT, MAX_STAGE_TIMEOUT};
pub use error::{ConfigError, RegenError, RegenResult};
pub use pipeline::{PipelineDriver, PipelineState, StageSet};
pub use regen::{RegenOutcome, Regenerator};
