//! # RECHUNK Procedural
//!
//! Generation services and the eight generation stages.
//!
//! ## Features
//!
//! - **Deterministic**: terrain, biomes, caves and structures depend only on
//!   the world seed and the absolute position
//! - **Seamless**: every stage runs over the whole scratch grid, so the
//!   center tile sees its neighbours
//! - **Owned grids**: a stage owns the grid while it runs and hands it back
//!
//! ## Stage Order
//!
//! ```text
//! structure starts -> structure references -> biomes -> noise
//!   -> surface -> carvers -> liquid carvers -> features
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rechunk_core::{ScratchGrid, TileCoord};
//! use rechunk_procedural::{default_stages, GenerationServices, WorldSeed};
//!
//! let services = Arc::new(GenerationServices::new(WorldSeed::new(42)));
//! let mut grid = ScratchGrid::build(TileCoord::new(0, 0));
//! for stage in default_stages() {
//!     grid = stage.run(grid, services.clone()).await?;
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod biome;
pub mod lighting;
pub mod noise;
pub mod services;
pub mod stage;
pub mod stages;
pub mod structure;
pub mod terrain;

pub use biome::{Biome, BiomeClassifier};
pub use lighting::LightingProvider;
pub use noise::{SimplexNoise, WorldSeed};
pub use services::GenerationServices;
pub use stage::{
    spawn_stage_work, GenerationStage, PendingStage, StageError, StageKind, StageResult,
};
pub use stages::{
    default_stages, BiomeStage, CaveCarvingStage, FeaturePlacementStage, LiquidCarvingStage,
    NoiseStage, StructureReferencesStage, StructureStartsStage, SurfaceStage,
};
pub use structure::{default_structures, StructureCatalog, StructureKind};
pub use terrain::{CaveBand, TerrainGenerator, DEFAULT_SEA_LEVEL, MAX_SURFACE_HEIGHT};
