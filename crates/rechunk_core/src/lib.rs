//! # RECHUNK Core
//!
//! The data model every other RECHUNK crate builds on.
//!
//! ## Design Principles
//!
//! 1. **Local addressing**: storage is always indexed by `0..16` local
//!    coordinates; absolute coordinates are masked with `& 15`
//! 2. **Absence is explicit**: a section is `Present` or `Absent`, and
//!    absent sections read as the filler voxel
//! 3. **No aliasing**: tiles own their sections, copies are deep
//! 4. **Disposable neighborhoods**: the scratch grid is plain owned data
//!
//! ## Core Components
//!
//! - `Voxel`: Opaque voxel state, compared by value
//! - `Section` / `Tile`: Vertical sections stacked into tiles
//! - `ScratchGrid`: The 17x17 proto-tile neighborhood of a regeneration
//! - `VoxelWorld` / `WritableWorld`: The persisted world seen by the engine
//! - `MemoryWorld`: In-memory persisted world
//!
//! ## Example
//!
//! ```rust,ignore
//! use rechunk_core::{ScratchGrid, TileCoord};
//!
//! let grid = ScratchGrid::build(TileCoord::new(10, 10));
//! assert_eq!(grid.len(), 289);
//! assert_eq!(grid.center().coord(), TileCoord::new(10, 10));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod coord;
pub mod error;
pub mod scratch;
pub mod section;
pub mod tile;
pub mod voxel;
pub mod world;

pub use coord::{
    local_coordinate, section_index_at, TileCoord, VoxelPos, SECTIONS_PER_TILE, SECTION_SIZE,
    TILE_HEIGHT, TILE_SIZE, VOXELS_PER_SECTION, VOXELS_PER_TILE,
};
pub use error::{WorldError, WorldResult};
pub use scratch::{
    ScratchGrid, MAX_SCRATCH_CENTER, SCRATCH_RADIUS, SCRATCH_SIDE, SCRATCH_TILE_COUNT,
};
pub use section::{voxel_at, Section, SectionData};
pub use tile::{StructureStart, Tile, TileStatus, TileVoxels};
pub use voxel::Voxel;
pub use world::{MemoryWorld, VoxelWorld, WorldAccess, WritableWorld};
