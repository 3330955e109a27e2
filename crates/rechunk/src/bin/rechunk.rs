//! # RECHUNK CLI
//!
//! ```text
//! rechunk generate --tile 10 10 --radius 2
//! rechunk regenerate --tile 10 10 --timeout-ms 5000 --commit-mode best-effort
//! ```
//!
//! Set `RUST_LOG=debug` to see per-stage timings.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use rechunk::{CommitMode, RegenConfig, Regenerator};
use rechunk_core::{
    MemoryWorld, TileCoord, TileVoxels, Voxel, VoxelPos, VoxelWorld, WritableWorld,
    MAX_SCRATCH_CENTER, TILE_HEIGHT, TILE_SIZE,
};

#[derive(Parser)]
#[command(name = "rechunk", about = "Regenerate voxel tiles from the world seed")]
struct Cli {
    /// TOML config file; flags below override its values
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    /// World seed
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Per-stage time bound in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// How the tile is written back
    #[arg(long, value_enum, global = true)]
    commit_mode: Option<CliCommitMode>,
    /// Salt for decorative feature placement
    #[arg(long, global = true)]
    salt: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the tiles around a tile into a fresh in-memory world
    Generate {
        /// Center tile (X Z)
        #[arg(
            long,
            required = true,
            num_args = 2,
            value_names = ["X", "Z"],
            allow_hyphen_values = true
        )]
        tile: Vec<i32>,
        /// Tiles to generate on each side of the center
        #[arg(long, default_value_t = 1)]
        radius: i32,
    },
    /// Generate a tile, damage it, regenerate it and compare
    Regenerate {
        /// Target tile (X Z)
        #[arg(
            long,
            required = true,
            num_args = 2,
            value_names = ["X", "Z"],
            allow_hyphen_values = true
        )]
        tile: Vec<i32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliCommitMode {
    Atomic,
    BestEffort,
}

impl From<CliCommitMode> for CommitMode {
    fn from(mode: CliCommitMode) -> Self {
        match mode {
            CliCommitMode::Atomic => Self::Atomic,
            CliCommitMode::BestEffort => Self::BestEffort,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let regenerator = match build_regenerator(&cli) {
        Ok(regenerator) => regenerator,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let (tile, radius) = match &cli.command {
        Command::Generate { tile, radius } => (tile_arg(tile), *radius),
        Command::Regenerate { tile } => (tile_arg(tile), 1),
    };
    let limit = MAX_SCRATCH_CENTER.saturating_sub(radius.max(0)).max(0);
    if tile.x.unsigned_abs() > limit as u32 || tile.z.unsigned_abs() > limit as u32 {
        log::error!("tile {tile} is too far out (|x| and |z| must not exceed {limit})");
        return ExitCode::FAILURE;
    }

    let ok = match &cli.command {
        Command::Generate { .. } => generate(&regenerator, tile, radius),
        Command::Regenerate { .. } => regenerate(&regenerator, tile),
    };
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn build_regenerator(cli: &Cli) -> Result<Regenerator, rechunk::RegenError> {
    let mut config = match &cli.config {
        Some(path) => RegenConfig::load(path)?,
        None => RegenConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.stage_timeout_ms = timeout_ms;
    }
    if let Some(mode) = cli.commit_mode {
        config.commit_mode = mode.into();
    }
    if let Some(salt) = cli.salt {
        config.feature_salt = salt;
    }
    Regenerator::new(config)
}

/// `--tile` is required with exactly two values, so clap guarantees both.
fn tile_arg(values: &[i32]) -> TileCoord {
    TileCoord::new(values[0], values[1])
}

fn generate(regenerator: &Regenerator, center: TileCoord, radius: i32) -> bool {
    let world = MemoryWorld::new("generated");
    let started = Instant::now();
    let mut failed = 0;

    for dx in -radius..=radius {
        for dz in -radius..=radius {
            let outcome = regenerator.regenerate_with_feedback(&world, center.offset(dx, dz));
            if !outcome.success {
                failed += 1;
                println!("  {}", outcome.message);
            }
        }
    }

    let voxels: usize = world
        .tile_coords()
        .into_iter()
        .map(|coord| world.snapshot_tile(coord).non_filler_count())
        .sum();
    println!(
        "Generated {} tiles around {center} in {:.2?} ({voxels} solid voxels, {failed} failed)",
        world.tile_count(),
        started.elapsed()
    );
    failed == 0
}

fn regenerate(regenerator: &Regenerator, tile: TileCoord) -> bool {
    let world = MemoryWorld::new("damaged");
    let neighbor = tile.offset(1, 0);

    for coord in [tile, neighbor] {
        if !regenerator.regenerate(&world, coord) {
            println!("Initial generation of {coord} failed");
            return false;
        }
    }
    let fresh = world.snapshot_tile(tile);
    let neighbor_before = world.snapshot_tile(neighbor);

    // Blast a crater into the middle of the tile.
    let (cx, cz) = (tile.min_voxel_x() + 8, tile.min_voxel_z() + 8);
    for x in cx - 5..=cx + 5 {
        for z in cz - 5..=cz + 5 {
            for y in 20..120 {
                if let Err(err) = world.set_voxel(VoxelPos::new(x, y, z), Voxel::FILLER) {
                    println!("Damage failed: {err}");
                    return false;
                }
            }
        }
    }
    let damaged = world.snapshot_tile(tile);
    println!(
        "Damaged {tile}: {} -> {} solid voxels",
        fresh.non_filler_count(),
        damaged.non_filler_count()
    );

    let started = Instant::now();
    let outcome = regenerator.regenerate_with_feedback(&world, tile);
    println!("{} in {:.2?}", outcome.message, started.elapsed());
    if !outcome.success {
        return false;
    }

    let mismatches = terrain_mismatches(&world.snapshot_tile(tile), &fresh);
    let restored = mismatches == 0;
    let neighbor_untouched = world.snapshot_tile(neighbor) == neighbor_before;
    println!("Matches fresh generation outside features: {restored} ({mismatches} differ)");
    println!("Neighbor {neighbor} untouched: {neighbor_untouched}");
    println!("World '{}' holds {} tiles", world.name(), world.tile_count());
    restored && neighbor_untouched
}

/// Voxels that differ between two tiles, ignoring trees and structure pieces.
fn terrain_mismatches(a: &TileVoxels, b: &TileVoxels) -> usize {
    let decorative = |voxel: Voxel| {
        matches!(voxel, Voxel::WOOD | Voxel::LEAVES | Voxel::COBBLESTONE)
    };
    let mut mismatches = 0;
    for y in 0..TILE_HEIGHT as i32 {
        for lz in 0..TILE_SIZE {
            for lx in 0..TILE_SIZE {
                let (va, vb) = (a.get(lx, y, lz), b.get(lx, y, lz));
                if va != vb && !decorative(va) && !decorative(vb) {
                    mismatches += 1;
                }
            }
        }
    }
    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_is_required() {
        let err = Cli::try_parse_from(["rechunk", "regenerate"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["rechunk", "generate", "--radius", "2"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_tile_accepts_negative_values() {
        let cli = Cli::try_parse_from(["rechunk", "regenerate", "--tile", "-3", "12"]).unwrap();
        match cli.command {
            Command::Regenerate { tile } => assert_eq!(tile_arg(&tile), TileCoord::new(-3, 12)),
            Command::Generate { .. } => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_global_overrides_reach_config() {
        let cli = Cli::try_parse_from([
            "rechunk",
            "generate",
            "--tile",
            "0",
            "0",
            "--seed",
            "7",
            "--commit-mode",
            "best-effort",
        ])
        .unwrap();
        let regenerator = build_regenerator(&cli).unwrap();
        assert_eq!(regenerator.config().seed, 7);
        assert_eq!(regenerator.config().commit_mode, CommitMode::BestEffort);
    }
}
