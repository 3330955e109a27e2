//! # Tile Regeneration Tests
//!
//! End-to-end checks of `Regenerator` against in-memory worlds:
//!
//! 1. **Blast radius**: only the center tile is ever written
//! 2. **Abort**: a failing or stalled stage leaves the world untouched
//! 3. **Commit**: absent sections clear old content, refused writes surface
//!
//! Run with: cargo test --package rechunk --test regenerate_test

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rechunk::{CommitMode, RegenConfig, RegenError, Regenerator};
use rechunk_core::{
    MemoryWorld, ScratchGrid, TileCoord, TileVoxels, Voxel, VoxelPos, VoxelWorld, WorldAccess,
    WorldError, WorldResult, WritableWorld, VOXELS_PER_TILE,
};
use rechunk_procedural::{
    default_stages, spawn_stage_work, GenerationServices, GenerationStage, PendingStage,
    StageError, StageKind, StructureKind,
};

// ============================================================================
// TEST STAGES AND WORLDS
// ============================================================================

/// Hands the grid straight back, recording that it ran.
struct Recording {
    kind: StageKind,
    log: Arc<Mutex<Vec<StageKind>>>,
}

impl GenerationStage for Recording {
    fn kind(&self) -> StageKind {
        self.kind
    }

    fn run(&self, grid: ScratchGrid, _services: Arc<GenerationServices>) -> PendingStage {
        self.log.lock().unwrap().push(self.kind);
        Box::pin(async move { Ok(grid) })
    }
}

/// Never finishes on its own.
struct Stalled(StageKind);

impl GenerationStage for Stalled {
    fn kind(&self) -> StageKind {
        self.0
    }

    fn run(&self, grid: ScratchGrid, _services: Arc<GenerationServices>) -> PendingStage {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(grid)
        })
    }
}

/// Occupies a blocking worker for `busy`, well past any test timeout.
struct Busy {
    kind: StageKind,
    busy: Duration,
    finished: Arc<AtomicBool>,
}

impl GenerationStage for Busy {
    fn kind(&self) -> StageKind {
        self.kind
    }

    fn run(&self, grid: ScratchGrid, services: Arc<GenerationServices>) -> PendingStage {
        let (busy, finished) = (self.busy, Arc::clone(&self.finished));
        spawn_stage_work(grid, services, move |_, _| {
            std::thread::sleep(busy);
            finished.store(true, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Reports a failure immediately.
struct Failing(StageKind);

impl GenerationStage for Failing {
    fn kind(&self) -> StageKind {
        self.0
    }

    fn run(&self, _grid: ScratchGrid, _services: Arc<GenerationServices>) -> PendingStage {
        Box::pin(async { Err(StageError::Custom("disk on fire".to_string())) })
    }
}

fn recording_stages(log: &Arc<Mutex<Vec<StageKind>>>) -> Vec<Arc<dyn GenerationStage>> {
    StageKind::ORDER
        .iter()
        .map(|&kind| {
            Arc::new(Recording {
                kind,
                log: Arc::clone(log),
            }) as Arc<dyn GenerationStage>
        })
        .collect()
}

/// A world that refuses whole-tile swaps and voxel writes at or above
/// `ceiling`.
struct GuardedWorld {
    inner: MemoryWorld,
    ceiling: i32,
    refuse_replace: AtomicBool,
}

impl GuardedWorld {
    fn new(ceiling: i32) -> Self {
        Self {
            inner: MemoryWorld::new("guarded"),
            ceiling,
            refuse_replace: AtomicBool::new(true),
        }
    }
}

impl VoxelWorld for GuardedWorld {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn voxel(&self, pos: VoxelPos) -> Voxel {
        self.inner.voxel(pos)
    }

    fn contains_tile(&self, coord: TileCoord) -> bool {
        self.inner.contains_tile(coord)
    }

    fn as_writable(&self) -> Option<&dyn WritableWorld> {
        Some(self)
    }
}

impl WritableWorld for GuardedWorld {
    fn set_voxel(&self, pos: VoxelPos, voxel: Voxel) -> WorldResult<()> {
        if pos.y >= self.ceiling {
            return Err(WorldError::Rejected {
                pos,
                reason: "protected airspace".to_string(),
            });
        }
        self.inner.set_voxel(pos, voxel)
    }

    fn replace_tile(&self, coord: TileCoord, voxels: TileVoxels) -> WorldResult<()> {
        if self.refuse_replace.load(Ordering::Relaxed) {
            return Err(WorldError::Rejected {
                pos: VoxelPos::new(coord.min_voxel_x(), 0, coord.min_voxel_z()),
                reason: "tile is locked".to_string(),
            });
        }
        self.inner.replace_tile(coord, voxels)
    }
}

fn regenerator() -> Regenerator {
    Regenerator::new(RegenConfig::testing()).unwrap()
}

/// Fills a tile with a recognisable pattern.
fn junk_tile(voxel: Voxel) -> TileVoxels {
    let mut voxels = TileVoxels::new();
    for lz in 0..16 {
        for lx in 0..16 {
            voxels.set(lx, 240, lz, voxel);
            voxels.set(lx, 100, lz, voxel);
        }
    }
    voxels
}

// ============================================================================
// HAPPY PATH
// ============================================================================

/// Test: a plain regeneration writes the center tile and nothing else.
#[test]
fn test_regenerate_writes_only_center() {
    let world = MemoryWorld::new("overworld");
    let target = TileCoord::new(10, 10);
    let neighbour = TileCoord::new(11, 10);
    world.load_tile(neighbour, junk_tile(Voxel::WOOD));
    let neighbour_before = world.snapshot_tile(neighbour);

    assert!(regenerator().regenerate(&world, target));

    assert_eq!(world.tile_coords(), vec![target, neighbour]);
    assert_eq!(world.snapshot_tile(neighbour), neighbour_before);
    assert_eq!(world.write_count(), 1);

    let min_x = target.min_voxel_x();
    let min_z = target.min_voxel_z();
    for dz in 0..16 {
        for dx in 0..16 {
            let pos = VoxelPos::new(min_x + dx, 0, min_z + dz);
            assert_eq!(world.voxel(pos), Voxel::BEDROCK);
        }
    }
}

/// Test: no neighbour in a full 3x3 ring changes.
#[test]
fn test_blast_radius_is_one_tile() {
    let world = MemoryWorld::new("ring");
    let target = TileCoord::new(-4, 7);
    let mut ring = Vec::new();
    for dx in -1..=1 {
        for dz in -1..=1 {
            if dx != 0 || dz != 0 {
                let coord = target.offset(dx, dz);
                world.load_tile(coord, junk_tile(Voxel::SAND));
                ring.push((coord, world.snapshot_tile(coord)));
            }
        }
    }

    assert!(regenerator().regenerate(&world, target));

    for (coord, before) in ring {
        assert_eq!(world.snapshot_tile(coord), before, "tile {coord} changed");
    }
    assert_eq!(world.tile_count(), 9);
}

/// Test: content in sections the generator leaves absent is cleared.
#[test]
fn test_absent_sections_overwrite_old_content() {
    let world = MemoryWorld::new("junk");
    let target = TileCoord::new(2, -3);
    world.load_tile(target, junk_tile(Voxel::WOOD));

    let report = regenerator().try_regenerate(&world, target).unwrap();

    assert_eq!(report.voxels_written, VOXELS_PER_TILE);
    assert!(report.absent_sections >= 1);
    let high = VoxelPos::new(target.min_voxel_x() + 5, 240, target.min_voxel_z() + 5);
    assert_eq!(world.voxel(high), Voxel::FILLER);
    assert!(world.snapshot_tile(target).section(15).is_absent());
}

/// Test: regeneration restores a damaged tile to its generated state.
#[test]
fn test_regeneration_restores_damage() {
    let world = MemoryWorld::new("damaged");
    let target = TileCoord::new(0, 0);
    let regen = regenerator();

    assert!(regen.regenerate(&world, target));
    let fresh = world.snapshot_tile(target);

    for x in 2..14 {
        for z in 2..14 {
            for y in 1..90 {
                world.set_voxel(VoxelPos::new(x, y, z), Voxel::FILLER).unwrap();
            }
        }
    }
    assert_ne!(world.snapshot_tile(target), fresh);

    assert!(regen.regenerate(&world, target));
    assert_eq!(world.snapshot_tile(target), fresh);
}

/// Test: best-effort commits produce the same tile as atomic ones.
#[test]
fn test_commit_modes_agree() {
    let target = TileCoord::new(5, 5);
    let atomic = MemoryWorld::new("atomic");
    let best_effort = MemoryWorld::new("best_effort");

    assert!(regenerator().regenerate(&atomic, target));
    let config = RegenConfig {
        commit_mode: CommitMode::BestEffort,
        ..RegenConfig::testing()
    };
    assert!(Regenerator::new(config).unwrap().regenerate(&best_effort, target));

    let mut a = atomic.snapshot_tile(target);
    let mut b = best_effort.snapshot_tile(target);
    a.compact();
    b.compact();
    assert_eq!(a, b);
    assert_eq!(best_effort.write_count(), VOXELS_PER_TILE as u64);
}

/// Test: stages run in pipeline order, each exactly once.
#[test]
fn test_stages_run_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let regen = Regenerator::with_stages(RegenConfig::testing(), recording_stages(&log)).unwrap();
    let world = MemoryWorld::new("order");

    assert!(regen.regenerate(&world, TileCoord::new(1, 1)));
    assert_eq!(*log.lock().unwrap(), StageKind::ORDER.to_vec());
}

/// Test: the async entry point works inside an existing runtime.
#[tokio::test]
async fn test_regenerate_async() {
    let world = MemoryWorld::new("async");
    let target = TileCoord::new(-1, 0);

    assert!(regenerator().regenerate_async(&world, target).await);
    assert_eq!(world.tile_coords(), vec![target]);
}

// ============================================================================
// ABORTS
// ============================================================================

/// Test: a stalled noise stage times out and nothing is written.
#[test]
fn test_stalled_noise_stage_times_out() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut stages = recording_stages(&log);
    stages[StageKind::Noise.index()] = Arc::new(Stalled(StageKind::Noise));

    let config = RegenConfig {
        stage_timeout_ms: 300,
        ..RegenConfig::testing()
    };
    let regen = Regenerator::with_stages(config, stages).unwrap();
    let world = MemoryWorld::new("stalled");
    let target = TileCoord::new(10, 10);
    world.load_tile(target, junk_tile(Voxel::STONE));
    let before = world.snapshot_tile(target);

    let started = Instant::now();
    let err = regen.try_regenerate(&world, target).unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(30));

    assert!(matches!(err, RegenError::StageTimedOut { stage: StageKind::Noise, .. }));
    assert!(err.is_pre_commit());
    assert_eq!(
        *log.lock().unwrap(),
        vec![StageKind::StructureStarts, StageKind::StructureReferences, StageKind::Biomes]
    );
    assert_eq!(world.snapshot_tile(target), before);
    assert_eq!(world.write_count(), 0);
    assert!(!regen.regenerate(&world, target));
}

/// Test: a blocking worker that overruns does not hold the call past the
/// timeout.
#[test]
fn test_overrunning_worker_returns_at_timeout() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let finished = Arc::new(AtomicBool::new(false));
    let mut stages = recording_stages(&log);
    stages[StageKind::Surface.index()] = Arc::new(Busy {
        kind: StageKind::Surface,
        busy: Duration::from_secs(5),
        finished: Arc::clone(&finished),
    });

    let config = RegenConfig {
        stage_timeout_ms: 200,
        ..RegenConfig::testing()
    };
    let regen = Regenerator::with_stages(config, stages).unwrap();
    let world = MemoryWorld::new("busy");
    let target = TileCoord::new(-6, 2);

    let started = Instant::now();
    let err = regen.try_regenerate(&world, target).unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, RegenError::StageTimedOut { stage: StageKind::Surface, .. }));
    assert!(elapsed < Duration::from_secs(3), "returned after {elapsed:?}");
    assert!(!finished.load(Ordering::SeqCst));
    assert_eq!(log.lock().unwrap().len(), 4);
    assert_eq!(world.tile_count(), 0);
}

/// Test: a failing last stage leaves the world untouched.
#[test]
fn test_failed_stage_leaves_world_untouched() {
    let mut stages = default_stages();
    stages[StageKind::Features.index()] = Arc::new(Failing(StageKind::Features));
    let regen = Regenerator::with_stages(RegenConfig::testing(), stages).unwrap();

    let world = MemoryWorld::new("failing");
    let target = TileCoord::new(3, 3);
    world.load_tile(target, junk_tile(Voxel::GRAVEL));
    let before = world.snapshot_tile(target);

    let outcome = regen.regenerate_with_feedback(&world, target);

    assert!(!outcome.success);
    assert!(outcome.message.contains("features"));
    assert!(outcome.message.contains("disk on fire"));
    assert_eq!(world.snapshot_tile(target), before);
    assert_eq!(world.write_count(), 0);
}

/// Test: a read-only world is refused before any work.
#[test]
fn test_read_only_world_returns_false() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let regen = Regenerator::with_stages(RegenConfig::testing(), recording_stages(&log)).unwrap();
    let world = MemoryWorld::new("archive").with_access(WorldAccess::ReadOnly);

    assert!(!regen.regenerate(&world, TileCoord::new(0, 0)));
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(world.tile_count(), 0);
}

/// Test: a malformed structure catalog fails the first stage.
#[test]
fn test_corrupt_structure_catalog_fails_structure_starts() {
    let config = RegenConfig {
        structures: Some(vec![StructureKind {
            id: 9,
            name: "broken".to_string(),
            spacing: 0,
            separation: 0,
            salt: 1,
            radius: 4,
            height: 4,
        }]),
        ..RegenConfig::testing()
    };
    let regen = Regenerator::new(config).unwrap();
    let world = MemoryWorld::new("corrupt");

    let err = regen.try_regenerate(&world, TileCoord::new(0, 0)).unwrap_err();

    assert!(matches!(
        err,
        RegenError::StageFailed {
            stage: StageKind::StructureStarts,
            source: StageError::CorruptStructureData(_),
        }
    ));
    assert_eq!(world.tile_count(), 0);
}

// ============================================================================
// REFUSED COMMITS
// ============================================================================

/// Test: a refused atomic commit changes nothing.
#[test]
fn test_refused_atomic_commit_changes_nothing() {
    let world = GuardedWorld::new(128);
    let target = TileCoord::new(0, 0);

    let err = regenerator().try_regenerate(&world, target).unwrap_err();

    assert!(matches!(err, RegenError::Commit(WorldError::Rejected { .. })));
    assert!(!err.is_pre_commit());
    assert_eq!(world.inner.tile_count(), 0);
}

/// Test: a refused best-effort commit keeps the writes made before it.
#[test]
fn test_refused_best_effort_commit_is_partial() {
    let world = GuardedWorld::new(128);
    let target = TileCoord::new(0, 0);
    let config = RegenConfig {
        commit_mode: CommitMode::BestEffort,
        ..RegenConfig::testing()
    };

    let err = Regenerator::new(config).unwrap().try_regenerate(&world, target).unwrap_err();

    match err {
        RegenError::Commit(WorldError::Rejected { pos, .. }) => assert_eq!(pos.y, 128),
        other => panic!("expected rejected commit, got {other:?}"),
    }
    // Sections below the ceiling were written.
    assert_eq!(world.voxel(VoxelPos::new(4, 0, 4)), Voxel::BEDROCK);
    assert_eq!(world.inner.write_count(), (VOXELS_PER_TILE / 2) as u64);

    // Once the lock is lifted an atomic commit goes through.
    world.refuse_replace.store(false, Ordering::Relaxed);
    assert!(regenerator().regenerate(&world, target));
}
