//! Benchmark for individual generation stages over a full scratch grid.
//!
//! Run with: cargo bench --package rechunk_procedural --bench stage_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rechunk_core::{ScratchGrid, TileCoord};
use rechunk_procedural::{
    default_stages, BiomeClassifier, GenerationServices, GenerationStage, NoiseStage, WorldSeed,
};

fn benchmark_classifier(c: &mut Criterion) {
    let classifier = BiomeClassifier::new(WorldSeed::new(42));
    c.bench_function("classify_tile_columns", |b| {
        b.iter(|| {
            for x in 0..16 {
                for z in 0..16 {
                    black_box(classifier.classify(black_box(x), black_box(z)));
                }
            }
        });
    });
}

fn benchmark_stages(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let services = Arc::new(GenerationServices::new(WorldSeed::new(42)));

    let mut group = c.benchmark_group("stages");
    group.sample_size(10);

    group.bench_function("noise_17x17", |b| {
        b.iter(|| {
            let grid = ScratchGrid::build(TileCoord::new(0, 0));
            runtime
                .block_on(NoiseStage.run(grid, services.clone()))
                .expect("noise stage")
        });
    });

    group.bench_function("all_stages_17x17", |b| {
        let stages = default_stages();
        b.iter(|| {
            let mut grid = ScratchGrid::build(TileCoord::new(3, 3));
            for stage in &stages {
                grid = runtime
                    .block_on(stage.run(grid, services.clone()))
                    .expect("stage");
            }
            black_box(grid.into_center())
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_classifier, benchmark_stages);
criterion_main!(benches);
