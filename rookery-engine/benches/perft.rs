use std::thread::available_parallelism;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rookery_engine::perft::*;
use rookery_engine::*;

pub fn criterion_perft_small_benchmark(c: &mut Criterion) {
    // Setup
    let start = Game::default();
    let num_threads = available_parallelism()
        .map(|inner| inner.get())
        .unwrap_or(1);

    // Benchmarks

    for (ply, nodes) in [(1, 20), (2, 400), (3, 8_902)] {
        c.bench_function(&format!("start_position: perft({ply}) threads: 1"), |b| {
            b.iter(|| {
                let info = perft(black_box(&start), black_box(ply), black_box(1)).unwrap();
                assert_eq!(info.nodes, nodes);
            })
        });
    }

    c.bench_function(
        &format!("start_position: perft(3) threads: {num_threads}"),
        |b| {
            b.iter(|| {
                let info = perft(black_box(&start), black_box(3), black_box(num_threads)).unwrap();
                assert_eq!(info.nodes, 8_902);
            })
        },
    );
}

criterion_group! {
    name = small_benches;
    config = Criterion::default().without_plots().sample_size(10);
    targets = criterion_perft_small_benchmark
}
criterion_main!(small_benches);
