//! Benchmarks for random self-play and single move queries.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rookery_engine::*;

pub fn playout_benchmark(c: &mut Criterion) {
    // Setup
    let config = GameConfig {
        seed: Some(2022),
        ..Default::default()
    };

    // Benchmarks

    c.bench_function("random playout: 100 turns", |b| {
        b.iter(|| {
            let mut game = Game::new(black_box(config)).unwrap();
            for _ in 0..100 {
                if game.apply_turn(None).unwrap().is_none() {
                    break;
                }
            }
            game
        })
    });

    let mut game = Game::new(config).unwrap();
    c.bench_function("start_position: legal moves", |b| {
        b.iter(|| {
            let moves = black_box(&mut game).legal_moves().unwrap();
            assert_eq!(moves.len(), 20);
        })
    });

    c.bench_function("start_position: legal destinations g1", |b| {
        b.iter(|| {
            let destinations = game.legal_destinations(black_box("g1")).unwrap();
            assert_eq!(destinations.len(), 2);
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().without_plots().sample_size(20);
    targets = playout_benchmark
}
criterion_main!(benches);
