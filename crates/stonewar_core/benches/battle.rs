//! Battle benchmarks for stonewar_core.
//!
//! Run with: `cargo bench -p stonewar_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stonewar_core::prelude::*;
use stonewar_test_utils::{determinism, fixtures};

/// Transmuter searches, direct and converted.
pub fn transmuter_benchmark(c: &mut Criterion) {
    c.bench_function("transmute_direct", |b| {
        b.iter(|| {
            let mut t = Transmuter::new(black_box(Composition::new(9, 9, 9, 9)), Composition::new(4, 4, 4, 4));
            t.get_cost()
        })
    });
    c.bench_function("transmute_mixed", |b| {
        b.iter(|| {
            let mut t = Transmuter::new(
                black_box(Composition::new(0, 40, 40, 120)),
                Composition::new(60, 0, 0, 0),
            );
            t.get_cost()
        })
    });
}

/// Grid range queries on a full-size battle grid.
pub fn grid_benchmark(c: &mut Criterion) {
    let grid = Grid::new(BattleConfig::default().grid_radius);
    c.bench_function("grid_range_4", |b| {
        b.iter(|| grid.range(black_box(Hex::new(3, -2)), 4).len())
    });
    c.bench_function("grid_triangle_6", |b| {
        b.iter(|| grid.triangle(black_box(Hex::ORIGIN), 6, Direction::South).len())
    });
}

/// Whole battles, from start to game over.
pub fn battle_benchmark(c: &mut Criterion) {
    c.bench_function("pass_battle", |b| {
        b.iter(|| {
            let mut battle = fixtures::duel();
            fixtures::pass_until_over(&mut battle)
        })
    });
    c.bench_function("greedy_skirmish", |b| {
        b.iter(|| {
            let mut battle = fixtures::skirmish();
            determinism::play_out(&mut battle, 400);
            battle.state_hash()
        })
    });
    c.bench_function("action_queue_build", |b| {
        let battle = fixtures::skirmish();
        b.iter(|| ActionQueue::new(black_box(battle.field())).len())
    });
}

criterion_group!(benches, transmuter_benchmark, grid_benchmark, battle_benchmark);
criterion_main!(benches);
