//! Benchmarks for the Traffic Therapy solver and rules.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use traffic_therapy::board::{format_state, Board, TARGET};
use traffic_therapy::levels;
use traffic_therapy::movement::legal_moves;
use traffic_therapy::solver::{search, solve, SolveOptions};

/// Benchmark proving First Steps optimal.
fn bench_solve_first(c: &mut Criterion) {
    let level = levels::builtin().remove(0);

    c.bench_function("solve_first_steps", |b| b.iter(|| solve(black_box(&level))));
}

/// Benchmark solving the whole built-in campaign.
fn bench_solve_campaign(c: &mut Criterion) {
    let levels = levels::builtin();
    let mut group = c.benchmark_group("campaign");
    group.sample_size(20);
    group.bench_function("solve_all", |b| {
        b.iter(|| {
            for level in &levels {
                black_box(solve(level));
            }
        })
    });
    group.finish();
}

/// Benchmark the full search on the hardest level, path included.
fn bench_search_parking_lot(c: &mut Criterion) {
    let board = Board::new(&levels::builtin()[4]);
    let options = SolveOptions::default();

    c.bench_function("search_parking_lot", |b| {
        b.iter(|| search(black_box(&board), &options))
    });
}

/// Benchmark move generation for the target on a crowded board.
fn bench_legal_moves(c: &mut Criterion) {
    let board = Board::new(&levels::builtin()[4]);
    let state = board.initial_state();

    c.bench_function("legal_moves_all_blocks", |b| {
        b.iter(|| {
            for block in 0..board.block_count() {
                black_box(legal_moves(&board, black_box(state), block));
            }
        })
    });
    c.bench_function("legal_moves_target", |b| {
        b.iter(|| legal_moves(&board, black_box(state), TARGET))
    });
}

/// Benchmark packing a state into its hash key.
fn bench_state_key(c: &mut Criterion) {
    let board = Board::new(&levels::builtin()[4]);
    let state = board.initial_state();

    c.bench_function("state_key", |b| b.iter(|| black_box(state).key()));
}

/// Benchmark rendering a board as text.
fn bench_format_state(c: &mut Criterion) {
    let board = Board::new(&levels::builtin()[4]);

    c.bench_function("format_state", |b| {
        b.iter(|| format_state(&board, black_box(board.initial_state())))
    });
}

criterion_group!(
    benches,
    bench_solve_first,
    bench_solve_campaign,
    bench_search_parking_lot,
    bench_legal_moves,
    bench_state_key,
    bench_format_state
);
criterion_main!(benches);
