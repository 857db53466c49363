use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use match_cascade::core::{
    apply_gravity, classify, find_matches, GameConfig, Grid, SequentialTokenFactory, SimpleRng,
    TurnStateMachine,
};
use match_cascade::engine::{best_swap, find_swaps};
use match_cascade::types::TICK_MS;

fn seeded_board(seed: u32) -> Grid {
    let mut grid = Grid::default();
    let mut factory = SequentialTokenFactory::new();
    let mut rng = SimpleRng::new(seed);
    apply_gravity(&mut grid, &mut factory, &mut rng);
    grid
}

fn bench_classify(c: &mut Criterion) {
    let grid = seeded_board(12345);

    c.bench_function("classify_8x8", |b| {
        b.iter(|| classify(black_box(&grid)));
    });
}

fn bench_find_matches(c: &mut Criterion) {
    let grid = seeded_board(12345);

    c.bench_function("classify_and_resolve_8x8", |b| {
        b.iter(|| find_matches(black_box(&grid)));
    });
}

fn bench_gravity(c: &mut Criterion) {
    let full = seeded_board(99);
    let mut factory = SequentialTokenFactory::new();
    let mut rng = SimpleRng::new(99);

    c.bench_function("clear_bottom_rows_and_refill", |b| {
        b.iter(|| {
            let mut grid = full.clone();
            for col in 0..8 {
                for row in 0..3 {
                    grid.set(col, row, None);
                }
            }
            apply_gravity(&mut grid, &mut factory, &mut rng);
        })
    });
}

fn bench_find_swaps(c: &mut Criterion) {
    let grid = seeded_board(7);

    c.bench_function("find_swaps_8x8", |b| {
        b.iter(|| find_swaps(black_box(&grid)));
    });
}

fn bench_tick(c: &mut Criterion) {
    let config = GameConfig::builder().seed(7).build().unwrap();
    let mut base = TurnStateMachine::new(config).unwrap();
    base.start();
    base.drain_events();
    let hint = best_swap(base.grid()).unwrap();

    c.bench_function("turn_full_swap_16ms_ticks", |b| {
        b.iter_batched(
            || {
                let mut machine = TurnStateMachine::from_grid(base.grid().clone(), base.config().clone())
                    .unwrap();
                machine.start();
                machine.request_swap(hint.a, hint.b).unwrap();
                machine
            },
            |mut machine| {
                while !machine.is_idle() {
                    machine.tick(black_box(TICK_MS));
                }
                machine.drain_events()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_find_matches,
    bench_gravity,
    bench_find_swaps,
    bench_tick
);
criterion_main!(benches);
