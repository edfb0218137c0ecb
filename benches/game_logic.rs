use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use blockfall::core::{EngineConfig, GameEngine};
use blockfall::types::{Color, Direction, EngineState, BOARD_HEIGHT, BOARD_WIDTH, PREVIEW_CELLS};

fn instant_engine(seed: u32) -> GameEngine {
    GameEngine::with_config(
        BOARD_WIDTH,
        BOARD_HEIGHT,
        vec![Color::EMPTY; BOARD_WIDTH * BOARD_HEIGHT],
        vec![Color::EMPTY; PREVIEW_CELLS],
        seed,
        EngineConfig::instant(),
    )
    .expect("valid engine")
}

fn bench_tick(c: &mut Criterion) {
    let mut engine = instant_engine(12345);
    engine.update();

    c.bench_function("engine_tick", |b| {
        b.iter(|| {
            engine.update();
            black_box(engine.state());
        })
    });
}

fn bench_horizontal_move(c: &mut Criterion) {
    let mut engine = instant_engine(12345);
    engine.update();

    c.bench_function("move_left_right", |b| {
        b.iter(|| {
            engine.move_shape(black_box(Direction::Left));
            engine.move_shape(black_box(Direction::Right));
        })
    });
}

fn bench_rotation(c: &mut Criterion) {
    let mut engine = instant_engine(12345);
    engine.update();

    c.bench_function("rotate_cw_ccw", |b| {
        b.iter(|| {
            engine.rotate_shape(black_box(true));
            engine.rotate_shape(black_box(false));
        })
    });
}

fn bench_piece_descent(c: &mut Criterion) {
    c.bench_function("full_piece_descent", |b| {
        b.iter_batched(
            || instant_engine(777),
            |mut engine| {
                engine.update();
                while engine.state() == EngineState::Falling {
                    engine.update();
                }
                black_box(engine.cleared_this_level());
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_horizontal_move,
    bench_rotation,
    bench_piece_descent
);
criterion_main!(benches);
