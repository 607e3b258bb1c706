use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetrinet::core::{
    add_specials, clear_and_propagate, FrequencyTable, GameParams, Grid, Inventory, ManualLoop,
    NullNetwork, Session, SimpleRng,
};
use tetrinet::types::{Cell, PieceKind, SpecialKind, BOARD_WIDTH};

fn new_session() -> Session<ManualLoop, NullNetwork> {
    let mut session = Session::new(
        1,
        GameParams::default(),
        SimpleRng::new(12345),
        ManualLoop::new(),
        NullNetwork,
    )
    .expect("default params are valid");
    session.new_game();
    session.start();
    session
}

fn bench_tick(c: &mut Criterion) {
    let mut session = new_session();

    c.bench_function("session_tick", |b| {
        b.iter(|| {
            if session.is_lost() {
                session.new_game();
                session.start();
            }
            session.tick();
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    let params = GameParams::default();

    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut grid = Grid::new();
            // Fill bottom 4 rows
            for y in 18..22 {
                for x in 0..BOARD_WIDTH as i16 {
                    grid.set(x, y, Some(Cell::block(1)));
                }
            }
            grid.set(3, 20, Some(Cell::special(1, SpecialKind::AddLine)));

            let mut inventory = Inventory::new(params.special_capacity);
            let mut since = 0;
            let mut rng = SimpleRng::new(7);
            black_box(clear_and_propagate(
                &mut grid,
                &mut since,
                &mut inventory,
                &params,
                &mut rng,
            ));
        })
    });
}

fn bench_add_specials(c: &mut Criterion) {
    let table = FrequencyTable::uniform(SpecialKind::Gravity);

    c.bench_function("add_specials", |b| {
        b.iter(|| {
            let mut grid = Grid::new();
            for y in 12..22 {
                for x in 0..BOARD_WIDTH as i16 - 1 {
                    grid.set(x, y, Some(Cell::block(2)));
                }
            }
            let mut rng = SimpleRng::new(3);
            black_box(add_specials(&mut grid, black_box(8), &table, &mut rng));
        })
    });
}

fn bench_piece_spawn(c: &mut Criterion) {
    let mut grid = Grid::new();

    c.bench_function("spawn_piece", |b| {
        b.iter(|| {
            grid.spawn_piece(black_box(PieceKind::T), 0);
        })
    });
}

fn bench_try_move(c: &mut Criterion) {
    let mut grid = Grid::new();
    grid.spawn_piece(PieceKind::L, 0);
    let mut dx = 1;

    c.bench_function("try_move", |b| {
        b.iter(|| {
            if !grid.try_move(dx, 0) {
                dx = -dx;
            }
        })
    });
}

fn bench_try_rotate(c: &mut Criterion) {
    let mut grid = Grid::new();
    grid.spawn_piece(PieceKind::I, 0);

    c.bench_function("try_rotate", |b| {
        b.iter(|| {
            grid.rotate();
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_line_clear,
    bench_add_specials,
    bench_piece_spawn,
    bench_try_move,
    bench_try_rotate
);
criterion_main!(benches);
