//! Property tests: random input never breaks the board.
//!
//! Invariants covered:
//! - Every settled cell lies inside the 12x22 board.
//! - The live piece never overlaps a settled cell or a wall.
//! - A clear/propagate cycle leaves no full row behind.
//! - The inventory never grows past its capacity.

use proptest::prelude::*;
use tetrinet::core::grid::{ROW_COUNT, ROW_LEN};
use tetrinet::core::{
    clear_and_propagate, GameParams, Grid, Inventory, ManualLoop, Randomness, RecordingNetwork,
    Session, SimpleRng,
};
use tetrinet::types::{GameAction, Intersection, PieceKind, SpecialKind, BOARD_WIDTH};

fn action_for(code: u8) -> GameAction {
    match code % 9 {
        0 => GameAction::Rotate,
        1 | 2 => GameAction::MoveLeft,
        3 | 4 => GameAction::MoveRight,
        5 => GameAction::SoftDrop,
        6 => GameAction::HardDrop,
        7 => GameAction::UseSpecial(1 + code % 6),
        _ => GameAction::DiscardSpecial,
    }
}

fn assert_piece_is_clear(grid: &Grid) {
    if let Some(active) = grid.active() {
        assert_eq!(
            grid.intersects(active.shape(), active.x, active.y),
            Intersection::None
        );
        for (x, y) in active.cells() {
            assert!((0..BOARD_WIDTH as i16).contains(&x));
            assert!(y < ROW_COUNT as i16);
        }
    }
}

proptest! {
    #[test]
    fn random_moves_keep_the_piece_in_bounds(
        seed in any::<u32>(),
        kind in 0usize..7,
        moves in prop::collection::vec(0u8..4, 1..60),
    ) {
        let mut grid = Grid::new();
        let mut rng = SimpleRng::new(seed);
        // scatter some settled cells in the lower half
        for _ in 0..30 {
            let x = rng.rand_int(ROW_LEN as u32) as i16;
            let y = 11 + rng.rand_int(11) as i16;
            grid.set(x, y, Some(tetrinet::types::Cell::block(rng.random_color())));
        }

        let kind = PieceKind::ALL[kind];
        prop_assume!(grid.spawn_piece(kind, 0));
        for m in moves {
            match m {
                0 => { grid.rotate(); }
                1 => { grid.try_move(-1, 0); }
                2 => { grid.try_move(1, 0); }
                _ => { grid.try_move(0, 1); }
            }
            assert_piece_is_clear(&grid);
        }
    }

    #[test]
    fn clear_cycles_leave_no_full_rows(
        seed in any::<u32>(),
        full_rows in prop::collection::vec(0usize..ROW_COUNT, 0..8),
    ) {
        let mut grid = Grid::new();
        let mut rng = SimpleRng::new(seed);
        for y in full_rows {
            for x in 0..ROW_LEN as i16 {
                grid.set(x, y as i16, Some(tetrinet::types::Cell::block(1)));
            }
        }

        let params = GameParams::default();
        let mut inventory = Inventory::new(params.special_capacity);
        let mut since = 0;
        let report = clear_and_propagate(&mut grid, &mut since, &mut inventory, &params, &mut rng);

        prop_assert!((0..ROW_COUNT).all(|y| !grid.is_row_full(y)));
        prop_assert!(report.total_lines >= report.first_pass_lines);
        prop_assert!(since < params.lines_per_special);
        prop_assert!(inventory.len() <= inventory.capacity());
    }

    #[test]
    fn sessions_survive_random_input(
        seed in any::<u32>(),
        actions in prop::collection::vec(any::<u8>(), 1..200),
        capacity in 0usize..=18,
    ) {
        let params = GameParams {
            special_capacity: capacity,
            ..GameParams::default()
        };
        let mut session = Session::new(
            3,
            params,
            SimpleRng::new(seed),
            ManualLoop::new(),
            RecordingNetwork::new(),
        )
        .unwrap();
        session.new_game();
        session.start();

        for code in actions {
            session.handle_action(action_for(code));
            if code % 17 == 0 {
                session.receive_special(
                    tetrinet::types::SpecialCode::Effect(SpecialKind::ALL[code as usize % 9]),
                    1,
                    tetrinet::types::SpecialTarget::All,
                );
            }

            prop_assert!(session.specials().len() <= capacity);
            if session.is_lost() {
                prop_assert!(session.local_grid().active().is_none());
                prop_assert!(session.clock().is_none());
                break;
            }
            assert_piece_is_clear(session.local_grid());
            prop_assert!((0..ROW_COUNT).all(|y| !session.local_grid().is_row_full(y)));
        }
    }
}
