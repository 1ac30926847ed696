//! Rules-compliance tests for the Tâb engine.
//!
//! Covers the setup and die invariants, the first-move and no-return
//! rules, single-use entry into the last row, capture and extra-turn
//! resolution, win detection, and the degenerate opening position.

use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;

use tab_engine::board::dice;
use tab_engine::board::piece::{Player, Square};
use tab_engine::engine::{TabEngine, TabError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A constant rng whose uniform sample lands in the threshold band for
/// the wanted die value.
fn die_rng(value: u8) -> StepRng {
    let initial = match value {
        6 => 0,                     // r = 0.0
        1 => 1u64 << 61,            // r = 0.125
        2 => 1u64 << 63,            // r = 0.5
        3 => 3u64 << 62,            // r = 0.75
        4 => 0xF800_0000_0000_0000, // r = 0.96875
        _ => panic!("no threshold band for {}", value),
    };
    StepRng::new(initial, 0)
}

fn force_roll(engine: &mut TabEngine, value: u8) {
    engine.roll_die_with(&mut die_rng(value)).unwrap();
}

fn sq(row: u8, col: u8) -> Square {
    Square::new(row, col)
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn setup_fills_both_home_rows_for_every_width() {
    for columns in [7u8, 9, 11, 13, 15] {
        let engine = TabEngine::new(columns);
        assert_eq!(engine.columns(), columns);
        assert_eq!(engine.piece_count(Player::One), columns as usize);
        assert_eq!(engine.piece_count(Player::Two), columns as usize);

        for (square, piece) in engine.cells() {
            match square.row {
                0 => assert_eq!(piece.map(|p| p.player), Some(Player::Two)),
                3 => assert_eq!(piece.map(|p| p.player), Some(Player::One)),
                _ => assert!(piece.is_none(), "transit row occupied at {}", square),
            }
        }
    }
}

#[test]
fn even_and_out_of_range_widths_are_normalized() {
    assert_eq!(TabEngine::new(0).columns(), 7);
    assert_eq!(TabEngine::new(10).columns(), 11);
    assert_eq!(TabEngine::new(99).columns(), 15);
}

// ---------------------------------------------------------------------------
// Die model
// ---------------------------------------------------------------------------

#[test]
fn die_never_yields_five_and_matches_the_stick_distribution() {
    let mut rng = StdRng::seed_from_u64(1234);
    let samples = 100_000usize;
    let mut counts = [0usize; 7];
    for _ in 0..samples {
        let v = dice::roll(&mut rng);
        assert_ne!(v, 5, "die produced the unreachable value 5");
        counts[v as usize] += 1;
    }

    for &value in dice::DIE_VALUES.iter() {
        let observed = counts[value as usize] as f64 / samples as f64;
        let expected = dice::probability(value);
        assert!(
            (observed - expected).abs() < 0.01,
            "value {} frequency {:.4}, expected {:.4}",
            value,
            observed,
            expected
        );
    }
}

#[test]
fn opening_rolls_reroll_four_and_six() {
    for seed in 0..300 {
        let mut engine = TabEngine::seeded(9, seed);
        let value = engine.roll_die().unwrap();
        assert!(
            matches!(value, 1 | 2 | 3),
            "all-unmoved roll produced {}",
            value
        );
    }
}

#[test]
fn rolling_twice_is_a_contract_violation() {
    let mut engine = TabEngine::new(9);
    force_roll(&mut engine, 1);
    assert_eq!(engine.roll_die(), Err(TabError::DieAlreadyRolled));
}

// ---------------------------------------------------------------------------
// First-move and no-return rules
// ---------------------------------------------------------------------------

#[test]
fn unmoved_pieces_only_move_on_a_one() {
    let mut engine = TabEngine::empty(9);
    engine.place_piece(sq(3, 8), Player::One).unwrap();

    for die in [2u8, 3, 4, 6] {
        assert!(
            engine.hypothetical_moves(sq(3, 8), die, Player::One).is_empty(),
            "unmoved piece moved on a {}",
            die
        );
    }
    assert_eq!(
        engine.hypothetical_moves(sq(3, 8), 1, Player::One),
        vec![sq(2, 8)]
    );
}

#[test]
fn moved_pieces_never_return_to_their_initial_row() {
    let mut engine = TabEngine::empty(9);
    let one = engine.place_piece(sq(2, 0), Player::One).unwrap();
    let two = engine.place_piece(sq(1, 6), Player::Two).unwrap();
    engine.set_piece_flags(one, true, false);
    engine.set_piece_flags(two, true, false);

    for die in dice::DIE_VALUES {
        for to in engine.hypothetical_moves(sq(2, 0), die, Player::One) {
            assert_ne!(to.row, 3, "player one re-entered row 3 via {}", to);
        }
        for to in engine.hypothetical_moves(sq(1, 6), die, Player::Two) {
            assert_ne!(to.row, 0, "player two re-entered row 0 via {}", to);
        }
    }
}

#[test]
fn shuffling_within_the_initial_row_stays_legal_after_moving() {
    // A piece that has moved along its home row has left nothing; only
    // stepping off the row arms the no-return rule.
    let mut engine = TabEngine::empty(9);
    let id = engine.place_piece(sq(3, 2), Player::One).unwrap();
    engine.set_piece_flags(id, true, false);

    assert_eq!(
        engine.hypothetical_moves(sq(3, 2), 1, Player::One),
        vec![sq(3, 3)]
    );
}

// ---------------------------------------------------------------------------
// Last-row entry
// ---------------------------------------------------------------------------

#[test]
fn last_row_is_closed_while_the_initial_row_is_occupied() {
    let mut engine = TabEngine::empty(9);
    let runner = engine.place_piece(sq(1, 7), Player::One).unwrap();
    engine.place_piece(sq(3, 0), Player::One).unwrap();
    engine.set_piece_flags(runner, true, false);

    // (1,7) -> (1,8) -> branch: the (0,8) arm is barred, only (2,8) remains.
    assert_eq!(
        engine.hypothetical_moves(sq(1, 7), 2, Player::One),
        vec![sq(2, 8)]
    );
}

#[test]
fn branch_explores_both_arms_once_home_is_clear() {
    let mut engine = TabEngine::empty(9);
    let runner = engine.place_piece(sq(1, 8), Player::One).unwrap();
    engine.set_piece_flags(runner, true, false);

    let moves = engine.hypothetical_moves(sq(1, 8), 1, Player::One);
    assert!(moves.contains(&sq(0, 8)));
    assert!(moves.contains(&sq(2, 8)));
    assert_eq!(moves.len(), 2);
}

#[test]
fn paths_may_run_through_the_last_row_on_first_entry() {
    // Six steps from (1,5): the outward arm enters row 0 at (0,8) and
    // keeps walking inside it; the loop arm continues along row 2.
    let mut engine = TabEngine::empty(9);
    let runner = engine.place_piece(sq(1, 5), Player::One).unwrap();
    engine.set_piece_flags(runner, true, false);

    let moves = engine.hypothetical_moves(sq(1, 5), 6, Player::One);
    assert!(moves.contains(&sq(0, 6)), "outward arm missing: {:?}", moves);
    assert!(moves.contains(&sq(2, 6)), "loop arm missing: {:?}", moves);
}

#[test]
fn single_entry_blocks_transit_hops() {
    // Once a piece has used its one entry into the last row, even an
    // intermediate hop through that row is barred: only the loop arm of
    // the junction survives.
    let mut engine = TabEngine::empty(9);
    let veteran = engine.place_piece(sq(1, 6), Player::One).unwrap();
    engine.set_piece_flags(veteran, true, true);

    let moves = engine.hypothetical_moves(sq(1, 6), 3, Player::One);
    assert_eq!(moves, vec![sq(2, 8)]);

    // The same walk without the flag reaches (0, 8) as well.
    engine.set_piece_flags(veteran, true, false);
    let moves = engine.hypothetical_moves(sq(1, 6), 3, Player::One);
    assert!(moves.contains(&sq(0, 8)));
    assert!(moves.contains(&sq(2, 8)));
}

#[test]
fn pieces_locked_on_the_last_row_sit_out_until_home_clears() {
    let mut engine = TabEngine::empty(9);
    let parked = engine.place_piece(sq(0, 4), Player::One).unwrap();
    engine.place_piece(sq(3, 0), Player::One).unwrap();
    engine.set_piece_flags(parked, true, true);

    assert!(engine.hypothetical_moves(sq(0, 4), 1, Player::One).is_empty());

    // Clearing the home row frees the parked piece.
    let mut cleared = TabEngine::empty(9);
    let parked = cleared.place_piece(sq(0, 4), Player::One).unwrap();
    cleared.set_piece_flags(parked, true, true);
    assert_eq!(
        cleared.hypothetical_moves(sq(0, 4), 1, Player::One),
        vec![sq(0, 3)]
    );
}

// ---------------------------------------------------------------------------
// Capture, extra turns, win detection
// ---------------------------------------------------------------------------

#[test]
fn scripted_captures_decide_the_game_only_at_zero_pieces() {
    let mut engine = TabEngine::empty(9);
    let hunter = engine.place_piece(sq(1, 0), Player::One).unwrap();
    engine.place_piece(sq(1, 2), Player::Two).unwrap();
    engine.place_piece(sq(1, 4), Player::Two).unwrap();
    engine.set_piece_flags(hunter, true, false);

    // First capture: two -> one pieces, no winner yet.
    force_roll(&mut engine, 2);
    engine.select(sq(1, 0));
    let outcome = engine.move_selected(sq(1, 2)).unwrap();
    assert!(outcome.captured.is_some());
    assert_eq!(engine.piece_count(Player::Two), 1);
    assert_eq!(engine.winner(), None);

    // Player two is stuck (unmoved piece, die of 2) and passes.
    assert_eq!(engine.current_player(), Player::Two);
    force_roll(&mut engine, 2);
    assert!(engine.can_pass());
    engine.pass_turn().unwrap();

    // Second capture empties the collection and decides the game.
    assert_eq!(engine.current_player(), Player::One);
    force_roll(&mut engine, 2);
    engine.select(sq(1, 2));
    let outcome = engine.move_selected(sq(1, 4)).unwrap();
    assert!(outcome.captured.is_some());
    assert_eq!(engine.piece_count(Player::Two), 0);
    assert_eq!(engine.winner(), Some(Player::One));
}

#[test]
fn friendly_pieces_never_appear_in_the_legal_set() {
    let mut engine = TabEngine::empty(9);
    let mover = engine.place_piece(sq(1, 0), Player::One).unwrap();
    engine.place_piece(sq(1, 2), Player::One).unwrap();
    engine.set_piece_flags(mover, true, false);

    assert!(engine.hypothetical_moves(sq(1, 0), 2, Player::One).is_empty());
}

#[test]
fn extra_turn_values_keep_the_mover() {
    for die in [1u8, 4, 6] {
        let mut engine = TabEngine::empty(9);
        let id = engine.place_piece(sq(1, 0), Player::One).unwrap();
        engine.set_piece_flags(id, true, false);
        force_roll(&mut engine, die);
        engine.select(sq(1, 0));
        let to = sq(1, die);
        let outcome = engine.move_selected(to).unwrap();
        assert!(outcome.extra_turn, "die {} should grant an extra turn", die);
        assert_eq!(engine.current_player(), Player::One);
    }
}

#[test]
fn plain_values_pass_the_turn() {
    for die in [2u8, 3] {
        let mut engine = TabEngine::empty(9);
        let id = engine.place_piece(sq(1, 0), Player::One).unwrap();
        engine.set_piece_flags(id, true, false);
        force_roll(&mut engine, die);
        engine.select(sq(1, 0));
        let outcome = engine.move_selected(sq(1, die)).unwrap();
        assert!(!outcome.extra_turn);
        assert_eq!(engine.current_player(), Player::Two);
    }
}

#[test]
fn pass_with_an_extra_turn_value_keeps_the_mover() {
    let mut engine = TabEngine::empty(9);
    // A piece locked on the last row cannot move while home is occupied.
    let parked = engine.place_piece(sq(0, 4), Player::One).unwrap();
    engine.place_piece(sq(3, 0), Player::One).unwrap();
    engine.set_piece_flags(parked, true, true);
    // The straggler on (3,0) is unmoved; force a die it cannot use, but
    // one that still grants an extra turn.
    force_roll(&mut engine, 6);
    assert!(engine.can_pass());
    engine.pass_turn().unwrap();
    assert_eq!(engine.current_player(), Player::One);
}

#[test]
fn forfeit_resolves_for_the_other_side() {
    let mut engine = TabEngine::new(9);
    engine.forfeit(Player::Two);
    assert_eq!(engine.winner(), Some(Player::One));
}

// ---------------------------------------------------------------------------
// Degenerate opening
// ---------------------------------------------------------------------------

#[test]
fn opening_one_leaves_interior_home_pieces_blocked() {
    // Fresh board, die of 1: (3,0) would step to (3,1), which a friendly
    // piece occupies, so its legal set is empty until the row thins out.
    let mut engine = TabEngine::new(9);
    force_roll(&mut engine, 1);
    assert!(engine.legal_destinations(sq(3, 0)).is_empty());

    // Only the edge piece has somewhere to go.
    let movable: Vec<Square> = engine
        .selectable_pieces()
        .iter()
        .map(|p| p.square)
        .filter(|&s| !engine.legal_destinations(s).is_empty())
        .collect();
    assert_eq!(movable, vec![sq(3, 8)]);
}
