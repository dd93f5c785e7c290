//! Integration tests for go-evolve
//!
//! Rule-engine scenarios played through the public `Game` interface, plus a few
//! whole-board properties checked over random games.

use go_evolve::board::{Board, Color};
use go_evolve::game::Game;
use go_evolve::shape::{GoShape, Position, Shape, Symmetry};

// =============================================================================
// Helper functions for setting up test positions
// =============================================================================

fn at(board: &Board, x: usize, y: usize) -> Position {
    board.shape().at_xy(x, y).unwrap()
}

/// Place stones directly, without recording moves.
fn setpos(board: &mut Board, black: &[(usize, usize)], white: &[(usize, usize)]) {
    for &(x, y) in black {
        let pos = at(board, x, y);
        board.set(pos, Color::Black);
    }
    for &(x, y) in white {
        let pos = at(board, x, y);
        board.set(pos, Color::White);
    }
}

fn count(board: &Board, color: Color) -> usize {
    let cells = board.shape().cells();
    board.state()[..cells].iter().filter(|&&c| c == color).count()
}

/// Play random legal moves, alternating colors from Black, until the game ends.
/// A side with no legal move passes.
fn random_game(board: &mut Board, rng: &mut fastrand::Rng) {
    let mut color = Color::Black;
    while !board.ended() {
        let legal: Vec<Position> = (0..board.shape().size())
            .filter_map(|i| board.shape().at(i))
            .filter(|&mv| board.is_legal(mv, color))
            .collect();
        let mv = if legal.is_empty() {
            board.shape().pass()
        } else {
            legal[rng.usize(..legal.len())]
        };
        board.play(mv, color);
        color = color.opponent();
    }
}

// =============================================================================
// Capture tests
// =============================================================================

#[test]
fn test_capture_after_three_moves() {
    let mut board = Board::new(GoShape::new(9));
    // White's future stone at (5,4) already has Black on two sides.
    setpos(&mut board, &[(6, 4), (5, 3)], &[]);

    board.play(at(&board, 4, 4), Color::Black);
    board.play(at(&board, 5, 4), Color::White);
    board.play(at(&board, 5, 5), Color::Black);

    assert_eq!(board[at(&board, 5, 4)], Color::Empty, "White stone should be captured");
    for (x, y) in [(4, 4), (6, 4), (5, 3), (5, 5)] {
        assert_eq!(board[at(&board, x, y)], Color::Black);
    }
    assert_eq!(board.history_len(), 4);
}

#[test]
fn test_capture_group() {
    let mut board = Board::new(GoShape::new(5));
    setpos(
        &mut board,
        &[(0, 1), (3, 1), (1, 0), (2, 0), (1, 2)],
        &[(1, 1), (2, 1)],
    );

    board.play(at(&board, 2, 2), Color::Black);

    assert_eq!(board[at(&board, 1, 1)], Color::Empty);
    assert_eq!(board[at(&board, 2, 1)], Color::Empty);
    assert_eq!(count(&board, Color::White), 0);
    assert_eq!(count(&board, Color::Black), 6);
}

#[test]
fn test_group_with_liberty_survives() {
    let mut board = Board::new(GoShape::new(5));
    setpos(&mut board, &[(0, 1), (3, 1), (1, 0), (2, 0)], &[(1, 1), (2, 1)]);

    board.play(at(&board, 1, 2), Color::Black);

    assert_eq!(count(&board, Color::White), 2, "(2,2) is still a liberty");
}

// =============================================================================
// Pass and end-of-game tests
// =============================================================================

#[test]
fn test_two_passes_end_game() {
    let mut board = Board::new(GoShape::new(9));
    let pass = board.shape().pass();

    board.play(pass, Color::Black);
    assert!(!board.ended(), "A single pass does not end the game");
    board.play(pass, Color::White);
    assert!(board.ended(), "Second consecutive pass ends the game");
    assert_eq!(board.history_len(), 3);
}

#[test]
fn test_stone_between_passes_keeps_game_alive() {
    let mut board = Board::new(GoShape::new(9));
    let pass = board.shape().pass();

    board.play(pass, Color::Black);
    board.play(at(&board, 0, 0), Color::White);
    board.play(pass, Color::Black);
    assert!(!board.ended());
}

// =============================================================================
// Superko tests
// =============================================================================

#[test]
fn test_superko_rejects_only_recapture() {
    //   x 0 1 2 3
    // y
    // 0   . X O .
    // 1   X O . O
    // 2   . X O .
    let mut board = Board::new(GoShape::new(5));
    setpos(
        &mut board,
        &[(1, 0), (0, 1), (1, 2)],
        &[(2, 0), (3, 1), (2, 2), (1, 1)],
    );

    let take = at(&board, 2, 1);
    assert!(board.is_legal(take, Color::Black));
    board.play(take, Color::Black);
    assert_eq!(board[at(&board, 1, 1)], Color::Empty, "Black takes the ko");

    let retake = at(&board, 1, 1);
    assert!(
        !board.is_legal(retake, Color::White),
        "Immediate retake would repeat the previous position"
    );

    // White at (0,0) is removed at once, which also repeats the current position.
    let suicide = at(&board, 0, 0);
    assert!(!board.is_legal(suicide, Color::White));

    for i in 0..board.shape().size() {
        let mv = board.shape().at(i).unwrap();
        if mv == retake || mv == suicide || board[mv] != Color::Empty {
            continue;
        }
        assert!(
            board.is_legal(mv, Color::White),
            "{} should stay legal",
            board.shape().format_move(mv)
        );
    }
}

#[test]
fn test_superko_lifted_after_position_changes() {
    let mut board = Board::new(GoShape::new(5));
    setpos(
        &mut board,
        &[(1, 0), (0, 1), (1, 2)],
        &[(2, 0), (3, 1), (2, 2), (1, 1)],
    );
    board.play(at(&board, 2, 1), Color::Black);

    // A ko threat elsewhere makes the retake a new position.
    board.play(at(&board, 4, 4), Color::White);
    board.play(at(&board, 4, 0), Color::Black);
    assert!(board.is_legal(at(&board, 1, 1), Color::White));
}

// =============================================================================
// Whole-board properties
// =============================================================================

#[test]
fn test_replay_is_deterministic() {
    let mut first = Board::new(GoShape::new(5));
    random_game(&mut first, &mut fastrand::Rng::with_seed(42));

    // Same seed, same move sequence.
    let mut rng = fastrand::Rng::with_seed(42);
    let mut second = Board::new(GoShape::new(5));
    random_game(&mut second, &mut rng);

    assert_eq!(first.state(), second.state());
    assert_eq!(first.history_len(), second.history_len());
    assert_eq!(first.result(), second.result());
}

#[test]
fn test_undo_retraces_game() {
    let mut board = Board::new(GoShape::new(5));
    random_game(&mut board, &mut fastrand::Rng::with_seed(7));
    let plies = board.plies();

    for _ in 0..plies {
        assert!(board.undo());
    }
    assert!(!board.undo());
    assert_eq!(count(&board, Color::Black), 0);
    assert_eq!(count(&board, Color::White), 0);
    assert!(!board.ended());
}

fn assert_score_bounded(length: usize, seeds: u64) {
    let shape = GoShape::new(length);
    for seed in 0..seeds {
        let mut board = Board::new(shape.clone());
        random_game(&mut board, &mut fastrand::Rng::with_seed(seed));
        let score = board.result();
        assert!(score.black + score.white <= shape.size() - 1);
        assert!(board.plies() <= 161, "Game must stop at the ply cap");
    }
}

fn assert_score_symmetric(length: usize, boards: usize) {
    let shape = GoShape::new(length);
    let mut rng = fastrand::Rng::with_seed(3);

    for _ in 0..boards {
        let mut board = Board::new(shape.clone());
        for i in 0..shape.cells() {
            let color = match rng.u8(..3) {
                0 => Color::Black,
                1 => Color::White,
                _ => Color::Empty,
            };
            board.set(shape.at(i).unwrap(), color);
        }
        let expected = board.result();

        for &sym in &Symmetry::ALL {
            let mut image = Board::new(shape.clone());
            for i in 0..shape.cells() {
                let pos = shape.at(i).unwrap();
                image.set(shape.transform(sym, pos), board[pos]);
            }
            assert_eq!(image.result(), expected, "{length}x{length} {sym:?}");
        }
    }
}

#[test]
fn test_score_bounded_by_cells() {
    assert_score_bounded(5, 8);
}

#[test]
fn test_score_bounded_by_cells_9x9() {
    assert_score_bounded(9, 2);
}

#[test]
fn test_score_invariant_under_symmetry() {
    assert_score_symmetric(5, 10);
}

#[test]
fn test_score_invariant_under_symmetry_9x9() {
    assert_score_symmetric(9, 10);
}
