//! Go board state, move execution and scoring.
//!
//! The board is a flat array indexed through a [`GoShape`]; the final slot is the
//! pass marker and records which color passed last. Every committed move appends
//! a full snapshot to the history, which backs both positional superko and
//! [`Board::undo`].

use std::collections::VecDeque;
use std::fmt;
use std::ops::Index;

use crate::constants::MAX_PLIES;
use crate::game::{Game, Score};
use crate::shape::{GoShape, Position, Shape};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
    #[default]
    Empty,
}

impl Color {
    /// The other player. `Empty` maps to itself.
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
            Color::Empty => Color::Empty,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
            Color::Empty => write!(f, "Empty"),
        }
    }
}

#[derive(Clone, Debug)]
struct Snapshot {
    state: Vec<Color>,
    passed: bool,
}

#[derive(Clone, Debug)]
pub struct Board {
    shape: GoShape,
    state: Vec<Color>,
    /// Set by a pass answering a pass; cleared by any stone.
    passed: bool,
    history: Vec<Snapshot>,
}

impl Board {
    pub fn new(shape: GoShape) -> Self {
        let state = vec![Color::Empty; shape.size()];
        let mut board = Self {
            shape,
            state,
            passed: false,
            history: Vec::new(),
        };
        board.reset();
        board
    }

    #[inline]
    pub fn shape(&self) -> &GoShape {
        &self.shape
    }

    /// Current cells followed by the pass marker.
    #[inline]
    pub fn state(&self) -> &[Color] {
        &self.state
    }

    /// Number of snapshots, including the initial empty board.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Moves committed since the last reset, passes included.
    #[inline]
    pub fn plies(&self) -> usize {
        self.history.len() - 1
    }

    /// Place or clear a stone without playing a move.
    ///
    /// The latest snapshot is rewritten as well so that undo and superko treat the
    /// edited position as the current one.
    pub fn set(&mut self, pos: Position, color: Color) {
        self.state[pos.index()] = color;
        if let Some(last) = self.history.last_mut() {
            last.state[pos.index()] = color;
        }
    }

    /// Drop the latest move and restore the position before it.
    ///
    /// Returns `false` if only the initial snapshot is left.
    pub fn undo(&mut self) -> bool {
        if self.history.len() <= 1 {
            return false;
        }
        self.history.pop();
        if let Some(last) = self.history.last() {
            self.state.clone_from(&last.state);
            self.passed = last.passed;
        }
        true
    }

    fn push_snapshot(&mut self) {
        self.history.push(Snapshot {
            state: self.state.clone(),
            passed: self.passed,
        });
    }

    /// First stone met when walking from `(x, y)` in direction `(dx, dy)`.
    fn first_stone(&self, x: usize, y: usize, dx: isize, dy: isize) -> Color {
        let (mut cx, mut cy) = (x as isize + dx, y as isize + dy);
        while self.shape.valid_xy(cx, cy) {
            let c = self.state[cy as usize * self.shape.length() + cx as usize];
            if c != Color::Empty {
                return c;
            }
            cx += dx;
            cy += dy;
        }
        Color::Empty
    }
}

/// Apply a move to a bare board array. Shared by committed play and legality probes.
fn apply_move(shape: &GoShape, state: &mut [Color], passed: &mut bool, mv: Position, color: Color) {
    let pass = shape.pass_index();
    if shape.is_pass(mv) {
        if state[pass] != Color::Empty {
            *passed = true;
        } else {
            *passed = false;
            state[pass] = color;
        }
        return;
    }

    state[pass] = Color::Empty;
    *passed = false;
    state[mv.index()] = color;
    let opp = color.opponent();
    for n in shape.neighbors(mv) {
        if state[n.index()] == opp {
            remove_if_dead(shape, state, n);
        }
    }
    remove_if_dead(shape, state, mv);
}

/// Remove the group containing `seed` unless some member touches an empty cell.
///
/// Breadth-first over same-colored neighbors; stops at the first liberty found.
fn remove_if_dead(shape: &GoShape, state: &mut [Color], seed: Position) -> usize {
    let color = state[seed.index()];
    if color == Color::Empty || shape.is_pass(seed) {
        return 0;
    }

    let mut visited = vec![false; shape.size()];
    let mut worklist = VecDeque::from([seed]);
    let mut group = Vec::new();
    visited[seed.index()] = true;

    while let Some(pos) = worklist.pop_front() {
        for n in shape.neighbors(pos) {
            match state[n.index()] {
                Color::Empty => return 0,
                c if c == color && !visited[n.index()] => {
                    visited[n.index()] = true;
                    worklist.push_back(n);
                }
                _ => {}
            }
        }
        group.push(pos);
    }

    for pos in &group {
        state[pos.index()] = Color::Empty;
    }
    group.len()
}

impl Game for Board {
    type Move = Position;

    fn reset(&mut self) {
        self.state.fill(Color::Empty);
        self.passed = false;
        self.history.clear();
        self.push_snapshot();
    }

    fn play(&mut self, mv: Position, color: Color) {
        apply_move(&self.shape, &mut self.state, &mut self.passed, mv, color);
        self.push_snapshot();
    }

    /// The target slot must be empty and the result must not recreate any earlier
    /// whole-board position. The pass slot follows the same rules, so a pass is
    /// illegal while the marker still holds the last passer.
    fn is_legal(&self, mv: Position, color: Color) -> bool {
        if self.state[mv.index()] != Color::Empty {
            return false;
        }

        let mut scratch = self.state.clone();
        let mut passed = self.passed;
        apply_move(&self.shape, &mut scratch, &mut passed, mv, color);
        !self.history.iter().any(|past| past.state == scratch)
    }

    fn ended(&self) -> bool {
        self.passed || self.plies() > MAX_PLIES
    }

    /// Area scoring: stones count for their owner; an empty cell counts for a color
    /// when every stone seen looking along the four axes belongs to that color.
    fn result(&self) -> Score {
        let mut score = Score::default();
        let length = self.shape.length();

        for (i, &c) in self.state[..self.shape.cells()].iter().enumerate() {
            match c {
                Color::Black => score.black += 1,
                Color::White => score.white += 1,
                Color::Empty => {
                    let (x, y) = (i % length, i / length);
                    let seen = [
                        self.first_stone(x, y, 1, 0),
                        self.first_stone(x, y, -1, 0),
                        self.first_stone(x, y, 0, 1),
                        self.first_stone(x, y, 0, -1),
                    ];
                    let black = seen.contains(&Color::Black);
                    let white = seen.contains(&Color::White);
                    if black && !white {
                        score.black += 1;
                    } else if white && !black {
                        score.white += 1;
                    }
                }
            }
        }
        score
    }

    fn print(&self) -> String {
        self.to_string()
    }
}

impl Index<Position> for Board {
    type Output = Color;

    fn index(&self, pos: Position) -> &Color {
        &self.state[pos.index()]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let length = self.shape.length();
        for y in 0..length {
            write!(f, "{:>2} ", length - y)?;
            for x in 0..length {
                let ch = match self.state[y * length + x] {
                    Color::Black => 'X',
                    Color::White => 'O',
                    Color::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for x in 1..=length {
            write!(f, "{} ", x % 10)?;
        }
        writeln!(f)?;
        write!(f, "Passed: {}", self.state[self.shape.pass_index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(board: &Board, x: usize, y: usize) -> Position {
        board.shape().at_xy(x, y).unwrap()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(GoShape::new(9));
        assert_eq!(board.state().len(), 82);
        assert!(board.state().iter().all(|&c| c == Color::Empty));
        assert_eq!(board.history_len(), 1);
        assert!(!board.ended());
    }

    #[test]
    fn test_play_places_stone_and_records_history() {
        let mut board = Board::new(GoShape::new(9));
        let pos = at(&board, 4, 4);
        board.play(pos, Color::Black);
        assert_eq!(board[pos], Color::Black);
        assert_eq!(board.history_len(), 2);
        assert_eq!(board.plies(), 1);
    }

    #[test]
    fn test_corner_capture() {
        let mut board = Board::new(GoShape::new(9));
        let corner = at(&board, 0, 0);
        board.play(corner, Color::White);
        board.play(at(&board, 1, 0), Color::Black);
        assert_eq!(board[corner], Color::White);
        board.play(at(&board, 0, 1), Color::Black);
        assert_eq!(board[corner], Color::Empty);
    }

    #[test]
    fn test_suicide_is_resolved_by_removal() {
        let mut board = Board::new(GoShape::new(9));
        board.play(at(&board, 1, 0), Color::Black);
        board.play(at(&board, 0, 1), Color::Black);
        let corner = at(&board, 0, 0);
        // Removing the lone stone recreates the current position.
        assert!(!board.is_legal(corner, Color::White));
        board.play(corner, Color::White);
        assert_eq!(board[corner], Color::Empty);
        assert_eq!(board.history_len(), 4);
    }

    #[test]
    fn test_capture_prefers_opponent_group() {
        // White fills its own last liberty while capturing: the capture happens first.
        let mut board = Board::new(GoShape::new(9));
        board.set(at(&board, 1, 0), Color::Black);
        board.set(at(&board, 0, 1), Color::White);
        board.set(at(&board, 2, 0), Color::White);
        board.set(at(&board, 1, 1), Color::White);
        let corner = at(&board, 0, 0);
        board.play(corner, Color::White);
        assert_eq!(board[corner], Color::White);
        assert_eq!(board[at(&board, 1, 0)], Color::Empty);
    }

    #[test]
    fn test_undo_restores_previous_state() {
        let mut board = Board::new(GoShape::new(9));
        board.play(at(&board, 2, 2), Color::Black);
        let before = board.state().to_vec();
        board.play(at(&board, 3, 3), Color::White);
        assert!(board.undo());
        assert_eq!(board.state(), &before[..]);
        assert_eq!(board.history_len(), 2);
        assert!(board.undo());
        assert!(!board.undo());
    }

    #[test]
    fn test_undo_restores_pass_flag() {
        let mut board = Board::new(GoShape::new(9));
        let pass = board.shape().pass();
        board.play(pass, Color::Black);
        board.play(pass, Color::White);
        assert!(board.ended());
        board.undo();
        assert!(!board.ended());
    }

    #[test]
    fn test_pass_then_stone_clears_marker() {
        let mut board = Board::new(GoShape::new(9));
        let pass = board.shape().pass();
        board.play(pass, Color::Black);
        assert_eq!(board[pass], Color::Black);
        board.play(at(&board, 0, 0), Color::White);
        assert_eq!(board[pass], Color::Empty);
        board.play(pass, Color::Black);
        assert!(!board.ended());
    }

    #[test]
    fn test_pass_illegal_while_marker_set() {
        let mut board = Board::new(GoShape::new(9));
        let pass = board.shape().pass();
        assert!(board.is_legal(pass, Color::Black));
        board.play(pass, Color::Black);
        assert!(!board.is_legal(pass, Color::White));
        assert!(!board.is_legal(pass, Color::Black));

        board.play(at(&board, 4, 4), Color::White);
        assert!(board.is_legal(pass, Color::Black));
    }

    #[test]
    fn test_pass_repeating_position_is_illegal() {
        let mut board = Board::new(GoShape::new(9));
        let pass = board.shape().pass();
        board.play(pass, Color::Black);
        // White's stone clears the marker; lifting it leaves an empty board again.
        let corner = at(&board, 0, 0);
        board.play(corner, Color::White);
        board.set(corner, Color::Empty);
        assert_eq!(board[pass], Color::Empty);
        // Black passing now would recreate the snapshot after the first pass.
        assert!(!board.is_legal(pass, Color::Black));
        assert!(board.is_legal(pass, Color::White));
    }

    #[test]
    fn test_occupied_cell_is_illegal() {
        let mut board = Board::new(GoShape::new(9));
        let pos = at(&board, 3, 3);
        board.play(pos, Color::Black);
        assert!(!board.is_legal(pos, Color::White));
        assert!(!board.is_legal(pos, Color::Black));
    }

    #[test]
    fn test_ply_cap_ends_game() {
        let mut board = Board::new(GoShape::new(3));
        let a = at(&board, 0, 0);
        for _ in 0..MAX_PLIES {
            board.play(a, Color::Black);
        }
        assert!(!board.ended());
        board.play(a, Color::Black);
        assert!(board.ended());
    }

    #[test]
    fn test_score_territory() {
        let mut board = Board::new(GoShape::new(5));
        // Black wall on column 1, White wall on column 3.
        for y in 0..5 {
            board.set(at(&board, 1, y), Color::Black);
            board.set(at(&board, 3, y), Color::White);
        }
        let score = board.result();
        // Column 0 is Black's, column 4 is White's, column 2 sees both colors.
        assert_eq!(score, Score { black: 10, white: 10 });
    }

    #[test]
    fn test_score_open_board_counts_nothing() {
        let board = Board::new(GoShape::new(9));
        assert_eq!(board.result(), Score::default());
    }

    #[test]
    fn test_single_stone_owns_its_lines_only() {
        let mut board = Board::new(GoShape::new(3));
        board.set(at(&board, 1, 1), Color::Black);
        // Center stone plus the four edge midpoints; corners see no stone.
        assert_eq!(board.result(), Score { black: 5, white: 0 });
    }

    #[test]
    fn test_display_marks_stones() {
        let mut board = Board::new(GoShape::new(3));
        board.play(at(&board, 0, 0), Color::Black);
        board.play(at(&board, 2, 2), Color::White);
        let text = board.print();
        assert!(text.starts_with(" 3 X . . \n"));
        assert!(text.contains(" 1 . . O \n"));
        assert!(text.ends_with("Passed: Empty"));
    }
}
