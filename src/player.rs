//! Network-driven move selection.
//!
//! A [`Player`] has no search tree: it tries every legal move once, asks the
//! network how good the resulting board looks from its own side, and keeps the best.

use crate::board::{Board, Color};
use crate::game::Game;
use crate::network::Network;
use crate::shape::{Position, Shape};

/// Encode a board for `color`: own stones `+1`, opponent stones `-1`, empty `0`.
///
/// The pass marker is encoded like a cell.
pub fn encode(state: &[Color], color: Color) -> Vec<f32> {
    state
        .iter()
        .map(|&c| {
            if c == Color::Empty {
                0.0
            } else if c == color {
                1.0
            } else {
                -1.0
            }
        })
        .collect()
}

/// An agent playing one color with a borrowed network.
#[derive(Debug, Clone, Copy)]
pub struct Player<'a> {
    net: &'a Network,
    color: Color,
}

impl<'a> Player<'a> {
    pub fn new(net: &'a Network, color: Color) -> Self {
        Self { net, color }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn net(&self) -> &'a Network {
        self.net
    }

    /// Network value of every position index, `None` where the move is illegal.
    ///
    /// Each candidate is played and undone on `board`, which ends up unchanged.
    pub fn evaluate_moves(&self, board: &mut Board) -> Vec<Option<f32>> {
        let size = board.shape().size();
        let mut values = Vec::with_capacity(size);
        for index in 0..size {
            let Some(candidate) = board.shape().at(index) else {
                values.push(None);
                continue;
            };
            if !board.is_legal(candidate, self.color) {
                values.push(None);
                continue;
            }
            board.play(candidate, self.color);
            values.push(Some(self.net.evaluate(&encode(board.state(), self.color))));
            board.undo();
        }
        values
    }

    /// The legal move with the strictly highest value; ties keep the lowest index.
    ///
    /// Without any legal move the answer is a pass, which ends the game if the
    /// opponent passed last.
    pub fn choose(&self, board: &mut Board) -> Position {
        let values = self.evaluate_moves(board);
        let mut best = board.shape().pass();
        let mut max = f32::NEG_INFINITY;
        for (index, value) in values.into_iter().enumerate() {
            let Some(value) = value else {
                continue;
            };
            if value > max {
                if let Some(pos) = board.shape().at(index) {
                    best = pos;
                    max = value;
                }
            }
        }
        best
    }

    /// Pick a move, commit it on `board` and return it.
    pub fn play(&self, board: &mut Board) -> Position {
        let mv = self.choose(board);
        board.play(mv, self.color);
        mv
    }
}
