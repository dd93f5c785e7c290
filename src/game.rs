//! The capability contract a playable game offers to agents and front ends.

use crate::board::Color;

/// Area score of a finished (or unfinished) game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub black: usize,
    pub white: usize,
}

impl Score {
    /// Winner once `komi` is added to White. Black needs a strictly higher total.
    pub fn winner(&self, komi: f32) -> Color {
        if self.black as f32 > self.white as f32 + komi {
            Color::Black
        } else {
            Color::White
        }
    }
}

/// Operations every game exposes to callers outside the engine.
pub trait Game {
    type Move;

    /// Clear the board and the move history.
    fn reset(&mut self);

    /// Commit a move. The move must have passed [`Game::is_legal`].
    fn play(&mut self, mv: Self::Move, color: Color);

    fn is_legal(&self, mv: Self::Move, color: Color) -> bool;

    fn ended(&self) -> bool;

    fn result(&self) -> Score;

    /// Human-readable dump of the current state.
    fn print(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_applies_komi() {
        assert_eq!(Score { black: 40, white: 33 }.winner(6.5), Color::Black);
        assert_eq!(Score { black: 40, white: 34 }.winner(6.5), Color::White);
        assert_eq!(Score { black: 10, white: 10 }.winner(0.0), Color::White);
    }
}
