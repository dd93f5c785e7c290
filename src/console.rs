//! Text front end for playing against a trained network.
//!
//! The console alternates between the agent and a human reading moves from any
//! `BufRead`. Moves are entered as `column,row` using the labels printed around
//! the board (`3,7`, `3 7`), or `pass`. `quit` leaves the game. Input that cannot
//! be parsed or is illegal is reported and asked for again; it never reaches the
//! board.
//!
//! ## Example
//!
//! ```ignore
//! use go_evolve::console::Console;
//! let mut console = Console::new(board, net, Color::Black);
//! console.run(std::io::stdin().lock(), std::io::stdout())?;
//! ```

use std::io::{BufRead, Write};

use anyhow::Result;
use thiserror::Error;

use crate::board::{Board, Color};
use crate::game::{Game, Score};
use crate::network::Network;
use crate::player::Player;
use crate::shape::Position;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("cannot read '{0}' as a move")]
    Unparseable(String),
    #[error("{0} is not a legal move")]
    Illegal(String),
}

/// A line of human input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Position),
    Quit,
}

/// A game between the agent and a human.
pub struct Console {
    board: Board,
    net: Network,
    agent_color: Color,
}

impl Console {
    pub fn new(board: Board, net: Network, agent_color: Color) -> Self {
        Self {
            board,
            net,
            agent_color,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn human_color(&self) -> Color {
        self.agent_color.opponent()
    }

    /// Parse and validate one line of human input.
    pub fn parse_command(&self, line: &str) -> Result<Command, InputError> {
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q") {
            return Ok(Command::Quit);
        }
        let shape = self.board.shape();
        let mv = shape
            .parse_move(line)
            .ok_or_else(|| InputError::Unparseable(line.to_string()))?;
        if !self.board.is_legal(mv, self.human_color()) {
            return Err(InputError::Illegal(shape.format_move(mv)));
        }
        Ok(Command::Move(mv))
    }

    /// Summary printed after each move.
    pub fn report(&self, color: Color, mv: Position) -> String {
        let score = self.board.result();
        format!(
            "\n- Move {}, after {} played at {}\n{}\nScore: {} to {}",
            self.board.plies(),
            color,
            self.board.shape().format_move(mv),
            self.board.print(),
            score.black,
            score.white
        )
    }

    /// Run until the game ends, the human quits, or input runs out.
    ///
    /// Returns the final score if the game ended.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<Option<Score>> {
        let mut lines = input.lines();
        let mut to_move = Color::Black;

        while !self.board.ended() {
            if to_move == self.agent_color {
                let mv = Player::new(&self.net, self.agent_color).play(&mut self.board);
                writeln!(output, "{}", self.report(to_move, mv))?;
            } else {
                let mv = loop {
                    write!(output, "\nYour move ({}): ", self.human_color())?;
                    output.flush()?;
                    let Some(line) = lines.next() else {
                        return Ok(None);
                    };
                    match self.parse_command(&line?) {
                        Ok(Command::Move(mv)) => break mv,
                        Ok(Command::Quit) => return Ok(None),
                        Err(e) => writeln!(output, "Invalid input: {e}. Try again.")?,
                    }
                };
                self.board.play(mv, to_move);
                writeln!(output, "{}", self.report(to_move, mv))?;
            }
            to_move = to_move.opponent();
        }

        let score = self.board.result();
        writeln!(output, "\nGame over. Black {} - White {}", score.black, score.white)?;
        Ok(Some(score))
    }
}
