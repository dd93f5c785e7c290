//! Go-Evolve: a Go engine with a symmetry-tied evaluation network trained by
//! self-play hill climbing.
//!
//! ## Modules
//!
//! - [`constants`] - Board length, network topology, and training parameters
//! - [`shape`] - Board geometry, symmetry group, and orbit representatives
//! - [`game`] - The `Game` contract and area `Score`
//! - [`board`] - Rule engine (capture, positional superko, scoring, undo)
//! - [`network`] - Feed-forward layers with symmetry-consistent weights
//! - [`checkpoint`] - Versioned network files and the generation registry
//! - [`player`] - Network-driven move selection
//! - [`trainer`] - Paired self-play rounds and weight evolution
//! - [`console`] - Text interface for playing against a network
//!
//! ## Example
//!
//! ```
//! use go_evolve::board::{Board, Color};
//! use go_evolve::game::Game;
//! use go_evolve::network::Network;
//! use go_evolve::player::Player;
//! use go_evolve::shape::GoShape;
//!
//! let shape = GoShape::new(5);
//! let net = Network::new(&shape, &[3, 1]);
//! let mut board = Board::new(shape);
//!
//! let mv = Player::new(&net, Color::Black).play(&mut board);
//! println!("Black played {}", board.shape().format_move(mv));
//! println!("{}", board.print());
//! ```

pub mod board;
pub mod checkpoint;
pub mod console;
pub mod constants;
pub mod game;
pub mod network;
pub mod player;
pub mod shape;
pub mod trainer;
