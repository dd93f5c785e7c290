//! Constants for board dimensions, network topology, and training parameters.
//!
//! # Board Size Configuration
//!
//! The default board length is controlled by Cargo features:
//! - `board9x9` (default): 9x9 board
//! - `board13x13`: 13x13 board
//!
//! ```sh
//! cargo build                                              # 9x9 (default)
//! cargo build --no-default-features --features board13x13  # 13x13
//! ```
//!
//! Shapes themselves are built at run time from a length, so tests and tools may
//! still construct other sizes explicitly.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board length (NxN).
#[cfg(feature = "board9x9")]
pub const N: usize = 9;

#[cfg(feature = "board13x13")]
pub const N: usize = 13;

// Compile-time check: exactly one board size feature must be enabled
#[cfg(all(feature = "board9x9", feature = "board13x13"))]
compile_error!("Cannot enable both 'board9x9' and 'board13x13' features at the same time");

#[cfg(not(any(feature = "board9x9", feature = "board13x13")))]
compile_error!("Must enable exactly one board size feature: 'board9x9' or 'board13x13'");

/// Plies after which a game is considered finished regardless of passes.
pub const MAX_PLIES: usize = 160;

// =============================================================================
// Network Topology
// =============================================================================

/// Board lengths of each layer's output shape, ending in a single cell.
#[cfg(feature = "board9x9")]
pub const LAYER_LENGTHS: &[usize] = &[9, 9, 7, 5, 3, 1];

#[cfg(feature = "board13x13")]
pub const LAYER_LENGTHS: &[usize] = &[13, 13, 9, 5, 3, 1];

/// Value every weight takes in a freshly built network.
pub const INITIAL_WEIGHT: f32 = 1.0;

// =============================================================================
// Training Parameters
// =============================================================================

/// Points added to White's score when judging a game.
pub const KOMI: f32 = 6.5;

/// Magnitude the step network is rescaled to after a successful round.
pub const WALK_SPEED: f32 = 0.1;

/// Amount the single-weight perturbation grows by after each failed round.
pub const ACCELERATION: f32 = 0.04;

// =============================================================================
// Checkpoint Format
// =============================================================================

/// Leading bytes of every checkpoint file.
pub const CHECKPOINT_MAGIC: [u8; 4] = *b"GOEV";

/// Current checkpoint schema version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// File extension of generation checkpoints.
pub const CHECKPOINT_EXTENSION: &str = "dat";
