//! Go-Evolve: train a Go evaluation network by self-play, or play against it.
//!
//! ## Usage
//!
//! - `go-evolve train --save-dir results` - Train, resuming from the newest checkpoint
//! - `go-evolve play --save-dir results` - Play White against the newest network
//! - `go-evolve demo` - Play one self-play round with a fresh network

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use go_evolve::board::{Board, Color};
use go_evolve::checkpoint::CheckpointRegistry;
use go_evolve::console::Console;
use go_evolve::constants::N;
use go_evolve::game::Game;
use go_evolve::network::Network;
use go_evolve::shape::GoShape;
use go_evolve::trainer::{Trainer, TrainerConfig};

/// Go-Evolve: self-play trained Go evaluation network
#[derive(Parser)]
#[command(name = "go-evolve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run self-play training rounds, saving every accepted generation
    Train {
        /// Directory holding `<generation>.dat` checkpoints
        #[arg(long, default_value = "results")]
        save_dir: PathBuf,
        /// Number of rounds to play (0 runs until interrupted)
        #[arg(long, default_value_t = 0)]
        rounds: u64,
        /// Seed for the perturbation generator
        #[arg(long)]
        seed: Option<u64>,
        /// Points added to White's score
        #[arg(long, default_value_t = go_evolve::constants::KOMI)]
        komi: f32,
    },
    /// Play against a saved network on the console
    Play {
        /// Directory holding `<generation>.dat` checkpoints
        #[arg(long, default_value = "results")]
        save_dir: PathBuf,
        /// Generation to load (defaults to the newest)
        #[arg(long)]
        generation: Option<u64>,
        /// Let the network play White instead of Black
        #[arg(long)]
        agent_white: bool,
    },
    /// Play a single self-play round with a fresh network
    Demo,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Some(Commands::Train {
            save_dir,
            rounds,
            seed,
            komi,
        }) => train(save_dir, rounds, seed, komi),
        Some(Commands::Play {
            save_dir,
            generation,
            agent_white,
        }) => play(save_dir, generation, agent_white),
        Some(Commands::Demo) | None => demo(),
    }
}

fn train(save_dir: PathBuf, rounds: u64, seed: Option<u64>, komi: f32) -> Result<()> {
    let config = TrainerConfig {
        komi,
        seed,
        ..TrainerConfig::default()
    };
    let registry = CheckpointRegistry::new(save_dir);
    let mut trainer = Trainer::resume(GoShape::new(N), registry, config)?;
    info!(generation = trainer.generation(), rounds, "Training started");

    let mut played = 0;
    while rounds == 0 || played < rounds {
        trainer.train_round()?;
        played += 1;
    }
    Ok(())
}

fn play(save_dir: PathBuf, generation: Option<u64>, agent_white: bool) -> Result<()> {
    let shape = GoShape::new(N);
    let registry = CheckpointRegistry::new(save_dir);
    let generation = match generation {
        Some(g) => g,
        None => registry
            .latest()?
            .with_context(|| format!("no checkpoints in {}", registry.dir().display()))?,
    };
    let net = registry.load(generation, &Network::standard(&shape))?;
    info!(generation, "Loaded network");

    let agent_color = if agent_white { Color::White } else { Color::Black };
    let mut console = Console::new(Board::new(shape), net, agent_color);
    let stdin = io::stdin();
    console.run(stdin.lock(), io::stdout())?;
    Ok(())
}

fn demo() -> Result<()> {
    println!("Go-Evolve: self-play demo on a {N}x{N} board\n");

    let config = TrainerConfig {
        seed: Some(1),
        ..TrainerConfig::default()
    };
    let mut trainer = Trainer::new(GoShape::new(N), config);
    let outcome = trainer.play_round();
    for game in &outcome.games {
        println!(
            "Trainee as {}: {} plies, Black {} - White {}, winner {}",
            game.trainee_color, game.plies, game.score.black, game.score.white, game.winner
        );
    }
    println!("\nFinal position of the second game:\n{}", trainer.board().print());
    println!("\nRound {}", if outcome.success() { "succeeded" } else { "failed" });
    Ok(())
}
