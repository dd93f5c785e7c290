//! Self-play hill climbing.
//!
//! The trainer keeps two networks: the *trainee*, which carries the candidate
//! weights, and the *opponent*, a frozen copy of the last accepted weights. A
//! round is two games on one board, once with the trainee as Black and once as
//! White. The candidate is accepted only if it wins both.
//!
//! - **Success**: the opponent takes the trainee's weights, the last step is
//!   rescaled to the walk speed and applied again, the expansion returns to zero,
//!   and the new trainee is saved under the next generation.
//! - **Failure**: the trainee falls back to the opponent, the expansion grows by
//!   the acceleration, and a fresh step touching a single weight orbit (of size
//!   ± expansion) is applied.
//!
//! The generation counter advances after every round, accepted or not.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::board::{Board, Color};
use crate::checkpoint::CheckpointRegistry;
use crate::constants::{ACCELERATION, INITIAL_WEIGHT, KOMI, WALK_SPEED};
use crate::game::{Game, Score};
use crate::network::Network;
use crate::player::Player;
use crate::shape::{GoShape, Position};

/// Tunable parameters of the training loop.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Points added to White's score when judging.
    pub komi: f32,
    /// Norm of the step re-applied after a success.
    pub walk_speed: f32,
    /// Growth of the perturbation size after each failure.
    pub acceleration: f32,
    /// Seed for perturbation choices; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            komi: KOMI,
            walk_speed: WALK_SPEED,
            acceleration: ACCELERATION,
            seed: None,
        }
    }
}

/// Summary of one finished self-play game.
#[derive(Debug, Clone, Copy)]
pub struct GameRecord {
    pub trainee_color: Color,
    pub score: Score,
    pub winner: Color,
    pub plies: usize,
    pub last_move: Position,
}

impl GameRecord {
    pub fn trainee_won(&self) -> bool {
        self.winner == self.trainee_color
    }
}

/// Both games of a round: trainee as Black first, then as White.
#[derive(Debug, Clone, Copy)]
pub struct RoundOutcome {
    pub games: [GameRecord; 2],
}

impl RoundOutcome {
    pub fn success(&self) -> bool {
        self.games.iter().all(GameRecord::trainee_won)
    }
}

pub struct Trainer {
    config: TrainerConfig,
    board: Board,
    trainee: Network,
    opponent: Network,
    /// Last perturbation applied to the trainee.
    step: Network,
    expansion: f32,
    generation: u64,
    rng: fastrand::Rng,
    registry: Option<CheckpointRegistry>,
}

impl Trainer {
    /// Start from a fresh network of the standard topology at generation 0.
    pub fn new(shape: GoShape, config: TrainerConfig) -> Self {
        let trainee = Network::standard(&shape);
        Self::with_network(shape, trainee, 0, config)
    }

    /// Start from `trainee`; the opponent begins as a copy of it.
    pub fn with_network(shape: GoShape, trainee: Network, generation: u64, config: TrainerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        // Same topology, every weight at its initial value.
        let mut step = trainee.clone();
        step.reset_constant(INITIAL_WEIGHT);
        Self {
            config,
            board: Board::new(shape),
            opponent: trainee.clone(),
            trainee,
            step,
            expansion: 0.0,
            generation,
            rng,
            registry: None,
        }
    }

    /// Persist every accepted generation into `registry`.
    pub fn with_registry(mut self, registry: CheckpointRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Continue from the newest checkpoint in `registry`, or start fresh if there is none.
    pub fn resume(shape: GoShape, registry: CheckpointRegistry, config: TrainerConfig) -> Result<Self> {
        let template = Network::standard(&shape);
        let trainer = match registry.latest()? {
            Some(generation) => {
                let net = registry
                    .load(generation, &template)
                    .with_context(|| format!("loading generation {generation} from {}", registry.dir().display()))?;
                info!(generation, "Resuming training");
                Self::with_network(shape, net, generation, config)
            }
            None => {
                info!(dir = %registry.dir().display(), "No checkpoints found, starting fresh");
                Self::with_network(shape, template, 0, config)
            }
        };
        Ok(trainer.with_registry(registry))
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn trainee(&self) -> &Network {
        &self.trainee
    }

    pub fn opponent(&self) -> &Network {
        &self.opponent
    }

    pub fn step(&self) -> &Network {
        &self.step
    }

    pub fn expansion(&self) -> f32 {
        self.expansion
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn judge(&self, score: Score) -> Color {
        score.winner(self.config.komi)
    }

    /// Play one game to the end with the trainee on `trainee_color`.
    pub fn play_game(&mut self, trainee_color: Color) -> GameRecord {
        let (black_net, white_net) = if trainee_color == Color::Black {
            (&self.trainee, &self.opponent)
        } else {
            (&self.opponent, &self.trainee)
        };
        let black = Player::new(black_net, Color::Black);
        let white = Player::new(white_net, Color::White);

        let board = &mut self.board;
        board.reset();
        let mut last_move = board.shape().pass();
        while !board.ended() {
            last_move = black.play(board);
            if !board.ended() {
                last_move = white.play(board);
            }
        }

        let score = board.result();
        let record = GameRecord {
            trainee_color,
            score,
            winner: score.winner(self.config.komi),
            plies: board.plies(),
            last_move,
        };
        debug!(
            trainee = %trainee_color,
            plies = record.plies,
            last = %board.shape().format_move(last_move),
            black = score.black,
            white = score.white,
            winner = %record.winner,
            "Game finished"
        );
        record
    }

    pub fn play_round(&mut self) -> RoundOutcome {
        RoundOutcome {
            games: [self.play_game(Color::Black), self.play_game(Color::White)],
        }
    }

    /// Apply the outcome of a round to the weights.
    pub fn evolve(&mut self, success: bool) -> Result<()> {
        if success {
            self.progress()
        } else {
            self.retry();
            Ok(())
        }
    }

    /// Play a round and evolve on its outcome.
    pub fn train_round(&mut self) -> Result<RoundOutcome> {
        let outcome = self.play_round();
        let success = outcome.success();
        self.evolve(success)?;
        let [first, second] = outcome.games;
        let as_black = format!("{}-{}", first.score.black, first.score.white);
        let as_white = format!("{}-{}", second.score.black, second.score.white);
        info!(
            generation = self.generation,
            success,
            %as_black,
            %as_white,
            expansion = self.expansion,
            "Round finished"
        );
        Ok(outcome)
    }

    fn progress(&mut self) -> Result<()> {
        self.opponent.copy_from(&self.trainee);
        self.expansion = 0.0;
        self.step.set_magnitude(self.config.walk_speed);
        self.trainee.add(&self.step);
        self.generation += 1;

        if let Some(registry) = &self.registry {
            registry
                .save(self.generation, &self.trainee)
                .with_context(|| format!("saving generation {}", self.generation))?;
        }
        Ok(())
    }

    fn retry(&mut self) {
        self.trainee.copy_from(&self.opponent);
        self.expansion += self.config.acceleration;
        self.generation += 1;

        self.step.reset();
        let layers = self.step.layers_mut();
        if layers.is_empty() {
            return;
        }
        let l = self.rng.usize(..layers.len());
        let layer = &mut layers[l];
        let neurons = layer.representative_neurons();
        let neuron = neurons[self.rng.usize(..neurons.len())];
        let mut weights = vec![0.0; layer.width()];
        let sign = if self.rng.bool() { 1.0 } else { -1.0 };
        let w = self.rng.usize(..weights.len());
        for column in layer.tied_inputs(neuron, w) {
            weights[column] = sign * self.expansion;
        }
        layer.set_neuron(neuron, &weights);
        debug!(neuron = neuron.index(), weight = w, value = weights[w], "Perturbing one orbit");

        self.trainee.add(&self.step);
    }
}
