//! Round-by-round controller.
//!
//! `Idle -> Loaded -> RoundInProgress -> RoundComplete -> ... -> Finished`,
//! with `Terminated` reachable from inside any round when the judge asks to
//! quit. Every completed round leaves a fresh checkpoint behind.

use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{ConfigError, TournamentConfig};
use crate::core::checkpoint::{self, CheckpointError};
use crate::core::outcome::apply_outcome;
use crate::core::pairing::{self, Pair, PairingOptions};
use crate::core::registry::{Registry, RegistryError};
use crate::services::judge::{JudgeError, JudgingSurface, Progress, Signal};
use crate::services::listing::{self, ListingError};

#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Judge error: {0}")]
    Judge(#[from] JudgeError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("A tournament needs at least two pictures, found {count}")]
    TooFewPictures { count: usize },

    #[error("Cannot {action} a tournament in state {state:?}")]
    InvalidState {
        action: &'static str,
        state: TournamentState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentState {
    Idle,
    Loaded,
    RoundInProgress,
    RoundComplete,
    Finished,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub state: TournamentState,
    pub rounds_completed: usize,
    pub matches_judged: usize,
    pub matches_skipped: usize,
    pub last_checkpoint: Option<PathBuf>,
}

enum Flow {
    Continue,
    Stop,
}

pub struct Tournament<S, R = StdRng> {
    config: TournamentConfig,
    registry: Registry,
    surface: S,
    rng: R,
    state: TournamentState,
    source: String,
    matches_per_round: Option<usize>,
    completed: usize,
    judged: usize,
    skipped: usize,
    rounds_completed: usize,
    last_checkpoint: Option<PathBuf>,
}

impl<S: JudgingSurface> Tournament<S> {
    pub fn new(config: TournamentConfig, surface: S) -> Self {
        Self::with_rng(config, surface, StdRng::from_entropy())
    }
}

impl<S: JudgingSurface, R: Rng> Tournament<S, R> {
    pub fn with_rng(config: TournamentConfig, surface: S, rng: R) -> Self {
        let source = checkpoint::source_name(&config.directory);
        let matches_per_round = config.matches_per_round;
        Self {
            config,
            registry: Registry::new(),
            surface,
            rng,
            state: TournamentState::Idle,
            source,
            matches_per_round,
            completed: 0,
            judged: 0,
            skipped: 0,
            rounds_completed: 0,
            last_checkpoint: None,
        }
    }

    pub fn state(&self) -> TournamentState {
        self.state
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Fills the registry from the save file if one is configured, from the
    /// picture directory otherwise.
    pub fn load(&mut self) -> Result<(), TournamentError> {
        if self.state != TournamentState::Idle {
            return Err(TournamentError::InvalidState {
                action: "load",
                state: self.state,
            });
        }
        self.config.validate()?;

        match &self.config.save_file {
            Some(save_file) => {
                checkpoint::load(save_file, &mut self.registry)?;
            }
            None => {
                let names = listing::list_directory(&self.config.directory)?;
                self.registry.load_from_directory_listing(names);
            }
        }

        if self.registry.len() < 2 {
            let count = self.registry.len();
            self.registry.clear();
            return Err(TournamentError::TooFewPictures { count });
        }

        log::info!(
            "Loaded {} pictures for {} round(s)",
            self.registry.len(),
            self.config.rounds
        );
        self.state = TournamentState::Loaded;
        Ok(())
    }

    /// Plays every round, loading first if needed.
    pub fn run(&mut self) -> Result<RunSummary, TournamentError> {
        if self.state == TournamentState::Idle {
            self.load()?;
        }
        if self.state != TournamentState::Loaded {
            return Err(TournamentError::InvalidState {
                action: "run",
                state: self.state,
            });
        }

        let total_rounds = self.config.rounds as usize;
        for round in 0..total_rounds {
            if let Flow::Stop = self.play_round(round, total_rounds)? {
                return Ok(self.summary());
            }
        }

        self.state = TournamentState::Finished;
        log::info!(
            "Tournament finished: {} matches judged, {} skipped",
            self.judged,
            self.skipped
        );
        Ok(self.summary())
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            state: self.state,
            rounds_completed: self.rounds_completed,
            matches_judged: self.judged,
            matches_skipped: self.skipped,
            last_checkpoint: self.last_checkpoint.clone(),
        }
    }

    fn play_round(&mut self, round: usize, total_rounds: usize) -> Result<Flow, TournamentError> {
        self.state = TournamentState::RoundInProgress;

        let options = PairingOptions {
            max_pairs: self.matches_per_round,
            no_duplicate: true,
            avoid_left_alones: true,
        };
        let pairs = pairing::random_pairs(&self.registry, options, &mut self.rng);
        // round 0 fixes the per-round count, clamped to what the registry can pair
        if round == 0 {
            self.matches_per_round = Some(pairs.len());
        }
        let per_round = self.matches_per_round.unwrap_or(pairs.len());
        let total_duels = per_round * total_rounds;

        log::info!(
            "Round {}/{}: {} matches",
            round + 1,
            total_rounds,
            pairs.len()
        );
        self.surface.round_started(round, total_rounds, pairs.len());

        for (match_index, pair) in pairs.iter().enumerate() {
            let progress = Progress {
                round,
                total_rounds,
                match_index,
                matches_this_round: pairs.len(),
                completed: self.completed,
                total_duels,
            };
            if let Flow::Stop = self.play_match(pair, &progress)? {
                return Ok(Flow::Stop);
            }
        }

        let path = self.checkpoint()?;
        self.rounds_completed += 1;
        self.state = TournamentState::RoundComplete;
        self.surface.round_finished(round, &path);
        Ok(Flow::Continue)
    }

    fn play_match(&mut self, pair: &Pair, progress: &Progress) -> Result<Flow, TournamentError> {
        loop {
            let Some((left, right)) = self.registry.pair(pair) else {
                self.state = TournamentState::Terminated;
                return Err(RegistryError::StalePair {
                    left: pair.left(),
                    right: pair.right(),
                    len: self.registry.len(),
                }
                .into());
            };
            let signal = match self.surface.judge(left, right, progress) {
                Ok(signal) => signal,
                Err(JudgeError::Io(e)) if e.kind() == io::ErrorKind::Interrupted => {
                    log::info!("Interrupted, stopping without saving");
                    self.state = TournamentState::Terminated;
                    return Ok(Flow::Stop);
                }
                Err(e @ JudgeError::Io(_)) => {
                    log::error!("Judge input lost: {}", e);
                    self.state = TournamentState::Terminated;
                    return Err(e.into());
                }
                Err(e) => {
                    log::warn!("Skipping {} vs {}: {}", left.id, right.id, e);
                    self.skipped += 1;
                    self.completed += 1;
                    return Ok(Flow::Continue);
                }
            };

            match signal {
                Signal::Verdict(outcome) => {
                    log::debug!("{:?} for pair {:?}", outcome, pair);
                    apply_outcome(&mut self.registry, pair, outcome, self.config.gains)?;
                    self.judged += 1;
                    self.completed += 1;
                    return Ok(Flow::Continue);
                }
                Signal::ExitAndSave => {
                    let path = self.checkpoint()?;
                    log::info!("Saved to {} and stopped", path.display());
                    self.state = TournamentState::Terminated;
                    return Ok(Flow::Stop);
                }
                Signal::ExitWithoutSave => {
                    log::info!("Stopped without saving");
                    self.state = TournamentState::Terminated;
                    return Ok(Flow::Stop);
                }
                Signal::ShowScores => {
                    let standings = self.registry.standings();
                    self.surface.show_scores(&standings);
                }
                Signal::ShowHelp => self.surface.show_help(&self.config.keys),
                Signal::Unrecognized(key) => {
                    log::warn!("Unrecognized key {:?}, asking again", key);
                }
            }
        }
    }

    fn checkpoint(&mut self) -> Result<PathBuf, TournamentError> {
        let path = checkpoint::checkpoint_path(
            self.config.checkpoint_dir(),
            &self.source,
            Local::now(),
        );
        checkpoint::save(&path, &self.registry, self.config.sort_on_save)?;
        self.last_checkpoint = Some(path.clone());
        Ok(path)
    }
}
