use std::path::Path;
use thiserror::Error;

use crate::config::KeyBindings;
use crate::core::outcome::Outcome;
use crate::core::registry::{Picture, Standing};

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Failed to decode {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Progress template error: {0}")]
    Template(#[from] indicatif::style::TemplateError),
}

/// What the judge answered for the pair on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Verdict(Outcome),
    ExitAndSave,
    ExitWithoutSave,
    ShowScores,
    ShowHelp,
    Unrecognized(char),
}

/// Where the tournament stands when a pair is presented. Indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub round: usize,
    pub total_rounds: usize,
    pub match_index: usize,
    pub matches_this_round: usize,
    /// Matches settled so far over the whole run.
    pub completed: usize,
    /// Planned matches over the whole run.
    pub total_duels: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total_duels == 0 {
            return 100.0;
        }
        self.completed as f64 * 100.0 / self.total_duels as f64
    }
}

/// The human side of the tournament: shows a pair and reports a decision.
///
/// `judge` blocks until a key is pressed. A `Decode` or `Template` error
/// means the pair could not be presented and the controller skips it. An
/// `Io` error means the judge is gone: an interrupt stops the run without
/// saving, anything else ends it with an error.
pub trait JudgingSurface {
    fn judge(
        &mut self,
        left: &Picture,
        right: &Picture,
        progress: &Progress,
    ) -> Result<Signal, JudgeError>;

    fn show_scores(&mut self, standings: &[Standing]);

    fn show_help(&mut self, keys: &KeyBindings);

    fn round_started(&mut self, _round: usize, _total_rounds: usize, _matches: usize) {}

    fn round_finished(&mut self, _round: usize, _checkpoint: &Path) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        let progress = Progress {
            round: 1,
            total_rounds: 2,
            match_index: 0,
            matches_this_round: 4,
            completed: 2,
            total_duels: 8,
        };
        assert_eq!(progress.percent(), 25.0);

        let empty = Progress {
            total_duels: 0,
            completed: 0,
            ..progress
        };
        assert_eq!(empty.percent(), 100.0);
    }
}
