use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::outcome::{Gains, Outcome};
use crate::services::judge::Signal;

const APP_DIR: &str = "picture-tournament";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Key '{key}' is bound to both {first} and {second}")]
    DuplicateKey {
        key: char,
        first: &'static str,
        second: &'static str,
    },

    #[error("A tournament needs at least one round")]
    InvalidRounds,
}

/// Keys the judging surface maps to tournament signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyBindings {
    pub left: char,
    pub right: char,
    pub draw: char,
    pub exit_and_save: char,
    pub exit_without_save: char,
    pub show_scores: char,
    pub show_help: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: 'a',
            right: 'd',
            draw: 's',
            exit_and_save: 'q',
            exit_without_save: 'x',
            show_scores: 't',
            show_help: 'h',
        }
    }
}

impl KeyBindings {
    fn entries(&self) -> [(char, Signal, &'static str); 7] {
        [
            (self.left, Signal::Verdict(Outcome::LeftWins), "choose left"),
            (self.right, Signal::Verdict(Outcome::RightWins), "choose right"),
            (self.draw, Signal::Verdict(Outcome::Draw), "draw"),
            (self.exit_and_save, Signal::ExitAndSave, "save and quit"),
            (self.exit_without_save, Signal::ExitWithoutSave, "quit without saving"),
            (self.show_scores, Signal::ShowScores, "show scores"),
            (self.show_help, Signal::ShowHelp, "show help"),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let entries = self.entries();
        for (i, (key, _, first)) in entries.iter().enumerate() {
            if let Some((_, _, second)) = entries[i + 1..].iter().find(|(k, _, _)| k == key) {
                return Err(ConfigError::DuplicateKey {
                    key: *key,
                    first: *first,
                    second: *second,
                });
            }
        }
        Ok(())
    }

    pub fn resolve(&self, key: char) -> Signal {
        self.entries()
            .into_iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, signal, _)| signal)
            .unwrap_or(Signal::Unrecognized(key))
    }

    /// `(key, description)` for every binding, in a fixed order.
    pub fn describe(&self) -> Vec<(char, &'static str)> {
        self.entries()
            .into_iter()
            .map(|(key, _, description)| (key, description))
            .collect()
    }
}

/// Optional settings read from `config.toml`. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub rounds: Option<u32>,
    pub matches_per_round: Option<usize>,
    pub victory_gain: Option<i64>,
    pub loss_gain: Option<i64>,
    pub sort_on_save: Option<bool>,
    pub keys: Option<KeyBindings>,
}

impl FileConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Loads the per-user config file if there is one.
    pub fn load_default() -> Result<Option<Self>, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("Reading config from {}", path.display());
                Self::load(&path).map(Some)
            }
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentConfig {
    /// Directory holding the pictures.
    pub directory: PathBuf,
    /// Resume from this checkpoint instead of listing `directory`.
    pub save_file: Option<PathBuf>,
    pub rounds: u32,
    /// `None` lets the first round pair everybody and reuses that count.
    pub matches_per_round: Option<usize>,
    pub gains: Gains,
    /// Where checkpoints go; `directory` when unset.
    pub checkpoint_dir: Option<PathBuf>,
    /// Write checkpoints best score first.
    pub sort_on_save: bool,
    pub keys: KeyBindings,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            save_file: None,
            rounds: 3,
            matches_per_round: None,
            gains: Gains::default(),
            checkpoint_dir: None,
            sort_on_save: true,
            keys: KeyBindings::default(),
        }
    }
}

impl TournamentConfig {
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(rounds) = file.rounds {
            self.rounds = rounds;
        }
        if file.matches_per_round.is_some() {
            self.matches_per_round = file.matches_per_round;
        }
        if let Some(victory) = file.victory_gain {
            self.gains.victory = victory;
        }
        if let Some(loss) = file.loss_gain {
            self.gains.loss = loss;
        }
        if let Some(sort_on_save) = file.sort_on_save {
            self.sort_on_save = sort_on_save;
        }
        if let Some(keys) = file.keys {
            self.keys = keys;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds == 0 {
            return Err(ConfigError::InvalidRounds);
        }
        self.keys.validate()
    }

    pub fn checkpoint_dir(&self) -> &Path {
        self.checkpoint_dir.as_deref().unwrap_or(&self.directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_bindings_are_valid() {
        let keys = KeyBindings::default();
        keys.validate().unwrap();
        assert_eq!(keys.resolve('a'), Signal::Verdict(Outcome::LeftWins));
        assert_eq!(keys.resolve('d'), Signal::Verdict(Outcome::RightWins));
        assert_eq!(keys.resolve('s'), Signal::Verdict(Outcome::Draw));
        assert_eq!(keys.resolve('q'), Signal::ExitAndSave);
        assert_eq!(keys.resolve('x'), Signal::ExitWithoutSave);
        assert_eq!(keys.resolve('t'), Signal::ShowScores);
        assert_eq!(keys.resolve('h'), Signal::ShowHelp);
        assert_eq!(keys.resolve('z'), Signal::Unrecognized('z'));
    }

    #[test]
    fn test_duplicate_binding_is_rejected() {
        let keys = KeyBindings {
            draw: 'a',
            ..Default::default()
        };
        match keys.validate() {
            Err(ConfigError::DuplicateKey { key, first, second }) => {
                assert_eq!(key, 'a');
                assert_eq!(first, "choose left");
                assert_eq!(second, "draw");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_file_config_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
rounds = 5
victory_gain = 2

[keys]
left = "j"
right = "l"
"#,
        )
        .unwrap();

        let mut config = TournamentConfig::default();
        config.apply_file(FileConfig::load(&path).unwrap());
        config.validate().unwrap();

        assert_eq!(config.rounds, 5);
        assert_eq!(config.gains, Gains { victory: 2, loss: -1 });
        assert_eq!(config.matches_per_round, None);
        assert_eq!(config.keys.left, 'j');
        assert_eq!(config.keys.right, 'l');
        assert_eq!(config.keys.draw, 's');
    }

    #[test]
    fn test_unknown_field_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "roundz = 5\n").unwrap();
        assert!(matches!(FileConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_rounds_is_invalid() {
        let config = TournamentConfig {
            rounds: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRounds)));
    }

    #[test]
    fn test_checkpoint_dir_falls_back_to_directory() {
        let mut config = TournamentConfig {
            directory: PathBuf::from("/pics"),
            ..Default::default()
        };
        assert_eq!(config.checkpoint_dir(), Path::new("/pics"));
        config.checkpoint_dir = Some(PathBuf::from("/saves"));
        assert_eq!(config.checkpoint_dir(), Path::new("/saves"));
    }
}
