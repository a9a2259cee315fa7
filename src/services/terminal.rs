use dialoguer::console::{Term, style};
use image::{GenericImageView, ImageReader};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::config::KeyBindings;
use crate::core::registry::{Picture, Standing};
use crate::services::judge::{JudgeError, JudgingSurface, Progress, Signal};

/// Judging surface for a terminal: prints both contenders and reads one key.
pub struct TerminalJudge {
    directory: PathBuf,
    keys: KeyBindings,
    term: Term,
    bar: Option<ProgressBar>,
}

impl TerminalJudge {
    pub fn new(directory: impl Into<PathBuf>, keys: KeyBindings) -> Self {
        Self {
            directory: directory.into(),
            keys,
            term: Term::stdout(),
            bar: None,
        }
    }

    fn describe(&self, picture: &Picture) -> Result<String, JudgeError> {
        let path = self.directory.join(&picture.id);
        let decoded = ImageReader::open(&path)
            .map_err(image::ImageError::IoError)
            .and_then(|reader| reader.with_guessed_format().map_err(image::ImageError::IoError))
            .and_then(|reader| reader.decode())
            .map_err(|source| JudgeError::Decode {
                id: picture.id.clone(),
                source,
            })?;
        let (width, height) = decoded.dimensions();

        Ok(format!(
            "{} ({}x{}, score {})",
            style(picture.display_name()).bold(),
            width,
            height,
            picture.score
        ))
    }

    fn progress_bar(&mut self, total_duels: usize) -> Result<ProgressBar, JudgeError> {
        if let Some(bar) = &self.bar {
            return Ok(bar.clone());
        }
        let bar = ProgressBar::new(total_duels as u64);
        bar.set_style(ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} duels ({percent}%) {msg}",
        )?);
        self.bar = Some(bar.clone());
        Ok(bar)
    }

    fn print(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }
}

impl JudgingSurface for TerminalJudge {
    fn judge(
        &mut self,
        left: &Picture,
        right: &Picture,
        progress: &Progress,
    ) -> Result<Signal, JudgeError> {
        let left_line = self.describe(left)?;
        let right_line = self.describe(right)?;

        let bar = self.progress_bar(progress.total_duels)?;
        bar.set_position(progress.completed as u64);
        bar.set_message(format!(
            "round {}/{}, match {}/{}",
            progress.round + 1,
            progress.total_rounds,
            progress.match_index + 1,
            progress.matches_this_round
        ));

        let prompt = format!(
            "\n⚔️  [{}] {}\n    vs\n    [{}] {}\n   {} draw, {} help",
            self.keys.left,
            left_line,
            self.keys.right,
            right_line,
            self.keys.draw,
            self.keys.show_help
        );
        let term = &self.term;
        let key = bar.suspend(|| {
            println!("{}", prompt);
            term.read_char()
        })?;

        Ok(self.keys.resolve(key))
    }

    fn show_scores(&mut self, standings: &[Standing]) {
        self.print("🏆 Current standings:");
        for standing in standings {
            self.print(&format!(
                "   {:>3}. {:<40} {:>5}",
                standing.rank, standing.id, standing.score
            ));
        }
    }

    fn show_help(&mut self, keys: &KeyBindings) {
        self.print("⌨️  Keys:");
        for (key, description) in keys.describe() {
            self.print(&format!("   {}  {}", key, description));
        }
    }

    fn round_started(&mut self, round: usize, total_rounds: usize, matches: usize) {
        self.print(&format!(
            "\n✨ Round {}/{}: {} matches",
            round + 1,
            total_rounds,
            matches
        ));
    }

    fn round_finished(&mut self, round: usize, checkpoint: &Path) {
        self.print(&format!(
            "✅ Round {} saved to {}",
            round + 1,
            checkpoint.display()
        ));
    }
}

impl Drop for TerminalJudge {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
