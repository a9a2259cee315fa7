use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use std::path::{Path, PathBuf};

use picture_tournament::config::{FileConfig, TournamentConfig};
use picture_tournament::core::checkpoint;
use picture_tournament::core::registry::Registry;
use picture_tournament::services::listing;
use picture_tournament::services::{TerminalJudge, Tournament, TournamentState};

#[derive(Parser, Debug)]
#[command(
    name = "picture-tournament",
    version,
    about = "Rank pictures through head-to-head duels"
)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a tournament over a directory of pictures
    Run {
        /// Directory holding the pictures (default: the checkpoint's directory
        /// when resuming, the current directory otherwise)
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Resume from a checkpoint instead of starting every picture at 0
        #[arg(short, long, value_name = "SAVE")]
        resume: Option<PathBuf>,
        /// Number of rounds to play
        #[arg(long)]
        rounds: Option<u32>,
        /// Matches per round (default: everybody plays once)
        #[arg(long)]
        matches: Option<usize>,
        /// Where checkpoints are written (default: the picture directory)
        #[arg(long, value_name = "DIR")]
        checkpoint_dir: Option<PathBuf>,
        /// Config file (default: the per-user config.toml, if present)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Print the standings stored in a checkpoint
    Scores {
        /// Checkpoint file
        #[arg(short, long, value_name = "SAVE")]
        save: PathBuf,
        /// List by file name instead of by score
        #[arg(long)]
        by_name: bool,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop checkpoint entries whose picture is gone or unreadable
    Prune {
        /// Checkpoint file
        #[arg(short, long, value_name = "SAVE")]
        save: PathBuf,
        /// Directory holding the pictures (default: the checkpoint's directory)
        #[arg(short, long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Also drop pictures that fail to decode
        #[arg(long)]
        check_decode: bool,
        /// Only show what would be removed
        #[arg(long)]
        dry_run: bool,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            dir,
            resume,
            rounds,
            matches,
            checkpoint_dir,
            config,
        } => {
            let mut settings = TournamentConfig::default();
            let file_config = match config {
                Some(path) => Some(
                    FileConfig::load(&path)
                        .with_context(|| format!("Failed to read config {:?}", path))?,
                ),
                None => FileConfig::load_default().context("Failed to read user config")?,
            };
            if let Some(file_config) = file_config {
                settings.apply_file(file_config);
            }

            settings.directory = dir.unwrap_or_else(|| match &resume {
                Some(save) => checkpoint::containing_dir(save),
                None => PathBuf::from("."),
            });
            settings.save_file = resume;
            settings.checkpoint_dir = checkpoint_dir;
            if let Some(rounds) = rounds {
                settings.rounds = rounds;
            }
            if matches.is_some() {
                settings.matches_per_round = matches;
            }
            settings.validate().context("Invalid settings")?;

            match &settings.save_file {
                Some(save) => println!("▶ Resuming tournament from: {}", save.display()),
                None => println!(
                    "▶ Starting tournament in: {}",
                    settings.directory.display()
                ),
            }

            let judge = TerminalJudge::new(settings.directory.clone(), settings.keys.clone());
            let mut tournament = Tournament::new(settings, judge);
            let summary = tournament.run().context("Tournament failed")?;

            println!(
                "\n🏁 {} match(es) judged, {} skipped, {} round(s) completed",
                summary.matches_judged, summary.matches_skipped, summary.rounds_completed
            );
            match (&summary.state, &summary.last_checkpoint) {
                (TournamentState::Terminated, None) => {
                    println!("⚠️  Stopped without saving; scores from this session are lost.")
                }
                (_, Some(path)) => println!("✅ Scores saved to {}", path.display()),
                _ => {}
            }
        }

        Commands::Scores {
            save,
            by_name,
            json,
        } => {
            let registry = load_checkpoint(&save)?;

            if json {
                let standings = registry.standings();
                println!("{}", serde_json::to_string_pretty(&standings)?);
            } else if by_name {
                let mut sorted = registry.clone();
                sorted.sort_by_id();
                for picture in sorted.iter() {
                    println!("   {:<40} {:>5}", picture.id, picture.score);
                }
            } else {
                println!("🏆 Standings from {}:", save.display());
                for standing in registry.standings() {
                    println!(
                        "   {:>3}. {:<40} {:>5}",
                        standing.rank, standing.id, standing.score
                    );
                }
            }
        }

        Commands::Prune {
            save,
            dir,
            check_decode,
            dry_run,
            yes,
        } => {
            let save_dir = checkpoint::containing_dir(&save);
            let picture_dir = dir.unwrap_or_else(|| save_dir.clone());
            let mut registry = load_checkpoint(&save)?;

            println!("▶ Checking {} pictures in: {}", registry.len(), picture_dir.display());
            let unreadable = listing::find_unreadable(&registry, &picture_dir, check_decode);
            if unreadable.is_empty() {
                println!("Nothing to prune.");
                return Ok(());
            }

            for id in &unreadable {
                println!("   🗑️  {}", id);
            }
            if dry_run {
                println!("\n⚠️  Dry-run only; no checkpoint was written.");
                return Ok(());
            }
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Remove {} entries?", unreadable.len()))
                    .default(false)
                    .interact()?
            {
                println!("Aborted.");
                return Ok(());
            }

            for id in &unreadable {
                registry.remove_by_id(id);
            }
            let target = checkpoint::checkpoint_path(
                &save_dir,
                &checkpoint::source_name(&picture_dir),
                Local::now(),
            );
            checkpoint::save(&target, &registry, true)
                .with_context(|| format!("Failed to write checkpoint {:?}", target))?;
            println!(
                "\n✅ Removed {} entries, wrote {}",
                unreadable.len(),
                target.display()
            );
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn load_checkpoint(path: &Path) -> Result<Registry> {
    let mut registry = Registry::new();
    checkpoint::load(path, &mut registry)
        .with_context(|| format!("Failed to load checkpoint {:?}", path))?;
    Ok(registry)
}
