//! Plain-text checkpoint format: one `"<id> : <score>"` line per picture.
//!
//! Loading is lenient about malformed lines (they are logged and skipped)
//! but strict about duplicate ids, which reject the whole file.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::registry::{Picture, Registry, RegistryError};

pub const CHECKPOINT_EXTENSION: &str = "ptsave";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const SEPARATOR: &str = " : ";

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Duplicate picture id '{id}' on line {line}")]
    DuplicateId { line: usize, id: String },
}

/// What a load kept and what it threw away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

pub fn to_text(registry: &Registry, sorted: bool) -> String {
    let mut text = String::new();
    let mut push_line = |picture: &Picture| {
        text.push_str(&picture.id);
        text.push_str(SEPARATOR);
        text.push_str(&picture.score.to_string());
        text.push('\n');
    };

    if sorted {
        registry
            .copy_sorted_by_score_descending()
            .iter()
            .for_each(&mut push_line);
    } else {
        registry.iter().for_each(&mut push_line);
    }
    text
}

fn parse_line(line: &str) -> Option<(&str, i64)> {
    let mut parts = line.split(':');
    let id = parts.next()?.trim();
    let score = parts.next()?.trim();
    if parts.next().is_some() || id.is_empty() {
        return None;
    }
    score.parse::<i64>().ok().map(|score| (id, score))
}

/// Replaces the contents of `registry` with the pictures described by `text`.
pub fn parse_into(text: &str, registry: &mut Registry) -> Result<LoadReport, CheckpointError> {
    registry.clear();
    let mut report = LoadReport::default();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((id, score)) = parse_line(line) else {
            log::warn!("Skipping malformed checkpoint line {}: {:?}", i + 1, line);
            report.skipped += 1;
            continue;
        };

        match registry.push(Picture::with_score(id, score)) {
            Ok(()) => report.loaded += 1,
            Err(RegistryError::DuplicateId { id }) => {
                registry.clear();
                return Err(CheckpointError::DuplicateId { line: i + 1, id });
            }
            Err(e) => {
                log::warn!("Skipping checkpoint line {}: {}", i + 1, e);
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

pub fn load(path: &Path, registry: &mut Registry) -> Result<LoadReport, CheckpointError> {
    let text = fs::read_to_string(path)?;
    let report = parse_into(&text, registry)?;
    log::info!(
        "Loaded {} pictures from {} ({} malformed lines skipped)",
        report.loaded,
        path.display(),
        report.skipped
    );
    Ok(report)
}

/// Writes the whole registry to `path`, replacing any previous content.
///
/// The text goes to a sibling temporary file first and is renamed into
/// place, so readers never see a half-written checkpoint.
pub fn save(path: &Path, registry: &Registry, sorted: bool) -> Result<(), CheckpointError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "checkpoint".to_string());
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp_path, to_text(registry, sorted))?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    log::info!("Saved {} pictures to {}", registry.len(), path.display());
    Ok(())
}

/// Directory holding `file`, `"."` for a bare file name.
pub fn containing_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Name used in checkpoint file names for pictures taken from `dir`.
pub fn source_name(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tournament".to_string())
}

/// `<dir>/<source>_<YYYY-MM-DD_HH-MM-SS>.ptsave`, with `_1`, `_2`, ...
/// appended to the stem when that file already exists.
pub fn checkpoint_path(dir: &Path, source: &str, timestamp: DateTime<Local>) -> PathBuf {
    let stem = format!("{}_{}", source, timestamp.format(TIMESTAMP_FORMAT));
    let mut candidate = dir.join(format!("{}.{}", stem, CHECKPOINT_EXTENSION));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{}_{}.{}", stem, n, CHECKPOINT_EXTENSION));
        n += 1;
    }
    candidate
}
