use rayon::prelude::*;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::registry::{Picture, Registry};

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Names of the regular files directly inside `dir`, sorted by name.
pub fn list_directory(dir: &Path) -> Result<Vec<String>, ListingError> {
    if !dir.is_dir() {
        return Err(ListingError::NotADirectory {
            path: dir.to_string_lossy().to_string(),
        });
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    log::debug!("Listed {} files in {}", names.len(), dir.display());
    Ok(names)
}

/// Ids whose picture file is gone from `dir` or, with `check_decode`,
/// can no longer be decoded. Returned in registry order.
pub fn find_unreadable(registry: &Registry, dir: &Path, check_decode: bool) -> Vec<String> {
    let pictures: Vec<&Picture> = registry.iter().collect();

    pictures
        .par_iter()
        .filter_map(|picture| {
            let path = dir.join(&picture.id);
            if !path.is_file() {
                log::warn!("Missing picture: {}", path.display());
                return Some(picture.id.clone());
            }
            if check_decode {
                if let Err(e) = image::open(&path) {
                    log::warn!("Unreadable picture {}: {}", path.display(), e);
                    return Some(picture.id.clone());
                }
            }
            None
        })
        .collect()
}
