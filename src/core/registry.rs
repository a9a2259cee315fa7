use serde::Serialize;
use thiserror::Error;

use crate::core::pairing::Pair;

pub const PICTURE_EXTENSIONS: [&str; 3] = ["jpg", "png", "gif"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate picture id: {id}")]
    DuplicateId { id: String },

    #[error("Picture id {id:?} cannot be stored in a checkpoint")]
    UnstorableId { id: String },

    #[error("Pair ({left}, {right}) does not fit a registry of {len} pictures")]
    StalePair { left: usize, right: usize, len: usize },
}

/// Ids must read back unchanged from a `"<id> : <score>"` line: no `:`,
/// no line breaks, no surrounding whitespace, not empty.
pub fn is_storable_id(id: &str) -> bool {
    !id.is_empty() && id.trim() == id && !id.contains([':', '\n', '\r'])
}

/// True for names ending in a recognised picture extension, in any case.
pub fn is_picture(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => PICTURE_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        _ => false,
    }
}

/// A ranked picture, identified by its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub id: String,
    pub score: i64,
}

impl Picture {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_score(id, 0)
    }

    pub fn with_score(id: impl Into<String>, score: i64) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }

    /// File name without its extension (`"a.b.jpg"` -> `"a.b"`).
    pub fn display_name(&self) -> &str {
        match self.id.rfind('.') {
            Some(dot) => &self.id[..dot],
            None => &self.id,
        }
    }
}

/// One row of a ranked view over the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub rank: usize,
    pub id: String,
    pub score: i64,
}

/// Ordered collection of pictures with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    pictures: Vec<Picture>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with fresh, zero-scored pictures for every
    /// recognised picture file in `filenames`, keeping the listing order.
    /// Names seen twice in the listing are kept once.
    pub fn load_from_directory_listing<I, S>(&mut self, filenames: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pictures.clear();
        for name in filenames {
            let name = name.as_ref();
            if !is_picture(name) {
                continue;
            }
            if let Err(e) = self.push(Picture::new(name)) {
                log::warn!("Ignoring listing entry: {}", e);
            }
        }
        log::debug!("Registry loaded {} pictures from listing", self.len());
    }

    pub fn push(&mut self, picture: Picture) -> Result<(), RegistryError> {
        if !is_storable_id(&picture.id) {
            return Err(RegistryError::UnstorableId { id: picture.id });
        }
        if self.contains(&picture.id) {
            return Err(RegistryError::DuplicateId { id: picture.id });
        }
        self.pictures.push(picture);
        Ok(())
    }

    /// Removes the picture with `id`, returning it if it was present.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Picture> {
        let position = self.pictures.iter().position(|p| p.id == id)?;
        Some(self.pictures.remove(position))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pictures.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Picture> {
        self.pictures.iter().find(|p| p.id == id)
    }

    pub fn clear(&mut self) {
        self.pictures.clear();
    }

    pub fn len(&self) -> usize {
        self.pictures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pictures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Picture> {
        self.pictures.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.pictures.iter().map(|p| p.id.as_str())
    }

    /// Stable sort, highest score first.
    pub fn sort_by_score_descending(&mut self) {
        self.pictures.sort_by(|a, b| b.score.cmp(&a.score));
    }

    pub fn sort_by_id(&mut self) {
        self.pictures.sort_by(|a, b| a.id.cmp(&b.id));
    }

    pub fn copy_sorted_by_score_descending(&self) -> Registry {
        let mut copy = self.clone();
        copy.sort_by_score_descending();
        copy
    }

    /// Ranked view, best first. Equal scores share a rank ("1, 2, 2, 4").
    pub fn standings(&self) -> Vec<Standing> {
        let sorted = self.copy_sorted_by_score_descending();
        let mut standings: Vec<Standing> = Vec::with_capacity(sorted.len());
        for (i, picture) in sorted.pictures.into_iter().enumerate() {
            let rank = match standings.last() {
                Some(prev) if prev.score == picture.score => prev.rank,
                _ => i + 1,
            };
            standings.push(Standing {
                rank,
                id: picture.id,
                score: picture.score,
            });
        }
        standings
    }

    /// Both pictures of a pair, left first. `None` when the pair was drawn
    /// from a larger registry than this one.
    pub fn pair(&self, pair: &Pair) -> Option<(&Picture, &Picture)> {
        Some((
            self.pictures.get(pair.left())?,
            self.pictures.get(pair.right())?,
        ))
    }

    pub(crate) fn picture_mut(&mut self, position: usize) -> Option<&mut Picture> {
        self.pictures.get_mut(position)
    }
}
