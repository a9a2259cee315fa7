use crate::core::pairing::Pair;
use crate::core::registry::{Registry, RegistryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    LeftWins,
    RightWins,
    Draw,
}

/// Score changes applied to the winner and the loser of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gains {
    pub victory: i64,
    pub loss: i64,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            victory: 1,
            loss: -1,
        }
    }
}

/// Scores one match. A pair that does not fit `registry` is rejected
/// before either score changes.
pub fn apply_outcome(
    registry: &mut Registry,
    pair: &Pair,
    outcome: Outcome,
    gains: Gains,
) -> Result<(), RegistryError> {
    if registry.pair(pair).is_none() {
        return Err(RegistryError::StalePair {
            left: pair.left(),
            right: pair.right(),
            len: registry.len(),
        });
    }

    let (winner, loser) = match outcome {
        Outcome::LeftWins => (pair.left(), pair.right()),
        Outcome::RightWins => (pair.right(), pair.left()),
        Outcome::Draw => return Ok(()),
    };

    if let Some(picture) = registry.picture_mut(winner) {
        picture.score += gains.victory;
    }
    if let Some(picture) = registry.picture_mut(loser) {
        picture.score += gains.loss;
    }
    Ok(())
}
