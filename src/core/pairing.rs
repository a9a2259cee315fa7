use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::registry::Registry;

/// Two registry positions facing each other in one match.
///
/// Only the pairing engine builds pairs; look the pictures up with
/// [`Registry::pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    left: usize,
    right: usize,
}

impl Pair {
    pub(crate) fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> usize {
        self.left
    }

    pub fn right(&self) -> usize {
        self.right
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PairingOptions {
    /// Stop after this many pairs. `None` means no cap.
    pub max_pairs: Option<usize>,
    /// Random disjoint pairs when set, every 2-combination otherwise.
    pub no_duplicate: bool,
    /// Give the odd one out a random opponent instead of a bye.
    pub avoid_left_alones: bool,
}

impl Default for PairingOptions {
    fn default() -> Self {
        Self {
            max_pairs: None,
            no_duplicate: true,
            avoid_left_alones: true,
        }
    }
}

/// Draws the pairs for one round.
pub fn random_pairs<R: Rng + ?Sized>(
    registry: &Registry,
    options: PairingOptions,
    rng: &mut R,
) -> Vec<Pair> {
    if options.no_duplicate {
        shuffled_pairs(registry.len(), options, rng)
    } else {
        all_combinations(registry.len(), options.max_pairs)
    }
}

fn shuffled_pairs<R: Rng + ?Sized>(len: usize, options: PairingOptions, rng: &mut R) -> Vec<Pair> {
    let mut positions: Vec<usize> = (0..len).collect();
    positions.shuffle(rng);

    let cap = options.max_pairs.unwrap_or(usize::MAX);
    let mut pairs = Vec::with_capacity((len / 2 + 1).min(cap));

    while positions.len() >= 2 && pairs.len() < cap {
        let (Some(left), Some(right)) = (positions.pop(), positions.pop()) else {
            break;
        };
        pairs.push(Pair::new(left, right));
    }

    if positions.len() == 1 && pairs.len() < cap {
        let leftover = positions[0];
        if !options.avoid_left_alones {
            log::debug!("Position {} sits out this round", leftover);
        } else if len < 2 {
            log::debug!("Single picture, no opponent to draw");
        } else {
            // uniform over every other position, including ones already paired
            let mut partner = rng.gen_range(0..len - 1);
            if partner >= leftover {
                partner += 1;
            }
            log::debug!(
                "Leftover position {} drawn against position {}",
                leftover,
                partner
            );
            pairs.push(Pair::new(leftover, partner));
        }
    }

    pairs
}

fn all_combinations(len: usize, max_pairs: Option<usize>) -> Vec<Pair> {
    let combinations = (0..len).flat_map(|i| ((i + 1)..len).map(move |j| Pair::new(i, j)));
    match max_pairs {
        Some(cap) => combinations.take(cap).collect(),
        None => combinations.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::Picture;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    fn registry_of_size(n: usize) -> Registry {
        let mut registry = Registry::new();
        for i in 0..n {
            registry.push(Picture::new(format!("pic{}.jpg", i))).unwrap();
        }
        registry
    }

    fn appearances(registry: &Registry, pairs: &[Pair]) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> =
            registry.ids().map(|id| (id.to_string(), 0)).collect();
        for pair in pairs {
            let (left, right) = registry.pair(pair).unwrap();
            *counts.get_mut(&left.id).unwrap() += 1;
            *counts.get_mut(&right.id).unwrap() += 1;
        }
        counts
    }

    #[test]
    fn test_even_registry_pairs_everyone_once() {
        let registry = registry_of_size(10);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pairs = random_pairs(&registry, PairingOptions::default(), &mut rng);

            assert_eq!(pairs.len(), 5);
            assert!(pairs.iter().all(|p| p.left() != p.right()));
            assert!(appearances(&registry, &pairs).values().all(|&c| c == 1));
        }
    }

    #[test]
    fn test_odd_registry_leftover_gets_a_partner() {
        let registry = registry_of_size(7);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pairs = random_pairs(&registry, PairingOptions::default(), &mut rng);

            assert_eq!(pairs.len(), 4);
            assert!(pairs.iter().all(|p| p.left() != p.right() && p.right() < 7));

            let counts = appearances(&registry, &pairs);
            assert_eq!(counts.values().filter(|&&c| c == 2).count(), 1);
            assert_eq!(counts.values().filter(|&&c| c == 1).count(), 6);
        }
    }

    #[test]
    fn test_odd_registry_leftover_sits_out() {
        let registry = registry_of_size(7);
        let options = PairingOptions {
            avoid_left_alones: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let pairs = random_pairs(&registry, options, &mut rng);

        assert_eq!(pairs.len(), 3);
        let counts = appearances(&registry, &pairs);
        assert_eq!(counts.values().filter(|&&c| c == 0).count(), 1);
        assert_eq!(counts.values().filter(|&&c| c == 1).count(), 6);
    }

    #[test]
    fn test_max_pairs_caps_the_round() {
        let registry = registry_of_size(9);
        let options = PairingOptions {
            max_pairs: Some(2),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let pairs = random_pairs(&registry, options, &mut rng);

        assert_eq!(pairs.len(), 2);
        assert!(appearances(&registry, &pairs).values().all(|&c| c <= 1));
    }

    #[test]
    fn test_tiny_registries() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(random_pairs(&registry_of_size(0), PairingOptions::default(), &mut rng).is_empty());
        assert!(random_pairs(&registry_of_size(1), PairingOptions::default(), &mut rng).is_empty());

        let pairs = random_pairs(&registry_of_size(2), PairingOptions::default(), &mut rng);
        assert_eq!(pairs.len(), 1);
        assert_ne!(pairs[0].left(), pairs[0].right());
    }

    #[test]
    fn test_all_combinations_in_registry_order() {
        let registry = registry_of_size(4);
        let options = PairingOptions {
            no_duplicate: false,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let pairs = random_pairs(&registry, options, &mut rng);

        let expected = vec![
            Pair::new(0, 1),
            Pair::new(0, 2),
            Pair::new(0, 3),
            Pair::new(1, 2),
            Pair::new(1, 3),
            Pair::new(2, 3),
        ];
        assert_eq!(pairs, expected);

        let capped = random_pairs(
            &registry,
            PairingOptions {
                max_pairs: Some(4),
                ..options
            },
            &mut rng,
        );
        assert_eq!(capped, expected[..4]);
    }
}
