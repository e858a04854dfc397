//! Pareto operators over a scored colony
//!
//! All three running objectives (CBO, NAC, ATMR) are minimised. Each path's
//! domination count is the number of colony members that dominate it, so
//! count 0 is the non-dominated front and fronts are walked outward by
//! increasing the count.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::graph::path::Path;

/// Does `a` dominate `b` under minimisation?
///
/// `a` must be no worse in every objective and strictly better in one.
/// Equal vectors do not dominate each other.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    let at_least_as_good = a.iter().zip(b.iter()).all(|(x, y)| x <= y);
    let strictly_better = a.iter().zip(b.iter()).any(|(x, y)| x < y);
    at_least_as_good && strictly_better
}

/// Reset and recompute every path's domination count
pub fn calculate_domination_counts(colony: &mut [Path]) {
    let objectives: Vec<[f64; 3]> = colony.iter().map(Path::objectives).collect();
    let n = colony.len();
    let mut counts = vec![0usize; n];

    for i in 0..n {
        for j in (i + 1)..n {
            if dominates(&objectives[i], &objectives[j]) {
                counts[j] += 1;
            } else if dominates(&objectives[j], &objectives[i]) {
                counts[i] += 1;
            }
        }
    }

    for (path, count) in colony.iter_mut().zip(counts) {
        path.set_domination_count(count);
    }
}

/// Indices of the paths whose domination count is exactly `count`
pub fn paths_with_domination_count(colony: &[Path], count: usize) -> Vec<usize> {
    colony
        .iter()
        .enumerate()
        .filter(|(_, p)| p.domination_count() == count)
        .map(|(i, _)| i)
        .collect()
}

/// Walk fronts outward from count 0 and pick uniformly within the first
/// non-empty one
///
/// Returns `None` only for an empty colony.
pub fn select_representative<R: Rng>(colony: &[Path], rng: &mut R) -> Option<usize> {
    (0..colony.len())
        .map(|count| paths_with_domination_count(colony, count))
        .find(|front| !front.is_empty())
        .and_then(|front| front.choose(rng).copied())
}

pub mod prelude {
    pub use super::{
        calculate_domination_counts, dominates, paths_with_domination_count,
        select_representative,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::path::{PathFitness, PathRole};
    use rand::SeedableRng;

    fn scored(cbo: f64, nac: f64, atmr: f64) -> Path {
        let mut path = Path::new(PathRole::Design);
        path.set_fitness(PathFitness {
            cbo,
            elegance_nac: nac,
            elegance_atmr: atmr,
            ..PathFitness::default()
        });
        path
    }

    #[test]
    fn test_dominates() {
        assert!(dominates(&[0.1, 0.2, 0.3], &[0.1, 0.2, 0.4]));
        assert!(!dominates(&[0.1, 0.2, 0.3], &[0.1, 0.2, 0.3]));
        assert!(!dominates(&[0.1, 0.5, 0.3], &[0.2, 0.2, 0.3]));
    }

    #[test]
    fn test_counts_for_chain() {
        let mut colony = vec![
            scored(0.3, 3.0, 1.0),
            scored(0.1, 1.0, 0.5),
            scored(0.2, 2.0, 0.7),
        ];
        calculate_domination_counts(&mut colony);
        let counts: Vec<_> = colony.iter().map(Path::domination_count).collect();
        assert_eq!(counts, vec![2, 0, 1]);
        assert_eq!(paths_with_domination_count(&colony, 1), vec![2]);
    }

    #[test]
    fn test_counts_are_reset() {
        let mut colony = vec![scored(0.1, 1.0, 1.0), scored(0.2, 2.0, 2.0)];
        colony[0].set_domination_count(9);
        calculate_domination_counts(&mut colony);
        assert_eq!(colony[0].domination_count(), 0);
        assert_eq!(colony[1].domination_count(), 1);
    }

    #[test]
    fn test_representative_from_first_front() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut colony = vec![
            scored(0.5, 5.0, 5.0),
            scored(0.1, 2.0, 1.0),
            scored(0.2, 1.0, 1.0),
        ];
        calculate_domination_counts(&mut colony);
        for _ in 0..20 {
            let picked = select_representative(&colony, &mut rng).unwrap();
            assert!(picked == 1 || picked == 2);
        }
        assert_eq!(select_representative(&[], &mut rng), None);
    }

    #[test]
    fn test_representative_skips_empty_fronts() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        // counts forced so that front 0 is empty
        let mut colony = vec![scored(0.1, 1.0, 1.0), scored(0.2, 1.0, 1.0)];
        colony[0].set_domination_count(2);
        colony[1].set_domination_count(1);
        assert_eq!(select_representative(&colony, &mut rng), Some(1));
    }
}
