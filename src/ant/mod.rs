//! Solution construction
//!
//! An ant walks the element vertices once, emitting an end-of-class marker
//! whenever the class-size target drawn for this construction is reached.
//! The first element of each class is picked uniformly; each following one
//! by roulette over the alpha table from the current vertex.
//!
//! With constraint handling on, a path with a class lacking attributes or
//! methods is regenerated, up to the attempt cap. Hitting the cap is not an
//! error: the last path is kept and reported as a retry.

pub mod partition;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::graph::path::{Path, PathRole};
use crate::graph::vertex::{DesignGraph, ElementId};
use crate::pheromone::alpha::AlphaTable;

/// Result of one ant's construction
#[derive(Clone, Debug)]
pub struct ConstructionOutcome {
    pub path: Path,
    /// Paths generated, including the kept one
    pub attempts: usize,
    /// Whether the kept path passed the structural check
    pub valid: bool,
}

impl ConstructionOutcome {
    /// Did the ant have to regenerate its path?
    pub fn needed_retry(&self) -> bool {
        self.attempts > 1
    }
}

/// Retry figures of one colony
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructionMetrics {
    /// Ants that regenerated at least once
    pub ants_retried: usize,
    /// Mean attempts among those ants; 0 when none retried
    pub average_attempts: f64,
    /// Ants whose kept path is still invalid
    pub invalid_paths: usize,
}

impl ConstructionMetrics {
    pub fn from_outcomes(outcomes: &[ConstructionOutcome]) -> Self {
        let retried: Vec<usize> = outcomes
            .iter()
            .filter(|o| o.needed_retry())
            .map(|o| o.attempts)
            .collect();
        let average_attempts = if retried.is_empty() {
            0.0
        } else {
            retried.iter().sum::<usize>() as f64 / retried.len() as f64
        };
        Self {
            ants_retried: retried.len(),
            average_attempts,
            invalid_paths: outcomes.iter().filter(|o| !o.valid).count(),
        }
    }
}

/// Does every class hold at least one attribute and one method?
pub fn is_valid(path: &Path) -> bool {
    path.classes().iter().all(|class| class.has_both())
}

/// Builds design paths over a fixed alpha table
#[derive(Clone, Copy, Debug)]
pub struct Ant<'a> {
    graph: &'a DesignGraph,
    alpha: &'a AlphaTable,
    number_of_classes: usize,
    constraint_handling: bool,
    max_attempts: usize,
}

impl<'a> Ant<'a> {
    pub fn new(
        graph: &'a DesignGraph,
        alpha: &'a AlphaTable,
        number_of_classes: usize,
        constraint_handling: bool,
        max_attempts: usize,
    ) -> Self {
        Self {
            graph,
            alpha,
            number_of_classes,
            constraint_handling,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Construct one path, regenerating invalid ones when constraint
    /// handling is on
    pub fn construct<R: Rng>(&self, rng: &mut R) -> ConstructionOutcome {
        let mut path = self.generate(rng);
        let mut attempts = 1;
        let mut valid = is_valid(&path);

        if self.constraint_handling {
            while !valid && attempts < self.max_attempts {
                path = self.generate(rng);
                attempts += 1;
                valid = is_valid(&path);
            }
            if !valid {
                warn!(attempts, "construction cap reached, keeping invalid path");
            }
        }

        ConstructionOutcome {
            path,
            attempts,
            valid,
        }
    }

    /// One stochastic walk over every element vertex
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Path {
        let n = self.graph.number_of_elements();
        let sizes = partition::class_sizes(n, self.number_of_classes, rng);
        let mut unvisited: Vec<ElementId> = (0..n).collect();
        let mut path = Path::new(PathRole::Design);

        for size in sizes {
            let first = unvisited.swap_remove(rng.gen_range(0..unvisited.len()));
            path.push(self.graph.vertex(first));
            let mut current = first;

            for _ in 1..size {
                let next = unvisited.swap_remove(self.choose_next(current, &unvisited, rng));
                path.push(self.graph.vertex(next));
                current = next;
            }
            path.end_class();
        }

        path
    }

    /// Roulette over `alpha(current, candidate)`; uniform if the weights
    /// are unusable
    fn choose_next<R: Rng>(&self, current: ElementId, candidates: &[ElementId], rng: &mut R) -> usize {
        let weights = candidates.iter().map(|&c| self.alpha.get(current, c));
        match WeightedIndex::new(weights) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..candidates.len()),
        }
    }
}

/// Construct a whole colony
///
/// Each ant gets its own generator seeded from `rng`, so the colony is the
/// same with or without the `parallel` feature.
pub fn construct_colony<R: Rng>(
    ant: &Ant<'_>,
    number_of_ants: usize,
    rng: &mut R,
) -> Vec<ConstructionOutcome> {
    let seeds: Vec<u64> = (0..number_of_ants).map(|_| rng.gen()).collect();
    build_from_seeds(ant, &seeds)
}

#[cfg(feature = "parallel")]
fn build_from_seeds(ant: &Ant<'_>, seeds: &[u64]) -> Vec<ConstructionOutcome> {
    seeds
        .par_iter()
        .map(|&seed| ant.construct(&mut StdRng::seed_from_u64(seed)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn build_from_seeds(ant: &Ant<'_>, seeds: &[u64]) -> Vec<ConstructionOutcome> {
    seeds
        .iter()
        .map(|&seed| ant.construct(&mut StdRng::seed_from_u64(seed)))
        .collect()
}

pub mod prelude {
    pub use super::{construct_colony, is_valid, Ant, ConstructionMetrics, ConstructionOutcome};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FREEZE_PHEROMONE;
    use crate::pheromone::table::{ClampPolicy, PheromoneTable};
    use crate::problem::{DesignProblem, ProblemKind};

    fn setup(classes: &[(usize, usize)]) -> (DesignProblem, DesignGraph, PheromoneTable) {
        let problem = DesignProblem::from_partition(ProblemKind::Test, classes).unwrap();
        let graph = DesignGraph::new(&problem);
        let table =
            PheromoneTable::new(graph.number_of_elements(), 1.0, ClampPolicy::Unbounded).unwrap();
        (problem, graph, table)
    }

    #[test]
    fn test_generated_path_is_partition() {
        let mut rng = StdRng::seed_from_u64(42);
        let (problem, graph, table) = setup(&[(3, 2), (2, 3), (1, 1)]);
        let alpha = AlphaTable::from_pheromone(&table, 1.5);
        let ant = Ant::new(&graph, &alpha, problem.number_of_classes(), false, 50);

        for _ in 0..50 {
            let path = ant.generate(&mut rng);
            assert_eq!(path.number_of_classes(), 3);
            assert!(path.is_permutation_of(graph.number_of_elements()));
            assert!(path.classes().iter().all(|c| !c.is_empty()));
        }
    }

    #[test]
    fn test_constraint_handling_yields_valid_paths() {
        let mut rng = StdRng::seed_from_u64(7);
        let (problem, graph, table) = setup(&[(2, 2), (2, 2)]);
        let alpha = AlphaTable::from_pheromone(&table, 1.5);
        let ant = Ant::new(&graph, &alpha, problem.number_of_classes(), true, 50);

        for _ in 0..20 {
            let outcome = ant.construct(&mut rng);
            assert!(outcome.valid);
            assert!(is_valid(&outcome.path));
            assert!(outcome.attempts <= 50);
        }
    }

    #[test]
    fn test_impossible_constraints_stop_at_cap() {
        let mut rng = StdRng::seed_from_u64(3);
        // one method cannot serve two classes
        let problem = DesignProblem::new(
            ProblemKind::Test,
            2,
            vec!["a".into(), "b".into(), "c".into()],
            vec!["m".into()],
            vec![vec![true, false, true]],
        )
        .unwrap();
        let graph = DesignGraph::new(&problem);
        let table = PheromoneTable::new(4, 1.0, ClampPolicy::Unbounded).unwrap();
        let alpha = AlphaTable::from_pheromone(&table, 1.5);
        let ant = Ant::new(&graph, &alpha, 2, true, 50);

        let outcome = ant.construct(&mut rng);
        assert_eq!(outcome.attempts, 50);
        assert!(!outcome.valid);
        assert!(outcome.needed_retry());
        assert!(outcome.path.is_permutation_of(4));
    }

    #[test]
    fn test_without_constraint_handling_single_attempt() {
        let mut rng = StdRng::seed_from_u64(3);
        let (problem, graph, table) = setup(&[(1, 1), (1, 1), (1, 1)]);
        let alpha = AlphaTable::from_pheromone(&table, 1.5);
        let ant = Ant::new(&graph, &alpha, problem.number_of_classes(), false, 50);
        assert!(ant.construct(&mut rng).attempts == 1);
    }

    #[test]
    fn test_frozen_pair_stays_together() {
        let mut rng = StdRng::seed_from_u64(11);
        let (problem, graph, mut table) = setup(&[(1, 1), (1, 1)]);
        // attribute 0 with method 2, attribute 1 with method 3
        table.set_symmetric(0, 2, FREEZE_PHEROMONE);
        table.set_symmetric(1, 3, FREEZE_PHEROMONE);
        let alpha = AlphaTable::from_pheromone(&table, 1.5);
        let ant = Ant::new(&graph, &alpha, problem.number_of_classes(), true, 50);

        let together = (0..50)
            .map(|_| ant.construct(&mut rng).path)
            .filter(|p| {
                p.classes()
                    .iter()
                    .any(|c| c.contains(0) && c.contains(2))
            })
            .count();
        assert_eq!(together, 50);
    }

    #[test]
    fn test_colony_is_reproducible() {
        let (problem, graph, table) = setup(&[(2, 2), (2, 1)]);
        let alpha = AlphaTable::from_pheromone(&table, 1.5);
        let ant = Ant::new(&graph, &alpha, problem.number_of_classes(), true, 50);

        let first = construct_colony(&ant, 8, &mut StdRng::seed_from_u64(5));
        let second = construct_colony(&ant, 8, &mut StdRng::seed_from_u64(5));
        let paths = |o: &[ConstructionOutcome]| o.iter().map(|c| c.path.clone()).collect::<Vec<_>>();
        assert_eq!(paths(&first), paths(&second));
    }

    #[test]
    fn test_metrics() {
        let path = Path::new(PathRole::Design);
        let outcome = |attempts, valid| ConstructionOutcome {
            path: path.clone(),
            attempts,
            valid,
        };
        let metrics =
            ConstructionMetrics::from_outcomes(&[outcome(1, true), outcome(3, true), outcome(50, false)]);
        assert_eq!(metrics.ants_retried, 2);
        assert_eq!(metrics.average_attempts, 26.5);
        assert_eq!(metrics.invalid_paths, 1);
    }
}
