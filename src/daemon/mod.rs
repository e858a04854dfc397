//! Daemon actions: fitness evaluation of constructed paths
//!
//! A design path is grouped into classes at its end-of-class markers and
//! scored in one pass:
//!
//! - **CBO**: `1 - internal uses / total uses`, where an internal use is a
//!   method and an attribute in the same class with a use-matrix entry
//! - **NAC**: population standard deviation of class sizes
//! - **ATMR**: population standard deviation of attribute/method ratios over
//!   classes holding both kinds of element
//! - **Cohesion**: mean use density of those same classes
//! - **Modularity**: Newman modularity of the partition over the use graph

pub mod stats;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{invariant, AcoResult};
use crate::graph::path::{DesignClass, Path, PathFitness};
use crate::problem::DesignProblem;
use stats::{mean, population_std_dev};

/// Objective used to pick the best path of a colony
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
    /// Minimised
    Cbo,
    /// Minimised
    Nac,
    /// Minimised
    Atmr,
    /// Maximised
    Modularity,
}

impl Objective {
    fn value(&self, path: &Path) -> f64 {
        let fitness = path.fitness();
        match self {
            Self::Cbo => fitness.cbo,
            Self::Nac => fitness.elegance_nac,
            Self::Atmr => fitness.elegance_atmr,
            Self::Modularity => fitness.elegance_modularity,
        }
    }

    fn is_better(&self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Modularity => candidate > incumbent,
            _ => candidate < incumbent,
        }
    }
}

/// Index of the best path for `objective`; the earliest wins ties
pub fn best_in_colony(colony: &[Path], objective: Objective) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, path) in colony.iter().enumerate() {
        let value = objective.value(path);
        match best {
            Some((_, incumbent)) if !objective.is_better(value, incumbent) => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Number of used (method, attribute) pairs inside one class
fn internal_uses(class: &DesignClass, problem: &DesignProblem) -> usize {
    let attributes = problem.number_of_attributes();
    class
        .methods
        .iter()
        .map(|&m| {
            class
                .attributes
                .iter()
                .filter(|&&a| problem.uses(m - attributes, a))
                .count()
        })
        .sum()
}

/// Use density of a class with both kinds of element
fn class_cohesion(class: &DesignClass, internal: usize) -> Option<f64> {
    class.has_both().then(|| {
        internal as f64 / (class.attributes.len() * class.methods.len()) as f64
    })
}

/// Sum of use-graph degrees of a class's elements
fn class_degree(class: &DesignClass, problem: &DesignProblem) -> usize {
    let attributes = problem.number_of_attributes();
    let attribute_degree: usize = class
        .attributes
        .iter()
        .map(|&a| problem.attribute_degree(a))
        .sum();
    let method_degree: usize = class
        .methods
        .iter()
        .map(|&m| problem.method_degree(m - attributes))
        .sum();
    attribute_degree + method_degree
}

/// Score a whole-design path
///
/// Fails with an invariant violation when the path does not partition the
/// problem's elements into exactly its declared number of classes.
pub fn evaluate_design(path: &Path, problem: &DesignProblem) -> AcoResult<PathFitness> {
    let classes = path.classes();
    if classes.len() != problem.number_of_classes() {
        return Err(invariant(format!(
            "path has {} classes, problem declares {}",
            classes.len(),
            problem.number_of_classes()
        )));
    }
    if !path.is_permutation_of(problem.number_of_elements()) {
        return Err(invariant(
            "path does not place every attribute and method exactly once",
        ));
    }

    let total_uses = problem.number_of_uses() as f64;
    let mut internal_total = 0usize;
    let mut sizes = Vec::with_capacity(classes.len());
    let mut ratios = Vec::with_capacity(classes.len());
    let mut densities = Vec::with_capacity(classes.len());
    let mut modularity = 0.0;

    for class in &classes {
        let internal = internal_uses(class, problem);
        internal_total += internal;
        sizes.push(class.len() as f64);
        ratios.extend(class.ratio());
        densities.extend(class_cohesion(class, internal));

        let degree = class_degree(class, problem) as f64;
        modularity += internal as f64 / total_uses - (degree / (2.0 * total_uses)).powi(2);
    }

    let fitness = PathFitness {
        cbo: 1.0 - internal_total as f64 / total_uses,
        elegance_nac: population_std_dev(&sizes),
        elegance_atmr: population_std_dev(&ratios),
        cohesion: mean(&densities),
        elegance_modularity: modularity,
    };

    if !(0.0..=1.0).contains(&fitness.cbo) {
        return Err(invariant(format!("CBO {} outside [0, 1]", fitness.cbo)));
    }

    Ok(fitness)
}

/// Score a class path by its cohesion alone
pub fn evaluate_class(path: &Path, problem: &DesignProblem) -> PathFitness {
    let densities: Vec<f64> = path
        .classes()
        .iter()
        .filter_map(|class| class_cohesion(class, internal_uses(class, problem)))
        .collect();
    PathFitness {
        cohesion: mean(&densities),
        ..PathFitness::default()
    }
}

/// Score every design path of a colony in place
#[cfg(feature = "parallel")]
pub fn evaluate_colony(colony: &mut [Path], problem: &DesignProblem) -> AcoResult<()> {
    colony.par_iter_mut().try_for_each(|path| {
        let fitness = evaluate_design(path, problem)?;
        path.set_fitness(fitness);
        Ok(())
    })
}

/// Score every design path of a colony in place (sequential fallback)
#[cfg(not(feature = "parallel"))]
pub fn evaluate_colony(colony: &mut [Path], problem: &DesignProblem) -> AcoResult<()> {
    for path in colony.iter_mut() {
        let fitness = evaluate_design(path, problem)?;
        path.set_fitness(fitness);
    }
    Ok(())
}

pub mod prelude {
    pub use super::{best_in_colony, evaluate_class, evaluate_colony, evaluate_design, Objective};
}
