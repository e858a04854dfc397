//! Evaporation and deposit

use rand::Rng;
use tracing::trace;

use super::table::PheromoneTable;
use crate::config::{
    AcoConfig, Algorithm, ObjectiveSet, PheromoneUpdate, SoObjective, ELITIST_FACTOR,
};
use crate::daemon::{best_in_colony, Objective};
use crate::graph::path::{Path, PathFitness};
use crate::interactive::weights::Weights;
use crate::pareto::select_representative;
use crate::problem::ProblemKind;

/// Evaporate the whole table once
///
/// Uniform evaporation multiplies every entry by `1 - rho`. Elitist
/// evaporation scales that factor per entry by its distance from the
/// midpoint of the current value range.
pub fn evaporate(table: &mut PheromoneTable, rho: f64, elitism: bool) {
    if !elitism {
        table.evaporate(rho);
        return;
    }

    let lowest = table.min();
    let highest = table.max();
    let midpoint = lowest + (highest - lowest) / 2.0;
    table.apply(|p| p * elitist_multiplier(p, lowest, midpoint, rho));
}

/// Per-entry multiplier of elitist evaporation
///
/// Entries above the midpoint decay less, entries below decay more, by up
/// to [`ELITIST_FACTOR`] at the extremes.
pub fn elitist_multiplier(value: f64, lowest: f64, midpoint: f64, rho: f64) -> f64 {
    let factor = 1.0 - rho;
    let span = midpoint - lowest;
    if span <= 0.0 {
        return factor;
    }

    if value > midpoint {
        factor * (1.0 + (value - midpoint) / span * ELITIST_FACTOR)
    } else if value < midpoint {
        factor * (1.0 - (midpoint - value) / span * ELITIST_FACTOR)
    } else {
        factor
    }
}

/// Cap `value` at `scale` and map it into `[0, 1]` the way deposits do
pub fn maximised_elegance(value: f64, scale: f64) -> f64 {
    let capped = value.min(scale);
    let normalised = (scale - capped) / scale;
    1.0 - normalised
}

/// Deposit magnitude for a whole-design path
///
/// Disabled objectives contribute nothing to the weighted sum.
pub fn calculate_delta(
    fitness: &PathFitness,
    weights: &Weights,
    objectives: ObjectiveSet,
    kind: ProblemKind,
    mu: f64,
) -> f64 {
    let maximised_cbo = if objectives.cbo { 1.0 - fitness.cbo } else { 0.0 };
    let maximised_nac = if objectives.nac {
        maximised_elegance(fitness.elegance_nac, kind.nac_scale())
    } else {
        0.0
    };
    let maximised_atmr = if objectives.atmr {
        maximised_elegance(fitness.elegance_atmr, kind.atmr_scale())
    } else {
        0.0
    };

    let raw = weights.cbo * maximised_cbo
        + weights.nac * maximised_nac
        + weights.atmr * maximised_atmr;
    raw.powf(mu)
}

/// Add `delta` along every edge of a design path
pub fn lay_pheromone(table: &mut PheromoneTable, path: &Path, delta: f64) {
    for (from, to) in path.edges() {
        table.deposit(from, to, delta);
    }
}

/// Add a class path's cohesion along its edges, ignoring the clamp policy
pub fn lay_cohesion(table: &mut PheromoneTable, path: &Path) {
    let cohesion = path.fitness().cohesion;
    for (from, to) in path.edges() {
        let value = table.get(from, to) + cohesion;
        table.set_symmetric(from, to, value);
    }
}

/// Which paths deposit each iteration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepositRule {
    /// Simple-ACO: every design path, with the run's weights
    EveryAnt,
    /// MMAS: one path from the first non-empty Pareto front
    ParetoRepresentative,
    /// MMAS: the colony's best path for one objective, weighted on it alone
    BestOf(SoObjective),
}

impl DepositRule {
    pub fn from_config(config: &AcoConfig) -> Self {
        match (config.algorithm, config.pheromone_update) {
            (Algorithm::SimpleAco, _) => Self::EveryAnt,
            (Algorithm::Mmas, PheromoneUpdate::ParetoBased) => Self::ParetoRepresentative,
            (Algorithm::Mmas, PheromoneUpdate::SingleObjective(objective)) => {
                Self::BestOf(objective)
            }
        }
    }
}

/// Applies one iteration's deposits
#[derive(Clone, Debug)]
pub struct PheromoneUpdater {
    rule: DepositRule,
    objectives: ObjectiveSet,
    kind: ProblemKind,
    mu: f64,
}

impl PheromoneUpdater {
    pub fn new(config: &AcoConfig, kind: ProblemKind) -> Self {
        Self {
            rule: DepositRule::from_config(config),
            objectives: config.objectives,
            kind,
            mu: config.mu,
        }
    }

    pub fn rule(&self) -> DepositRule {
        self.rule
    }

    /// Deposit for a scored colony; returns the number of depositing paths
    ///
    /// `partial` holds class paths, which only deposit under Simple-ACO.
    pub fn update<R: Rng>(
        &self,
        table: &mut PheromoneTable,
        colony: &[Path],
        partial: &[Path],
        weights: &Weights,
        rng: &mut R,
    ) -> usize {
        match self.rule {
            DepositRule::EveryAnt => {
                for path in colony {
                    self.lay(table, path, weights);
                }
                for path in partial {
                    lay_cohesion(table, path);
                }
                colony.len() + partial.len()
            }
            DepositRule::ParetoRepresentative => match select_representative(colony, rng) {
                Some(index) => {
                    self.lay(table, &colony[index], weights);
                    1
                }
                None => 0,
            },
            DepositRule::BestOf(objective) => {
                let (objective, local) = match objective {
                    SoObjective::Cbo => (Objective::Cbo, Weights::cbo_only()),
                    SoObjective::Nac => (Objective::Nac, Weights::nac_only()),
                };
                match best_in_colony(colony, objective) {
                    Some(index) => {
                        self.lay(table, &colony[index], &local);
                        1
                    }
                    None => 0,
                }
            }
        }
    }

    fn lay(&self, table: &mut PheromoneTable, path: &Path, weights: &Weights) {
        let delta = calculate_delta(path.fitness(), weights, self.objectives, self.kind, self.mu);
        trace!(delta, cbo = path.cbo(), "depositing along path");
        lay_pheromone(table, path, delta);
    }
}
