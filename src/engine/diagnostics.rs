//! Per-iteration statistics and run records

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ant::ConstructionMetrics;
use crate::daemon::stats::mean;
use crate::daemon::{best_in_colony, Objective};
use crate::graph::path::Path;
use crate::interactive::evaluator::IterationInformation;
use crate::interactive::weights::Weights;

/// Timing statistics
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    /// Time spent constructing the colony (ms)
    pub construction_ms: f64,
    /// Time spent scoring and ranking the colony (ms)
    pub evaluation_ms: f64,
    /// Time spent on evaporation and deposit (ms)
    pub update_ms: f64,
    /// Total iteration time, including any wait for the reviewer (ms)
    pub total_ms: f64,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_construction(mut self, duration: Duration) -> Self {
        self.construction_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    pub fn with_evaluation(mut self, duration: Duration) -> Self {
        self.evaluation_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    pub fn with_update(mut self, duration: Duration) -> Self {
        self.update_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    pub fn with_total(mut self, duration: Duration) -> Self {
        self.total_ms = duration.as_secs_f64() * 1000.0;
        self
    }
}

/// Objective values of one iteration's colony
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColonySummary {
    pub average_cbo: f64,
    pub best_cbo: f64,
    pub best_nac: f64,
    pub best_atmr: f64,
    /// Highest modularity in the colony
    pub best_modularity: f64,
}

impl ColonySummary {
    /// Summarise a scored colony; `None` if it is empty
    pub fn from_colony(colony: &[Path]) -> Option<Self> {
        let best = |objective| best_in_colony(colony, objective).map(|i| *colony[i].fitness());
        let cbos: Vec<f64> = colony.iter().map(Path::cbo).collect();

        Some(Self {
            average_cbo: mean(&cbos),
            best_cbo: best(Objective::Cbo)?.cbo,
            best_nac: best(Objective::Nac)?.elegance_nac,
            best_atmr: best(Objective::Atmr)?.elegance_atmr,
            best_modularity: best(Objective::Modularity)?.elegance_modularity,
        })
    }
}

/// Best value seen so far in a run, tracked per objective
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BestSoFar {
    pub cbo: f64,
    pub nac: f64,
    pub atmr: f64,
    pub modularity: f64,
}

impl BestSoFar {
    pub fn from_summary(summary: &ColonySummary) -> Self {
        Self {
            cbo: summary.best_cbo,
            nac: summary.best_nac,
            atmr: summary.best_atmr,
            modularity: summary.best_modularity,
        }
    }

    /// Fold in one iteration; each objective improves independently
    pub fn absorb(&mut self, summary: &ColonySummary) {
        self.cbo = self.cbo.min(summary.best_cbo);
        self.nac = self.nac.min(summary.best_nac);
        self.atmr = self.atmr.min(summary.best_atmr);
        self.modularity = self.modularity.max(summary.best_modularity);
    }
}

/// Statistics for a single iteration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationStats {
    pub iteration: usize,
    pub colony: ColonySummary,
    pub construction: ConstructionMetrics,
    /// Paths that deposited pheromone
    pub depositors: usize,
    /// Weights in force during the deposit
    pub weights: Weights,
    /// Whether a reviewer was consulted
    pub interacted: bool,
    pub timing: TimingStats,
}

/// One row of the interactive run record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractiveRecord {
    pub iteration: usize,
    pub best_so_far: BestSoFar,
    /// Weights after this iteration's interaction, if any
    pub weights: Weights,
    pub information: IterationInformation,
    pub runtime_secs: f64,
    /// Set on the iteration during which the reviewer asked to stop
    pub halted: bool,
}

/// Statistics over a whole run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub iterations: Vec<IterationStats>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stats: IterationStats) {
        self.iterations.push(stats);
    }

    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    pub fn last(&self) -> Option<&IterationStats> {
        self.iterations.last()
    }

    /// Mean total iteration time (ms)
    pub fn average_iteration_ms(&self) -> f64 {
        let totals: Vec<f64> = self.iterations.iter().map(|s| s.timing.total_ms).collect();
        mean(&totals)
    }

    /// Per-iteration best CBO, the convergence curve of the run
    pub fn best_cbo_history(&self) -> Vec<f64> {
        self.iterations.iter().map(|s| s.colony.best_cbo).collect()
    }

    /// Ants that needed a retry, summed over the run
    pub fn total_retries(&self) -> usize {
        self.iterations
            .iter()
            .map(|s| s.construction.ants_retried)
            .sum()
    }
}
