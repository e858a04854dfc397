//! Independent batch runs
//!
//! Every run owns its generator, pheromone table and weights; only the
//! problem and configuration are shared, read-only.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::diagnostics::ColonySummary;
use super::search::{SearchBuilder, SearchResult};
use crate::config::{AcoConfig, Mode, DEFAULT_NUMBER_OF_RUNS};
use crate::daemon::stats::mean;
use crate::error::{AcoError, AcoResult};
use crate::problem::DesignProblem;

/// Per-iteration series of one run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run: usize,
    pub seed: u64,
    /// One entry per iteration
    pub series: Vec<ColonySummary>,
    /// Lowest CBO of the run
    pub best_cbo: f64,
    pub average_iteration_ms: f64,
    /// Ants that needed a retry, summed over the run
    pub retries: usize,
}

impl RunSummary {
    pub fn from_result(run: usize, seed: u64, result: &SearchResult) -> Self {
        let series: Vec<ColonySummary> =
            result.stats.iterations.iter().map(|s| s.colony).collect();
        Self {
            run,
            seed,
            best_cbo: result.best_so_far.map_or(f64::NAN, |b| b.cbo),
            average_iteration_ms: result.stats.average_iteration_ms(),
            retries: result.stats.total_retries(),
            series,
        }
    }
}

/// Iteration values averaged across runs
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationAverages {
    pub iteration: usize,
    pub average_cbo: f64,
    pub best_cbo: f64,
    pub best_nac: f64,
    pub best_atmr: f64,
    pub best_modularity: f64,
}

/// Everything a batch experiment produced
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchResults {
    pub config: AcoConfig,
    pub runs: Vec<RunSummary>,
    pub averages: Vec<IterationAverages>,
}

impl BatchResults {
    /// Average every run's series iteration by iteration
    pub fn aggregate(config: AcoConfig, runs: Vec<RunSummary>) -> Self {
        let length = runs.iter().map(|r| r.series.len()).min().unwrap_or(0);
        let averages = (0..length)
            .map(|iteration| {
                let column = |f: fn(&ColonySummary) -> f64| -> f64 {
                    let values: Vec<f64> = runs.iter().map(|r| f(&r.series[iteration])).collect();
                    mean(&values)
                };
                IterationAverages {
                    iteration,
                    average_cbo: column(|s| s.average_cbo),
                    best_cbo: column(|s| s.best_cbo),
                    best_nac: column(|s| s.best_nac),
                    best_atmr: column(|s| s.best_atmr),
                    best_modularity: column(|s| s.best_modularity),
                }
            })
            .collect();

        Self {
            config,
            runs,
            averages,
        }
    }

    /// Mean of the per-run lowest CBO
    pub fn mean_best_cbo(&self) -> f64 {
        let values: Vec<f64> = self.runs.iter().map(|r| r.best_cbo).collect();
        mean(&values)
    }

    /// Write the results as JSON, replacing the file only once complete
    #[cfg(feature = "checkpoint")]
    pub fn write_json(&self, path: impl AsRef<std::path::Path>) -> AcoResult<()> {
        crate::checkpoint::save_json(self, path)
    }

    #[cfg(feature = "checkpoint")]
    pub fn read_json(path: impl AsRef<std::path::Path>) -> AcoResult<Self> {
        crate::checkpoint::load_json(path)
    }
}

/// Runs the same search many times from independent seeds
#[derive(Clone, Debug)]
pub struct BatchRunner {
    config: AcoConfig,
    problem: Arc<DesignProblem>,
    runs: usize,
    seed: u64,
}

impl BatchRunner {
    pub fn new(config: AcoConfig, problem: impl Into<Arc<DesignProblem>>) -> Self {
        Self {
            config,
            problem: problem.into(),
            runs: DEFAULT_NUMBER_OF_RUNS,
            seed: 0,
        }
    }

    pub fn runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Master seed from which every run's seed is drawn
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Execute all runs; the first failing run aborts the batch
    pub fn run(&self) -> AcoResult<BatchResults> {
        if self.config.mode != Mode::Batch {
            return Err(AcoError::Configuration(
                "batch runner requires batch mode".into(),
            ));
        }
        if self.runs == 0 {
            return Err(AcoError::Configuration(
                "number of runs must be positive".into(),
            ));
        }
        self.config.validate()?;

        let mut master = StdRng::seed_from_u64(self.seed);
        let seeds: Vec<(usize, u64)> = (0..self.runs).map(|run| (run, master.gen())).collect();

        info!(
            runs = self.runs,
            iterations = self.config.number_of_iterations,
            algorithm = %self.config.algorithm,
            "batch started"
        );
        let summaries = self.execute(&seeds)?;
        let results = BatchResults::aggregate(self.config.clone(), summaries);
        info!(mean_best_cbo = results.mean_best_cbo(), "batch complete");
        Ok(results)
    }

    #[cfg(feature = "parallel")]
    fn execute(&self, seeds: &[(usize, u64)]) -> AcoResult<Vec<RunSummary>> {
        seeds
            .par_iter()
            .map(|&(run, seed)| self.single_run(run, seed))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn execute(&self, seeds: &[(usize, u64)]) -> AcoResult<Vec<RunSummary>> {
        seeds
            .iter()
            .map(|&(run, seed)| self.single_run(run, seed))
            .collect()
    }

    fn single_run(&self, run: usize, seed: u64) -> AcoResult<RunSummary> {
        let mut search = SearchBuilder::new()
            .config(self.config.clone())
            .problem(Arc::clone(&self.problem))
            .build()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let result = search.run(&mut rng)?;

        let summary = RunSummary::from_result(run, seed, &result);
        info!(
            run,
            best_cbo = summary.best_cbo,
            average_iteration_ms = summary.average_iteration_ms,
            "run complete"
        );
        Ok(summary)
    }
}
