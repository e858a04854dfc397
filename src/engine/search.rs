//! Step-based ACO design search
//!
//! One iteration constructs a colony, re-inserts last iteration's elites,
//! scores and ranks the colony, evaporates and deposits pheromone, and then
//! (interactive mode only, when the interval is due) pauses for a reviewer.
//! The pause is the only suspension point: [`DesignSearch::step`] yields a
//! [`StepResult::NeedsEvaluation`] and the same iteration resumes once
//! [`DesignSearch::provide_response`] has been called.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::diagnostics::{
    BestSoFar, ColonySummary, InteractiveRecord, IterationStats, RunStats, TimingStats,
};
use super::elitism::EliteArchive;
use crate::ant::{construct_colony, Ant, ConstructionMetrics};
use crate::config::{AcoConfig, Algorithm, Mode, ObjectiveSet, PheromoneUpdate};
use crate::daemon::{evaluate_class, evaluate_colony};
use crate::error::{invariant, AcoError, AcoResult};
use crate::graph::path::{DesignClass, Path};
use crate::graph::vertex::DesignGraph;
use crate::interactive::evaluator::{
    ArchivedDesign, DesignerFeedback, EvaluationRequest, EvaluationResponse,
    IterationInformation, NamedClass,
};
use crate::interactive::interval::InteractionInterval;
use crate::interactive::regression::{LeastSquaresRegression, Observation, RegressionModel};
use crate::interactive::reviewer::DesignReviewer;
use crate::interactive::weights::{WeightAdaptation, Weights};
use crate::pareto::{calculate_domination_counts, select_representative};
use crate::pheromone::alpha::AlphaTable;
use crate::pheromone::freeze::FreezeList;
use crate::pheromone::operators::{evaporate, PheromoneUpdater};
use crate::pheromone::table::{ClampPolicy, PheromoneTable};
use crate::problem::DesignProblem;

/// Result of a step
#[derive(Debug)]
pub enum StepResult {
    /// The search is paused until a response is provided
    NeedsEvaluation(Box<EvaluationRequest>),

    /// Iteration complete, ready to continue
    IterationComplete {
        /// Zero-based index of the iteration that completed
        iteration: usize,
        /// Best CBO in that iteration's colony
        best_cbo: f64,
        /// Whether a reviewer was consulted
        interacted: bool,
    },

    /// Search terminated
    Complete(Box<SearchResult>),
}

/// Why a search stopped
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The configured number of iterations ran
    IterationLimit,
    /// The reviewer asked to stop
    Stopped,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IterationLimit => f.write_str("iteration limit reached"),
            Self::Stopped => f.write_str("stopped by reviewer"),
        }
    }
}

/// Final result of a search
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    /// Lowest-CBO path found in any iteration
    pub best_path: Option<Path>,
    pub best_so_far: Option<BestSoFar>,
    pub stats: RunStats,
    /// One row per iteration; empty for batch runs
    pub interactive_records: Vec<InteractiveRecord>,
    /// Designs the reviewer archived
    pub archive: Vec<ArchivedDesign>,
    pub freeze_list: FreezeList,
    pub final_weights: Weights,
    /// Iterations completed
    pub iterations: usize,
    /// Interactions answered
    pub interactions: usize,
    pub termination_reason: TerminationReason,
}

impl SearchResult {
    pub fn halted(&self) -> bool {
        self.termination_reason == TerminationReason::Stopped
    }

    /// Persist the run record as JSON
    #[cfg(feature = "checkpoint")]
    pub fn write_json(&self, path: impl AsRef<std::path::Path>) -> AcoResult<()> {
        crate::checkpoint::save_json(self, path)
    }
}

/// Work done so far in the current iteration
#[derive(Clone, Debug)]
struct IterationProgress {
    started: Instant,
    summary: ColonySummary,
    construction: ConstructionMetrics,
    depositors: usize,
    weights: Weights,
    timing: TimingStats,
}

/// Internal state machine
enum SearchState {
    /// Ready to start the next iteration
    Constructing,
    /// Paused at the interaction checkpoint
    AwaitingEvaluation {
        request: Box<EvaluationRequest>,
        progress: IterationProgress,
    },
    /// Response received; the iteration still needs recording
    Reporting {
        progress: IterationProgress,
        information: IterationInformation,
    },
    Terminated {
        reason: TerminationReason,
    },
}

/// Interactive multi-objective ACO over class designs
///
/// # Example
///
/// ```rust,ignore
/// use aco_design::prelude::*;
///
/// let mut search = SearchBuilder::new()
///     .problem(problem)
///     .mode(Mode::Interactive)
///     .build()?;
///
/// loop {
///     match search.step(&mut rng)? {
///         StepResult::NeedsEvaluation(request) => {
///             let response = ask_designer(&request);
///             search.provide_response(response)?;
///         }
///         StepResult::IterationComplete { .. } => {}
///         StepResult::Complete(result) => break,
///     }
/// }
/// ```
pub struct DesignSearch {
    config: AcoConfig,
    problem: Arc<DesignProblem>,
    graph: DesignGraph,
    pheromone: PheromoneTable,
    updater: PheromoneUpdater,
    weights: Weights,
    regression: Box<dyn RegressionModel>,
    interval: InteractionInterval,
    freeze_list: FreezeList,
    elite: EliteArchive,
    archive: Vec<ArchivedDesign>,
    colony: Vec<Path>,
    partial: Vec<Path>,
    state: SearchState,
    iteration: usize,
    /// One-based; the number of the next interaction
    interaction: usize,
    best_so_far: Option<BestSoFar>,
    best_path: Option<Path>,
    previous_information: IterationInformation,
    stats: RunStats,
    records: Vec<InteractiveRecord>,
    halt_requested: bool,
}

impl DesignSearch {
    /// Create a search; the configuration is validated first
    pub fn new(
        config: AcoConfig,
        problem: Arc<DesignProblem>,
        regression: Box<dyn RegressionModel>,
    ) -> AcoResult<Self> {
        config.validate()?;

        let graph = DesignGraph::new(&problem);
        let pheromone = PheromoneTable::new(
            graph.number_of_elements(),
            config.initial_pheromone,
            ClampPolicy::from(config.algorithm),
        )?;
        let updater = PheromoneUpdater::new(&config, problem.kind());
        let weights = config.starting_weights();
        let interval = InteractionInterval::new(config.interactive_interval_constant);

        info!(
            problem = %problem.kind(),
            algorithm = %config.algorithm,
            elements = graph.number_of_elements(),
            classes = problem.number_of_classes(),
            "design search created"
        );

        Ok(Self {
            config,
            problem,
            graph,
            pheromone,
            updater,
            weights,
            regression,
            interval,
            freeze_list: FreezeList::new(),
            elite: EliteArchive::new(),
            archive: Vec::new(),
            colony: Vec::new(),
            partial: Vec::new(),
            state: SearchState::Constructing,
            iteration: 0,
            interaction: 1,
            best_so_far: None,
            best_path: None,
            previous_information: IterationInformation::default(),
            stats: RunStats::new(),
            records: Vec::new(),
            halt_requested: false,
        })
    }

    pub fn config(&self) -> &AcoConfig {
        &self.config
    }

    pub fn problem(&self) -> &DesignProblem {
        &self.problem
    }

    pub fn pheromone(&self) -> &PheromoneTable {
        &self.pheromone
    }

    pub fn weights(&self) -> Weights {
        self.weights
    }

    pub fn freeze_list(&self) -> &FreezeList {
        &self.freeze_list
    }

    pub fn best_so_far(&self) -> Option<&BestSoFar> {
        self.best_so_far.as_ref()
    }

    /// Iterations completed so far
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn is_awaiting_evaluation(&self) -> bool {
        matches!(self.state, SearchState::AwaitingEvaluation { .. })
    }

    /// Advance the search one step
    ///
    /// While a request is pending, the same request is yielded again.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> AcoResult<StepResult> {
        loop {
            match &self.state {
                SearchState::Constructing => {
                    if self.iteration >= self.config.number_of_iterations {
                        self.state = SearchState::Terminated {
                            reason: TerminationReason::IterationLimit,
                        };
                        continue;
                    }

                    let progress = self.run_iteration(rng)?;

                    if self.checkpoint_due() {
                        if let Some(request) = self.create_request(rng) {
                            self.state = SearchState::AwaitingEvaluation {
                                request: Box::new(request.clone()),
                                progress,
                            };
                            return Ok(StepResult::NeedsEvaluation(Box::new(request)));
                        }
                    }

                    return Ok(self.finish_iteration(progress, None));
                }

                SearchState::AwaitingEvaluation { request, .. } => {
                    return Ok(StepResult::NeedsEvaluation(request.clone()));
                }

                SearchState::Reporting { .. } => {
                    let state = std::mem::replace(&mut self.state, SearchState::Constructing);
                    if let SearchState::Reporting {
                        progress,
                        information,
                    } = state
                    {
                        return Ok(self.finish_iteration(progress, Some(information)));
                    }
                }

                SearchState::Terminated { reason } => {
                    info!(
                        iterations = self.iteration,
                        interactions = self.interaction - 1,
                        reason = %reason,
                        "design search complete"
                    );
                    return Ok(StepResult::Complete(Box::new(SearchResult {
                        best_path: self.best_path.clone(),
                        best_so_far: self.best_so_far,
                        stats: self.stats.clone(),
                        interactive_records: self.records.clone(),
                        archive: self.archive.clone(),
                        freeze_list: self.freeze_list.clone(),
                        final_weights: self.weights,
                        iterations: self.iteration,
                        interactions: self.interaction - 1,
                        termination_reason: reason.clone(),
                    })));
                }
            }
        }
    }

    /// Feed the reviewer's answer to the pending request
    ///
    /// An invalid response is rejected and the request stays pending.
    pub fn provide_response(&mut self, response: EvaluationResponse) -> AcoResult<()> {
        let SearchState::AwaitingEvaluation { request, .. } = &self.state else {
            return Err(AcoError::NotAwaitingEvaluation);
        };
        response.validate(request)?;

        let state = std::mem::replace(&mut self.state, SearchState::Constructing);
        let SearchState::AwaitingEvaluation { request, progress } = state else {
            return Err(AcoError::NotAwaitingEvaluation);
        };

        let information = match response {
            EvaluationResponse::Evaluated(feedback) => self.apply_feedback(&request, feedback)?,
            EvaluationResponse::Skip => {
                debug!(interaction = self.interaction, "interaction skipped");
                IterationInformation::default()
            }
            EvaluationResponse::Stop => {
                info!(iteration = self.iteration, "reviewer asked to stop");
                self.halt_requested = true;
                IterationInformation::default()
            }
        };

        self.interaction += 1;
        self.previous_information = information;
        self.state = SearchState::Reporting {
            progress,
            information,
        };
        Ok(())
    }

    /// Run a batch search to completion
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> AcoResult<SearchResult> {
        if self.config.mode == Mode::Interactive {
            return Err(AcoError::Configuration(
                "interactive searches need a reviewer, use run_with_reviewer".into(),
            ));
        }

        loop {
            match self.step(rng)? {
                StepResult::Complete(result) => return Ok(*result),
                StepResult::IterationComplete { .. } => {}
                StepResult::NeedsEvaluation(_) => {
                    return Err(invariant("batch search paused for evaluation"));
                }
            }
        }
    }

    /// Run to completion, answering every checkpoint with `reviewer`
    pub fn run_with_reviewer<R, V>(&mut self, rng: &mut R, reviewer: &mut V) -> AcoResult<SearchResult>
    where
        R: Rng,
        V: DesignReviewer + ?Sized,
    {
        loop {
            match self.step(rng)? {
                StepResult::NeedsEvaluation(request) => {
                    let response = reviewer.review(&request);
                    self.provide_response(response)?;
                }
                StepResult::IterationComplete { .. } => {}
                StepResult::Complete(result) => return Ok(*result),
            }
        }
    }

    /// Construct, elitist insert, evaluate, evaporate and deposit
    fn run_iteration<R: Rng>(&mut self, rng: &mut R) -> AcoResult<IterationProgress> {
        let started = Instant::now();

        self.freeze_list.reinforce(&mut self.pheromone);
        let alpha = AlphaTable::from_pheromone(&self.pheromone, self.config.alpha);
        let ant = Ant::new(
            &self.graph,
            &alpha,
            self.problem.number_of_classes(),
            self.config.constraint_handling,
            self.config.max_construction_attempts,
        );
        let outcomes = construct_colony(&ant, self.config.number_of_ants, rng);
        let construction = ConstructionMetrics::from_outcomes(&outcomes);
        self.colony = outcomes.into_iter().map(|o| o.path).collect();
        let construction_time = started.elapsed();

        if self.config.replacement_elitism {
            self.elite.insert_into(&mut self.colony, rng);
        }

        let evaluation_start = Instant::now();
        evaluate_colony(&mut self.colony, &self.problem)?;
        calculate_domination_counts(&mut self.colony);
        if self.config.partial_solutions {
            self.partial = self.class_paths();
        }
        let evaluation_time = evaluation_start.elapsed();

        let update_start = Instant::now();
        evaporate(
            &mut self.pheromone,
            self.config.rho,
            self.config.evaporation_elitism,
        );
        let weights = self.weights;
        let depositors =
            self.updater
                .update(&mut self.pheromone, &self.colony, &self.partial, &weights, rng);
        let update_time = update_start.elapsed();

        let summary = ColonySummary::from_colony(&self.colony)
            .ok_or_else(|| invariant("colony is empty after construction"))?;
        self.track_best(&summary);

        Ok(IterationProgress {
            started,
            summary,
            construction,
            depositors,
            weights,
            timing: TimingStats::new()
                .with_construction(construction_time)
                .with_evaluation(evaluation_time)
                .with_update(update_time),
        })
    }

    /// Scored per-class partial paths of the current colony
    fn class_paths(&self) -> Vec<Path> {
        self.colony
            .iter()
            .flat_map(Path::class_paths)
            .map(|mut class| {
                let fitness = evaluate_class(&class, &self.problem);
                class.set_fitness(fitness);
                class
            })
            .collect()
    }

    fn track_best(&mut self, summary: &ColonySummary) {
        self.best_so_far
            .get_or_insert_with(|| BestSoFar::from_summary(summary))
            .absorb(summary);

        let improved = self
            .best_path
            .as_ref()
            .map_or(true, |best| summary.best_cbo < best.cbo());
        if improved {
            self.best_path = self
                .colony
                .iter()
                .find(|p| p.cbo() == summary.best_cbo)
                .cloned();
        }
    }

    fn checkpoint_due(&mut self) -> bool {
        if self.config.mode != Mode::Interactive {
            return false;
        }
        let best_cbo = self.best_so_far.map_or(1.0, |b| b.cbo);
        self.interval.is_due(best_cbo)
    }

    /// Build a request around one path of the first non-empty Pareto front
    fn create_request<R: Rng>(&self, rng: &mut R) -> Option<EvaluationRequest> {
        let index = select_representative(&self.colony, rng)?;
        let path = self.colony[index].clone();
        let named = |classes: &[DesignClass]| -> Vec<NamedClass> {
            classes
                .iter()
                .map(|c| NamedClass::from_class(c, &self.graph))
                .collect()
        };

        Some(EvaluationRequest {
            design_label: self.config.design_label.clone(),
            classes: named(&path.classes()),
            path,
            use_table: self.problem.use_table(),
            freeze_list: named(self.freeze_list.classes()),
            iteration: self.iteration,
            interaction: self.interaction,
            previous: self.previous_information,
            archive: self.archive.clone(),
        })
    }

    /// Regression, weight adaptation and freeze/unfreeze/archive actions
    fn apply_feedback(
        &mut self,
        request: &EvaluationRequest,
        feedback: DesignerFeedback,
    ) -> AcoResult<IterationInformation> {
        let fitness = request.path.fitness();
        self.regression.add_observation(Observation::new(
            fitness.cbo,
            fitness.elegance_nac,
            fitness.elegance_atmr,
            f64::from(feedback.evaluation),
        ));
        let fit = self.regression.solve();

        match Weights::from_coefficients(fit.coefficients) {
            WeightAdaptation::Updated(weights) => {
                if !weights.check_sum() {
                    return Err(invariant(format!("adapted weights {} do not sum to 1", weights)));
                }
                info!(interaction = self.interaction, weights = %weights, "weights adapted");
                self.weights = weights;
            }
            WeightAdaptation::Reset => {
                warn!(
                    interaction = self.interaction,
                    "zero regression coefficient, weights reset to initial values"
                );
                self.weights = self.config.initial_weights;
            }
            WeightAdaptation::Unchanged => {
                warn!(
                    observations = self.regression.len(),
                    "regression has insufficient data, weights unchanged"
                );
            }
        }

        let classes = request.path.classes();
        let mut class_frozen = false;
        for &index in &feedback.freeze {
            class_frozen |= self.freeze_list.freeze(&classes[index]);
        }

        let released: Vec<_> = feedback
            .unfreeze
            .iter()
            .filter_map(|&index| self.freeze_list.classes().get(index).cloned())
            .collect();
        let mut class_unfrozen = false;
        for class in &released {
            class_unfrozen |= self.freeze_list.unfreeze(class);
        }

        if feedback.archive {
            self.archive.push(ArchivedDesign {
                iteration: self.iteration,
                interaction: self.interaction,
                evaluation: feedback.evaluation,
                path: request.path.clone(),
            });
        }

        let finite = |value: f64| value.is_finite().then_some(value);
        Ok(IterationInformation {
            designer_evaluation: Some(feedback.evaluation),
            mad: finite(fit.mad),
            mape: finite(fit.mape),
            archived: feedback.archive,
            class_frozen,
            class_unfrozen,
        })
    }

    /// Record the iteration, rebuild the elite archive and clear the colony
    fn finish_iteration(
        &mut self,
        progress: IterationProgress,
        information: Option<IterationInformation>,
    ) -> StepResult {
        let elapsed = progress.started.elapsed();
        let interacted = information.is_some();

        self.stats.record(IterationStats {
            iteration: self.iteration,
            colony: progress.summary,
            construction: progress.construction,
            depositors: progress.depositors,
            weights: progress.weights,
            interacted,
            timing: progress.timing.with_total(elapsed),
        });

        if self.config.mode == Mode::Interactive {
            if let Some(best_so_far) = self.best_so_far {
                self.records.push(InteractiveRecord {
                    iteration: self.iteration,
                    best_so_far,
                    weights: self.weights,
                    information: information.unwrap_or_default(),
                    runtime_secs: elapsed.as_secs_f64(),
                    halted: self.halt_requested,
                });
            }
        }

        if self.config.replacement_elitism {
            self.elite.update(&self.colony, self.config.objectives);
        }
        self.colony.clear();
        self.partial.clear();

        debug!(
            iteration = self.iteration,
            best_cbo = progress.summary.best_cbo,
            average_cbo = progress.summary.average_cbo,
            retried = progress.construction.ants_retried,
            depositors = progress.depositors,
            "iteration complete"
        );

        let result = StepResult::IterationComplete {
            iteration: self.iteration,
            best_cbo: progress.summary.best_cbo,
            interacted,
        };

        self.iteration += 1;
        if self.halt_requested {
            self.state = SearchState::Terminated {
                reason: TerminationReason::Stopped,
            };
        }
        result
    }
}

/// Builder for [`DesignSearch`]
#[derive(Default)]
pub struct SearchBuilder {
    config: AcoConfig,
    problem: Option<Arc<DesignProblem>>,
    regression: Option<Box<dyn RegressionModel>>,
}

impl SearchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Problem instance to design for (required)
    pub fn problem(mut self, problem: impl Into<Arc<DesignProblem>>) -> Self {
        self.problem = Some(problem.into());
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: AcoConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the algorithm, switching `rho` to that variant's preset
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.algorithm = algorithm;
        self.config.rho = algorithm.default_rho();
        self
    }

    pub fn pheromone_update(mut self, update: PheromoneUpdate) -> Self {
        self.config.pheromone_update = update;
        self
    }

    pub fn objectives(mut self, objectives: ObjectiveSet) -> Self {
        self.config.objectives = objectives;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn number_of_ants(mut self, ants: usize) -> Self {
        self.config.number_of_ants = ants;
        self
    }

    pub fn number_of_iterations(mut self, iterations: usize) -> Self {
        self.config.number_of_iterations = iterations;
        self
    }

    pub fn rho(mut self, rho: f64) -> Self {
        self.config.rho = rho;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.config.alpha = alpha;
        self
    }

    pub fn mu(mut self, mu: f64) -> Self {
        self.config.mu = mu;
        self
    }

    pub fn evaporation_elitism(mut self, enabled: bool) -> Self {
        self.config.evaporation_elitism = enabled;
        self
    }

    pub fn replacement_elitism(mut self, enabled: bool) -> Self {
        self.config.replacement_elitism = enabled;
        self
    }

    pub fn constraint_handling(mut self, enabled: bool) -> Self {
        self.config.constraint_handling = enabled;
        self
    }

    pub fn partial_solutions(mut self, enabled: bool) -> Self {
        self.config.partial_solutions = enabled;
        self
    }

    pub fn initial_weights(mut self, weights: Weights) -> Self {
        self.config.initial_weights = weights;
        self
    }

    pub fn batch_weights(mut self, weights: Weights) -> Self {
        self.config.batch_weights = weights;
        self
    }

    pub fn interactive_interval_constant(mut self, constant: f64) -> Self {
        self.config.interactive_interval_constant = constant;
        self
    }

    pub fn design_label(mut self, label: impl Into<String>) -> Self {
        self.config.design_label = label.into();
        self
    }

    /// Regression service for interactive weight adaptation; least squares
    /// by default
    pub fn regression(mut self, regression: Box<dyn RegressionModel>) -> Self {
        self.regression = Some(regression);
        self
    }

    pub fn build(self) -> AcoResult<DesignSearch> {
        let problem = self
            .problem
            .ok_or_else(|| AcoError::Configuration("problem instance required".into()))?;
        let regression = self
            .regression
            .unwrap_or_else(|| Box::new(LeastSquaresRegression::new()));
        DesignSearch::new(self.config, problem, regression)
    }
}
