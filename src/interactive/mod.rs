//! Human-in-the-loop weight adaptation
//!
//! In interactive mode the search pauses at a fitness-proportionate
//! interval and shows one Pareto-optimal design to a reviewer. The
//! reviewer's 0-100 evaluation becomes a regression observation over the
//! design's objective values, and the normalised regression coefficients
//! become the deposit weights from then on.
//!
//! # Example
//!
//! ```rust,ignore
//! use aco_design::prelude::*;
//!
//! let mut search = SearchBuilder::new()
//!     .problem(problem)
//!     .mode(Mode::Interactive)
//!     .pheromone_update(PheromoneUpdate::ParetoBased)
//!     .build()?;
//!
//! let mut reviewer = |request: &EvaluationRequest| {
//!     present_to_designer(request);
//!     EvaluationResponse::evaluation(read_score())
//! };
//! let result = search.run_with_reviewer(&mut rng, &mut reviewer)?;
//! ```

pub mod evaluator;
pub mod interval;
pub mod regression;
pub mod reviewer;
pub mod weights;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::evaluator::{
        ArchivedDesign, DesignerFeedback, EvaluationRequest, EvaluationResponse,
        IterationInformation, NamedClass, MAX_EVALUATION,
    };
    pub use super::interval::InteractionInterval;
    pub use super::regression::{
        LeastSquaresRegression, Observation, RegressionFit, RegressionModel,
    };
    pub use super::reviewer::{ChannelReviewer, DesignReviewer, ReviewerHandle};
    pub use super::weights::{WeightAdaptation, Weights};
}
