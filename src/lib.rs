//! # aco-design
//!
//! Interactive multi-objective Ant Colony Optimisation for object-oriented
//! class design.
//!
//! Given the attributes and methods of a design problem and the matrix of
//! which method uses which attribute, ants partition the elements into a
//! fixed number of classes. Designs are scored on coupling (CBO), class-size
//! balance (NAC) and attribute/method ratio balance (ATMR); pheromone on
//! element pairs steers later ants towards well-scored groupings.
//!
//! ## Core Concepts
//!
//! - **Paths as designs**: an ant's walk over all element vertices, split
//!   into classes by end-of-class markers
//! - **Simple-ACO and MMAS**: every ant deposits, or one representative
//!   deposits with pheromone clamped to `[0.5, 3.5]`
//! - **Interactive weights**: designer evaluations drive a regression whose
//!   coefficients become the objective weights
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aco_design::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let problem = DesignProblem::from_partition(ProblemKind::Test, &[(3, 2), (2, 3)])?;
//!
//! let result = SearchBuilder::new()
//!     .problem(problem)
//!     .algorithm(Algorithm::Mmas)
//!     .number_of_iterations(200)
//!     .build()?
//!     .run(&mut rng)?;
//! ```

pub mod ant;
#[cfg(feature = "checkpoint")]
pub mod checkpoint;
pub mod config;
pub mod daemon;
pub mod engine;
pub mod error;
pub mod graph;
pub mod interactive;
pub mod pareto;
pub mod pheromone;
pub mod problem;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ant::prelude::*;
    #[cfg(feature = "checkpoint")]
    pub use crate::checkpoint::prelude::*;
    pub use crate::config::prelude::*;
    pub use crate::daemon::prelude::*;
    pub use crate::engine::prelude::*;
    pub use crate::error::*;
    pub use crate::graph::prelude::*;
    pub use crate::interactive::prelude::*;
    pub use crate::pareto::prelude::*;
    pub use crate::pheromone::prelude::*;
    pub use crate::problem::prelude::*;
}
