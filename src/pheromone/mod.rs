//! Pheromone model
//!
//! The [`PheromoneTable`](table::PheromoneTable) is the only state shared
//! between iterations. Each iteration derives an
//! [`AlphaTable`](alpha::AlphaTable) from it for construction, then
//! evaporates and deposits through [`operators`].

pub mod alpha;
pub mod freeze;
pub mod operators;
pub mod table;

pub mod prelude {
    pub use super::alpha::AlphaTable;
    pub use super::freeze::FreezeList;
    pub use super::operators::{
        calculate_delta, evaporate, lay_cohesion, lay_pheromone, DepositRule, PheromoneUpdater,
    };
    pub use super::table::{ClampPolicy, PheromoneTable};
}
