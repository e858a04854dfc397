//! Search controller, elitism, statistics and batch runs

pub mod batch;
pub mod diagnostics;
pub mod elitism;
pub mod search;

pub mod prelude {
    pub use super::batch::{BatchResults, BatchRunner, IterationAverages, RunSummary};
    pub use super::diagnostics::{
        BestSoFar, ColonySummary, InteractiveRecord, IterationStats, RunStats, TimingStats,
    };
    pub use super::elitism::EliteArchive;
    pub use super::search::{
        DesignSearch, SearchBuilder, SearchResult, StepResult, TerminationReason,
    };
}
