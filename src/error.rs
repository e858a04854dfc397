//! Error types for aco-design
//!
//! This module defines all error types used throughout the library.
//!
//! Construction non-convergence and degenerate regressions are not errors:
//! the first is recorded as a metric, the second as a logged warning.

use thiserror::Error;

/// Top-level error type for design search operations
#[derive(Debug, Error)]
pub enum AcoError {
    /// Invalid configuration, detected before any iteration runs
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Unknown design problem identifier
    #[error("Unknown design problem: {0}")]
    UnknownProblem(String),

    /// Unknown algorithm, pheromone update or objective name
    #[error("Unknown algorithm variant: {0}")]
    UnknownAlgorithm(String),

    /// A search invariant was broken; the run cannot continue
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Reviewer response rejected (e.g. evaluation outside 0..=100)
    #[error("Invalid reviewer response: {0}")]
    InvalidResponse(String),

    /// A response was provided while no evaluation was pending
    #[error("No evaluation is pending")]
    NotAwaitingEvaluation,

    /// IO error while writing results
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AcoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for design search operations
pub type AcoResult<T> = Result<T, AcoError>;

/// Shorthand for raising an [`AcoError::InvariantViolation`]
pub(crate) fn invariant(message: impl Into<String>) -> AcoError {
    AcoError::InvariantViolation(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AcoError::Configuration("rho must lie in [0, 1)".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: rho must lie in [0, 1)");

        let err = AcoError::UnknownProblem("7".to_string());
        assert_eq!(err.to_string(), "Unknown design problem: 7");

        let err = invariant("detected 4 classes, expected 5");
        assert_eq!(
            err.to_string(),
            "Invariant violation: detected 4 classes, expected 5"
        );
    }

    #[test]
    fn test_from_serde_error() {
        let parse: Result<u32, _> = serde_json::from_str("not json");
        let err: AcoError = parse.unwrap_err().into();
        assert!(matches!(err, AcoError::Serialization(_)));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AcoError = io.into();
        assert!(matches!(err, AcoError::Io(_)));
        assert_eq!(err.to_string(), "IO error: missing");
    }
}
