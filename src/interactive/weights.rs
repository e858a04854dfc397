//! Multi-objective deposit weights

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tolerance of the sum-to-one check
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Relative contribution of CBO, NAC and ATMR to a deposit
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub cbo: f64,
    pub nac: f64,
    pub atmr: f64,
}

/// Result of turning regression coefficients into weights
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeightAdaptation {
    /// Coefficients normalised into new weights
    Updated(Weights),
    /// A coefficient was exactly zero; fall back to the initial weights
    Reset,
    /// A coefficient was NaN; keep the current weights
    Unchanged,
}

impl Weights {
    pub fn new(cbo: f64, nac: f64, atmr: f64) -> Self {
        Self { cbo, nac, atmr }
    }

    /// 100% coupling
    pub fn cbo_only() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// 100% class-size balance
    pub fn nac_only() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    /// Equal share for every objective
    pub fn uniform() -> Self {
        Self::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
    }

    pub fn sum(&self) -> f64 {
        self.cbo + self.nac + self.atmr
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.cbo, self.nac, self.atmr]
    }

    pub fn has_nan(&self) -> bool {
        self.as_array().iter().any(|w| w.is_nan())
    }

    pub fn is_zero(&self) -> bool {
        self.as_array().iter().all(|&w| w == 0.0)
    }

    /// Non-negative and summing to one within [`WEIGHT_TOLERANCE`]
    pub fn is_normalised(&self) -> bool {
        self.as_array().iter().all(|&w| w >= 0.0)
            && (self.sum() - 1.0).abs() < WEIGHT_TOLERANCE
    }

    /// Sum check that tolerates degenerate weights
    ///
    /// NaN or all-zero weights pass; otherwise the weights must be
    /// normalised.
    pub fn check_sum(&self) -> bool {
        self.has_nan() || self.is_zero() || self.is_normalised()
    }

    /// Normalise absolute regression coefficients into weights
    ///
    /// The zero check runs before the NaN check.
    pub fn from_coefficients(coefficients: [f64; 3]) -> WeightAdaptation {
        if coefficients.iter().any(|&c| c == 0.0) {
            return WeightAdaptation::Reset;
        }
        if coefficients.iter().any(|c| c.is_nan()) {
            return WeightAdaptation::Unchanged;
        }

        let total: f64 = coefficients.iter().map(|c| c.abs()).sum();
        if !total.is_finite() {
            return WeightAdaptation::Unchanged;
        }

        let [cbo, nac, atmr] = coefficients.map(|c| c.abs() / total);
        WeightAdaptation::Updated(Self::new(cbo, nac, atmr))
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::cbo_only()
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(cbo: {:.4}, nac: {:.4}, atmr: {:.4})",
            self.cbo, self.nac, self.atmr
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_coefficients_normalises_absolute_values() {
        match Weights::from_coefficients([2.0, -1.0, 1.0]) {
            WeightAdaptation::Updated(w) => {
                assert_relative_eq!(w.cbo, 0.5);
                assert_relative_eq!(w.nac, 0.25);
                assert_relative_eq!(w.atmr, 0.25);
                assert!(w.is_normalised());
            }
            other => panic!("expected updated weights, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_coefficient_resets() {
        assert_eq!(
            Weights::from_coefficients([0.0, 0.3, 0.1]),
            WeightAdaptation::Reset
        );
        // zero wins over NaN
        assert_eq!(
            Weights::from_coefficients([0.0, f64::NAN, 0.1]),
            WeightAdaptation::Reset
        );
    }

    #[test]
    fn test_nan_coefficient_leaves_weights() {
        assert_eq!(
            Weights::from_coefficients([f64::NAN, 0.3, 0.1]),
            WeightAdaptation::Unchanged
        );
    }

    #[test]
    fn test_check_sum() {
        assert!(Weights::cbo_only().check_sum());
        assert!(Weights::uniform().check_sum());
        assert!(Weights::new(0.0, 0.0, 0.0).check_sum());
        assert!(Weights::new(f64::NAN, 0.4, 0.4).check_sum());
        assert!(!Weights::new(0.5, 0.4, 0.4).check_sum());
    }
}
