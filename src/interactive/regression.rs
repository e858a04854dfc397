//! Regression service turning designer evaluations into objective coefficients
//!
//! Each interaction adds one point observation `(cbo, nac, atmr) -> evaluation`.
//! The model is re-solved after every observation; with too little data the
//! coefficients are NaN, which callers treat as "insufficient data".

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Observations needed before the intercept model is determined
pub const MIN_OBSERVATIONS: usize = 4;

/// One designer evaluation of a design's objective values
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub cbo: f64,
    pub nac: f64,
    pub atmr: f64,
    pub evaluation: f64,
}

impl Observation {
    pub fn new(cbo: f64, nac: f64, atmr: f64, evaluation: f64) -> Self {
        Self {
            cbo,
            nac,
            atmr,
            evaluation,
        }
    }
}

/// Fitted coefficients and error metrics
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionFit {
    pub intercept: f64,
    /// Per-objective coefficients `[cbo, nac, atmr]`
    pub coefficients: [f64; 3],
    /// Mean absolute deviation of the fitted values
    pub mad: f64,
    /// Mean absolute percentage error of the fitted values
    pub mape: f64,
}

impl RegressionFit {
    /// A fit with every number NaN
    pub fn degenerate() -> Self {
        Self {
            intercept: f64::NAN,
            coefficients: [f64::NAN; 3],
            mad: f64::NAN,
            mape: f64::NAN,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.coefficients.iter().any(|c| c.is_nan())
    }
}

/// Pluggable regression over designer evaluations
pub trait RegressionModel: Send {
    /// Add one point observation to the dataset
    fn add_observation(&mut self, observation: Observation);

    /// Fit the model to all observations so far
    fn solve(&self) -> RegressionFit;

    /// Number of observations in the dataset
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordinary least squares with an intercept, solved via normal equations
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LeastSquaresRegression {
    observations: Vec<Observation>,
}

impl LeastSquaresRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }
}

impl RegressionModel for LeastSquaresRegression {
    fn add_observation(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    fn solve(&self) -> RegressionFit {
        let n = self.observations.len();
        if n < MIN_OBSERVATIONS {
            return RegressionFit::degenerate();
        }

        let x = DMatrix::from_fn(n, 4, |row, col| {
            let o = &self.observations[row];
            match col {
                0 => 1.0,
                1 => o.cbo,
                2 => o.nac,
                _ => o.atmr,
            }
        });
        let y = DVector::from_iterator(n, self.observations.iter().map(|o| o.evaluation));

        let xt = x.transpose();
        let normal = &xt * &x;
        let rhs = &xt * &y;

        let beta = match normal.lu().solve(&rhs) {
            Some(beta) if beta.iter().all(|b| b.is_finite()) => beta,
            _ => return RegressionFit::degenerate(),
        };

        let fitted = &x * &beta;
        let residuals: Vec<f64> = y.iter().zip(fitted.iter()).map(|(a, f)| a - f).collect();

        let mad = residuals.iter().map(|r| r.abs()).sum::<f64>() / n as f64;

        let (pct_sum, pct_count) = y
            .iter()
            .zip(residuals.iter())
            .filter(|(actual, _)| **actual != 0.0)
            .fold((0.0, 0usize), |(sum, count), (actual, r)| {
                (sum + (r / actual).abs(), count + 1)
            });
        let mape = if pct_count == 0 {
            f64::NAN
        } else {
            100.0 * pct_sum / pct_count as f64
        };

        RegressionFit {
            intercept: beta[0],
            coefficients: [beta[1], beta[2], beta[3]],
            mad,
            mape,
        }
    }

    fn len(&self) -> usize {
        self.observations.len()
    }
}
