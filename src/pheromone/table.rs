//! Symmetric pheromone matrix

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::config::{Algorithm, MMAS_PHEROMONE_MAXIMUM, MMAS_PHEROMONE_MINIMUM};
use crate::error::{AcoError, AcoResult};
use crate::graph::vertex::ElementId;

/// Bounds applied to entries touched by a deposit
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClampPolicy {
    /// No bounds (Simple-ACO)
    Unbounded,
    /// Clamp into `[min, max]` (MMAS)
    Bounded { min: f64, max: f64 },
}

impl ClampPolicy {
    /// The `[0.5, 3.5]` interval of MAX-MIN Ant System
    pub fn mmas() -> Self {
        Self::Bounded {
            min: MMAS_PHEROMONE_MINIMUM,
            max: MMAS_PHEROMONE_MAXIMUM,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Self::Unbounded => value,
            Self::Bounded { min, max } => value.clamp(min, max),
        }
    }
}

impl From<Algorithm> for ClampPolicy {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::SimpleAco => Self::Unbounded,
            Algorithm::Mmas => Self::mmas(),
        }
    }
}

/// Pheromone intensity between every pair of element vertices
///
/// Created once per run and never resized. Deposits are symmetric and pass
/// through the table's [`ClampPolicy`]; plain `set` does not.
#[derive(Clone, Debug, PartialEq)]
pub struct PheromoneTable {
    values: DMatrix<f64>,
    clamp: ClampPolicy,
}

impl PheromoneTable {
    /// A `size` x `size` table filled with `initial`
    pub fn new(size: usize, initial: f64, clamp: ClampPolicy) -> AcoResult<Self> {
        if size == 0 {
            return Err(AcoError::Configuration(
                "pheromone table needs at least one vertex".into(),
            ));
        }
        if !initial.is_finite() || initial <= 0.0 {
            return Err(AcoError::Configuration(format!(
                "initial pheromone must be positive and finite, got {}",
                initial
            )));
        }
        Ok(Self {
            values: DMatrix::from_element(size, size, initial),
            clamp,
        })
    }

    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    pub fn clamp_policy(&self) -> ClampPolicy {
        self.clamp
    }

    pub fn get(&self, i: ElementId, j: ElementId) -> f64 {
        self.values[(i, j)]
    }

    /// Overwrite one entry
    pub fn set(&mut self, i: ElementId, j: ElementId, value: f64) {
        self.values[(i, j)] = value;
    }

    /// Overwrite `(i, j)` and `(j, i)`
    pub fn set_symmetric(&mut self, i: ElementId, j: ElementId, value: f64) {
        self.values[(i, j)] = value;
        self.values[(j, i)] = value;
    }

    /// Add `amount` to `(i, j)`, clamp, and mirror the result to `(j, i)`
    pub fn deposit(&mut self, i: ElementId, j: ElementId, amount: f64) {
        let value = self.clamp.apply(self.values[(i, j)] + amount);
        self.set_symmetric(i, j, value);
    }

    /// Multiply every entry by `1 - rho`
    pub fn evaporate(&mut self, rho: f64) {
        self.values *= 1.0 - rho;
    }

    /// Replace every entry with `f(entry)`
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        self.values.apply(|v| *v = f(*v));
    }

    pub fn min(&self) -> f64 {
        self.values.min()
    }

    pub fn max(&self) -> f64 {
        self.values.max()
    }

    /// Row-major copy of the entries
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.size();
        (0..n).all(|i| {
            (i + 1..n).all(|j| (self.values[(i, j)] - self.values[(j, i)]).abs() <= tolerance)
        })
    }

    pub(crate) fn matrix(&self) -> &DMatrix<f64> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(PheromoneTable::new(0, 1.0, ClampPolicy::Unbounded).is_err());
        assert!(PheromoneTable::new(3, 0.0, ClampPolicy::Unbounded).is_err());
        assert!(PheromoneTable::new(3, f64::NAN, ClampPolicy::Unbounded).is_err());
    }

    #[test]
    fn test_evaporate_is_scalar_multiply() {
        let mut table = PheromoneTable::new(4, 2.0, ClampPolicy::Unbounded).unwrap();
        table.set_symmetric(1, 2, 3.0);
        table.evaporate(0.1);
        assert_relative_eq!(table.get(0, 0), 1.8);
        assert_relative_eq!(table.get(2, 1), 2.7);
    }

    #[test]
    fn test_unbounded_deposit_is_symmetric() {
        let mut table = PheromoneTable::new(3, 1.0, ClampPolicy::Unbounded).unwrap();
        table.deposit(0, 2, 5.0);
        assert_relative_eq!(table.get(0, 2), 6.0);
        assert_relative_eq!(table.get(2, 0), 6.0);
        assert!(table.is_symmetric(0.0));
    }

    #[test]
    fn test_mmas_deposit_clamps() {
        let mut table = PheromoneTable::new(3, 1.0, ClampPolicy::mmas()).unwrap();
        table.deposit(0, 1, 10.0);
        assert_relative_eq!(table.get(1, 0), MMAS_PHEROMONE_MAXIMUM);

        table.set(1, 2, 0.1);
        table.deposit(1, 2, 0.0);
        assert_relative_eq!(table.get(1, 2), MMAS_PHEROMONE_MINIMUM);
        assert_relative_eq!(table.get(2, 1), MMAS_PHEROMONE_MINIMUM);
    }

    #[test]
    fn test_min_max_and_rows() {
        let mut table = PheromoneTable::new(2, 1.0, ClampPolicy::Unbounded).unwrap();
        table.set(0, 1, 4.0);
        assert_eq!(table.min(), 1.0);
        assert_eq!(table.max(), 4.0);
        assert_eq!(table.to_rows(), vec![vec![1.0, 4.0], vec![1.0, 1.0]]);
        assert!(!table.is_symmetric(1e-9));
    }
}
