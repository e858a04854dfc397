//! Transition desirabilities for one construction phase

use nalgebra::DMatrix;

use super::table::PheromoneTable;
use crate::graph::vertex::ElementId;

/// Pheromone raised to `alpha`, recomputed once per iteration
#[derive(Clone, Debug, PartialEq)]
pub struct AlphaTable {
    values: DMatrix<f64>,
}

impl AlphaTable {
    pub fn from_pheromone(table: &PheromoneTable, alpha: f64) -> Self {
        Self {
            values: table.matrix().map(|p| p.powf(alpha)),
        }
    }

    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    /// Unnormalised desirability of moving from `from` to `to`
    pub fn get(&self, from: ElementId, to: ElementId) -> f64 {
        self.values[(from, to)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pheromone::table::ClampPolicy;
    use approx::assert_relative_eq;

    #[test]
    fn test_entries_raised_to_alpha() {
        let mut table = PheromoneTable::new(3, 1.0, ClampPolicy::Unbounded).unwrap();
        table.set_symmetric(0, 1, 4.0);

        let alpha = AlphaTable::from_pheromone(&table, 1.5);
        assert_eq!(alpha.size(), 3);
        assert_relative_eq!(alpha.get(0, 1), 8.0);
        assert_relative_eq!(alpha.get(1, 0), 8.0);
        assert_relative_eq!(alpha.get(2, 2), 1.0);
    }
}
