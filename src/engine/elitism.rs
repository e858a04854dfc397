//! Replacement elitism
//!
//! The best path per active objective survives into the next iteration's
//! colony by overwriting a random slot.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ObjectiveSet;
use crate::daemon::{best_in_colony, Objective};
use crate::graph::path::Path;

/// Stack of at most one path per elitist objective (CBO, NAC)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EliteArchive {
    stack: Vec<Path>,
}

impl EliteArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn paths(&self) -> &[Path] {
        &self.stack
    }

    /// Rebuild from a scored colony
    pub fn update(&mut self, colony: &[Path], objectives: ObjectiveSet) {
        self.stack.clear();

        let mut capture = |objective| {
            if let Some(index) = best_in_colony(colony, objective) {
                self.stack.push(colony[index].clone());
            }
        };
        if objectives.cbo {
            capture(Objective::Cbo);
        }
        if objectives.nac {
            capture(Objective::Nac);
        }
    }

    /// Drain the archive into uniformly random colony slots
    ///
    /// Returns the number of paths re-inserted. The archive is empty
    /// afterwards.
    pub fn insert_into<R: Rng>(&mut self, colony: &mut [Path], rng: &mut R) -> usize {
        if colony.is_empty() {
            self.stack.clear();
            return 0;
        }

        let mut inserted = 0;
        while let Some(mut elite) = self.stack.pop() {
            elite.set_domination_count(0);
            let slot = rng.gen_range(0..colony.len());
            colony[slot] = elite;
            inserted += 1;
        }
        inserted
    }
}
