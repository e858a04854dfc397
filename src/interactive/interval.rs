//! Fitness-proportionate interaction interval

use serde::{Deserialize, Serialize};

/// Decides when the next interaction checkpoint is due
///
/// The threshold is `max(1, round(best_cbo^2 * constant))` iterations: the
/// lower the coupling found so far, the more often the designer is asked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionInterval {
    constant: f64,
    counter: usize,
}

impl InteractionInterval {
    pub fn new(constant: f64) -> Self {
        Self {
            constant,
            counter: 0,
        }
    }

    /// Iterations between checkpoints for the given best CBO
    pub fn threshold(&self, best_cbo: f64) -> usize {
        let rounded = (best_cbo * best_cbo * self.constant).round();
        if rounded.is_finite() && rounded >= 1.0 {
            rounded as usize
        } else {
            1
        }
    }

    /// Called once per iteration; true when a checkpoint is due
    ///
    /// The counter is incremented while below the threshold and reset when
    /// the checkpoint fires.
    pub fn is_due(&mut self, best_cbo: f64) -> bool {
        if self.counter < self.threshold(best_cbo) {
            self.counter += 1;
            false
        } else {
            self.counter = 0;
            true
        }
    }

    pub fn counter(&self) -> usize {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        let interval = InteractionInterval::new(200.0);
        assert_eq!(interval.threshold(0.5), 50);
        assert_eq!(interval.threshold(0.05), 1);
        assert_eq!(interval.threshold(0.0), 1);
        assert_eq!(interval.threshold(1.0), 200);
    }

    #[test]
    fn test_due_every_threshold_plus_one_iterations() {
        let mut interval = InteractionInterval::new(200.0);
        // threshold 2 for cbo 0.1
        let pattern: Vec<bool> = (0..6).map(|_| interval.is_due(0.1)).collect();
        assert_eq!(pattern, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_minimum_threshold() {
        let mut interval = InteractionInterval::new(200.0);
        let pattern: Vec<bool> = (0..4).map(|_| interval.is_due(0.0)).collect();
        assert_eq!(pattern, vec![false, true, false, true]);
    }
}
