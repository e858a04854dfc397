//! Class freezing through pheromone reinforcement
//!
//! A frozen class is not pinned during construction. Instead every
//! method/attribute pair inside it is forced to an extreme pheromone value,
//! so ants almost always keep those elements together.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::table::PheromoneTable;
use crate::config::FREEZE_PHEROMONE;
use crate::graph::path::DesignClass;

/// Classes the designer asked to keep intact
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FreezeList {
    classes: Vec<DesignClass>,
}

impl FreezeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> &[DesignClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, class: &DesignClass) -> bool {
        let class = class.normalised();
        self.classes.iter().any(|c| *c == class)
    }

    /// Add a class; returns false if it was already frozen
    pub fn freeze(&mut self, class: &DesignClass) -> bool {
        if self.contains(class) {
            return false;
        }
        self.classes.push(class.normalised());
        true
    }

    /// Remove a class; returns false if it was not frozen
    pub fn unfreeze(&mut self, class: &DesignClass) -> bool {
        let class = class.normalised();
        let before = self.classes.len();
        self.classes.retain(|c| *c != class);
        self.classes.len() != before
    }

    /// Force every method/attribute pair of every frozen class to
    /// [`FREEZE_PHEROMONE`], symmetrically and unclamped
    pub fn reinforce(&self, table: &mut PheromoneTable) {
        for class in &self.classes {
            for &method in &class.methods {
                for &attribute in &class.attributes {
                    table.set_symmetric(method, attribute, FREEZE_PHEROMONE);
                }
            }
            debug!(
                attributes = class.attributes.len(),
                methods = class.methods.len(),
                "reinforced frozen class"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pheromone::table::ClampPolicy;

    fn class(attributes: Vec<usize>, methods: Vec<usize>) -> DesignClass {
        DesignClass {
            attributes,
            methods,
        }
    }

    #[test]
    fn test_freeze_is_order_insensitive() {
        let mut list = FreezeList::new();
        assert!(list.freeze(&class(vec![1, 0], vec![4])));
        assert!(!list.freeze(&class(vec![0, 1], vec![4])));
        assert_eq!(list.len(), 1);

        assert!(list.unfreeze(&class(vec![1, 0], vec![4])));
        assert!(!list.unfreeze(&class(vec![1, 0], vec![4])));
        assert!(list.is_empty());
    }

    #[test]
    fn test_reinforce_sets_method_attribute_pairs_only() {
        let mut table = PheromoneTable::new(6, 1.0, ClampPolicy::mmas()).unwrap();
        let mut list = FreezeList::new();
        list.freeze(&class(vec![0, 1], vec![4]));
        list.reinforce(&mut table);

        assert_eq!(table.get(4, 0), FREEZE_PHEROMONE);
        assert_eq!(table.get(0, 4), FREEZE_PHEROMONE);
        assert_eq!(table.get(1, 4), FREEZE_PHEROMONE);
        // attribute/attribute pairs untouched
        assert_eq!(table.get(0, 1), 1.0);
        assert_eq!(table.get(5, 4), 1.0);
    }
}
