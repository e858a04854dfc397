//! Vertices an ant walks over

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::problem::DesignProblem;

/// Identity of an attribute or method, `0..number_of_elements`
///
/// Attributes are numbered first, then methods.
pub type ElementId = usize;

/// One step of a path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vertex {
    /// Synthetic start marker
    Nest,
    Attribute(ElementId),
    Method(ElementId),
    /// Closes the class opened since the previous marker
    EndOfClass,
}

impl Vertex {
    /// Element identity, if this vertex is an attribute or method
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Attribute(id) | Self::Method(id) => Some(*id),
            Self::Nest | Self::EndOfClass => None,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, Self::Attribute(_))
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Self::Method(_))
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nest => f.write_str("nest"),
            Self::Attribute(id) => write!(f, "a{}", id),
            Self::Method(id) => write!(f, "m{}", id),
            Self::EndOfClass => f.write_str("|"),
        }
    }
}

/// The fixed set of element vertices of a problem
///
/// Built once per run; identities never change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DesignGraph {
    names: Vec<String>,
    number_of_attributes: usize,
}

impl DesignGraph {
    pub fn new(problem: &DesignProblem) -> Self {
        let names = problem
            .attributes()
            .iter()
            .chain(problem.methods().iter())
            .cloned()
            .collect();
        Self {
            names,
            number_of_attributes: problem.number_of_attributes(),
        }
    }

    pub fn number_of_elements(&self) -> usize {
        self.names.len()
    }

    pub fn number_of_attributes(&self) -> usize {
        self.number_of_attributes
    }

    pub fn number_of_methods(&self) -> usize {
        self.names.len() - self.number_of_attributes
    }

    pub fn is_attribute(&self, id: ElementId) -> bool {
        id < self.number_of_attributes
    }

    /// Typed vertex for an element identity
    pub fn vertex(&self, id: ElementId) -> Vertex {
        if self.is_attribute(id) {
            Vertex::Attribute(id)
        } else {
            Vertex::Method(id)
        }
    }

    /// Every element vertex, attributes first
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        (0..self.names.len()).map(move |id| self.vertex(id))
    }

    /// Index into the use matrix row (methods) or column (attributes)
    pub fn local_index(&self, id: ElementId) -> usize {
        if self.is_attribute(id) {
            id
        } else {
            id - self.number_of_attributes
        }
    }

    /// Problem name of a vertex; markers get a fixed label
    pub fn name(&self, vertex: &Vertex) -> &str {
        match vertex {
            Vertex::Nest => "nest",
            Vertex::EndOfClass => "end of class",
            Vertex::Attribute(id) | Vertex::Method(id) => &self.names[*id],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemKind;

    #[test]
    fn test_attributes_numbered_first() {
        let problem = DesignProblem::from_partition(ProblemKind::Test, &[(2, 1), (1, 2)]).unwrap();
        let graph = DesignGraph::new(&problem);

        assert_eq!(graph.number_of_elements(), 6);
        assert_eq!(graph.number_of_attributes(), 3);
        assert_eq!(graph.number_of_methods(), 3);
        assert_eq!(graph.vertex(2), Vertex::Attribute(2));
        assert_eq!(graph.vertex(3), Vertex::Method(3));
        assert_eq!(graph.local_index(4), 1);
        assert_eq!(graph.name(&Vertex::Method(3)), "c0_method0");
        assert_eq!(graph.name(&Vertex::Nest), "nest");
    }

    #[test]
    fn test_vertex_element() {
        assert_eq!(Vertex::Attribute(4).element(), Some(4));
        assert_eq!(Vertex::EndOfClass.element(), None);
        assert!(Vertex::Method(1).is_method());
    }
}
