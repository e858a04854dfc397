//! Vertex and path model
//!
//! Attributes and methods of a [`DesignProblem`](crate::problem::DesignProblem)
//! become element vertices numbered `0..n`, attributes first. A [`Path`] is
//! the nest followed by each class's elements, closed by an end-of-class
//! marker.

pub mod path;
pub mod vertex;

pub mod prelude {
    pub use super::path::{DesignClass, Path, PathFitness, PathRole};
    pub use super::vertex::{DesignGraph, ElementId, Vertex};
}
