//! Request and response types of the interaction checkpoint
//!
//! At a checkpoint the search hands one representative design to the
//! reviewer as an [`EvaluationRequest`] and waits for an
//! [`EvaluationResponse`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AcoError, AcoResult};
use crate::graph::path::{DesignClass, Path};
use crate::graph::vertex::{DesignGraph, Vertex};

/// Highest evaluation a designer may give
pub const MAX_EVALUATION: u32 = 100;

/// One class with element names, for display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedClass {
    pub attributes: Vec<String>,
    pub methods: Vec<String>,
}

impl NamedClass {
    pub fn from_class(class: &DesignClass, graph: &DesignGraph) -> Self {
        let names = |ids: &[usize], attribute: bool| -> Vec<String> {
            ids.iter()
                .map(|&id| {
                    let vertex = if attribute {
                        Vertex::Attribute(id)
                    } else {
                        Vertex::Method(id)
                    };
                    graph.name(&vertex).to_string()
                })
                .collect()
        };
        Self {
            attributes: names(&class.attributes, true),
            methods: names(&class.methods, false),
        }
    }
}

/// Outcome flags and regression errors of one interaction
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IterationInformation {
    /// Evaluation given at this iteration, if any
    pub designer_evaluation: Option<u32>,
    /// Mean absolute deviation of the regression after this evaluation
    pub mad: Option<f64>,
    /// Mean absolute percentage error of the regression
    pub mape: Option<f64>,
    pub archived: bool,
    pub class_frozen: bool,
    pub class_unfrozen: bool,
}

/// A design the designer chose to keep
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchivedDesign {
    pub iteration: usize,
    pub interaction: usize,
    pub evaluation: u32,
    pub path: Path,
}

/// Everything the presentation layer needs to show one design
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub design_label: String,
    /// The representative path under review
    pub path: Path,
    /// The path's classes with element names
    pub classes: Vec<NamedClass>,
    /// Attributes used by each method, keyed by method name
    pub use_table: BTreeMap<String, Vec<String>>,
    /// Classes currently frozen, by element name
    pub freeze_list: Vec<NamedClass>,
    /// Zero-based iteration index
    pub iteration: usize,
    /// One-based interaction counter
    pub interaction: usize,
    /// Information recorded at the previous interaction
    pub previous: IterationInformation,
    /// Designs archived so far
    pub archive: Vec<ArchivedDesign>,
}

impl EvaluationRequest {
    pub fn number_of_classes(&self) -> usize {
        self.classes.len()
    }
}

/// A designer's verdict on the displayed design
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignerFeedback {
    /// Evaluation in `0..=100`
    pub evaluation: u32,
    /// Indices of displayed classes to freeze
    pub freeze: Vec<usize>,
    /// Indices into the request's freeze list to release
    pub unfreeze: Vec<usize>,
    /// Keep the displayed design in the archive
    pub archive: bool,
}

impl DesignerFeedback {
    pub fn new(evaluation: u32) -> Self {
        Self {
            evaluation,
            ..Self::default()
        }
    }

    pub fn freeze(mut self, class: usize) -> Self {
        self.freeze.push(class);
        self
    }

    pub fn unfreeze(mut self, frozen: usize) -> Self {
        self.unfreeze.push(frozen);
        self
    }

    pub fn archive(mut self) -> Self {
        self.archive = true;
        self
    }
}

/// Reply to an [`EvaluationRequest`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationResponse {
    /// Evaluation plus optional freeze/unfreeze/archive actions
    Evaluated(DesignerFeedback),
    /// Continue without adapting weights
    Skip,
    /// Halt once the current iteration is complete
    Stop,
}

impl EvaluationResponse {
    /// A bare evaluation
    pub fn evaluation(value: u32) -> Self {
        Self::Evaluated(DesignerFeedback::new(value))
    }

    pub fn skip() -> Self {
        Self::Skip
    }

    pub fn stop() -> Self {
        Self::Stop
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }

    /// Reject evaluations and class indices the request cannot satisfy
    pub fn validate(&self, request: &EvaluationRequest) -> AcoResult<()> {
        let Self::Evaluated(feedback) = self else {
            return Ok(());
        };

        if feedback.evaluation > MAX_EVALUATION {
            return Err(AcoError::InvalidResponse(format!(
                "evaluation {} outside 0..={}",
                feedback.evaluation, MAX_EVALUATION
            )));
        }
        if let Some(&class) = feedback
            .freeze
            .iter()
            .find(|&&c| c >= request.number_of_classes())
        {
            return Err(AcoError::InvalidResponse(format!(
                "cannot freeze class {}, design has {} classes",
                class,
                request.number_of_classes()
            )));
        }
        if let Some(&frozen) = feedback
            .unfreeze
            .iter()
            .find(|&&f| f >= request.freeze_list.len())
        {
            return Err(AcoError::InvalidResponse(format!(
                "cannot unfreeze entry {}, {} classes are frozen",
                frozen,
                request.freeze_list.len()
            )));
        }
        Ok(())
    }
}
