//! Reviewers: whoever answers the interaction checkpoint
//!
//! [`DesignSearch::run_with_reviewer`](crate::engine::search::DesignSearch::run_with_reviewer)
//! blocks on a reviewer at each checkpoint. Closures work directly; the
//! [`ChannelReviewer`] forwards requests to another thread (a UI or web
//! session) and applies the configured timeout policy.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};

use tracing::warn;

use super::evaluator::{EvaluationRequest, EvaluationResponse};
use crate::config::{InteractionPolicy, TimeoutAction};

/// Answers evaluation requests
pub trait DesignReviewer {
    fn review(&mut self, request: &EvaluationRequest) -> EvaluationResponse;
}

impl<F> DesignReviewer for F
where
    F: FnMut(&EvaluationRequest) -> EvaluationResponse,
{
    fn review(&mut self, request: &EvaluationRequest) -> EvaluationResponse {
        self(request)
    }
}

/// Search-side end of a request/response channel pair
pub struct ChannelReviewer {
    requests: Sender<EvaluationRequest>,
    responses: Receiver<EvaluationResponse>,
    policy: InteractionPolicy,
}

/// Presentation-side end of a request/response channel pair
pub struct ReviewerHandle {
    requests: Receiver<EvaluationRequest>,
    responses: Sender<EvaluationResponse>,
}

impl ChannelReviewer {
    /// Create a connected reviewer and handle
    pub fn pair(policy: InteractionPolicy) -> (Self, ReviewerHandle) {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();
        (
            Self {
                requests: request_tx,
                responses: response_rx,
                policy,
            },
            ReviewerHandle {
                requests: request_rx,
                responses: response_tx,
            },
        )
    }

    fn on_timeout(&self) -> EvaluationResponse {
        match self.policy.on_timeout {
            TimeoutAction::Stop => EvaluationResponse::Stop,
            TimeoutAction::Skip => EvaluationResponse::Skip,
        }
    }
}

impl DesignReviewer for ChannelReviewer {
    fn review(&mut self, request: &EvaluationRequest) -> EvaluationResponse {
        if self.requests.send(request.clone()).is_err() {
            warn!("reviewer disconnected, stopping search");
            return EvaluationResponse::Stop;
        }

        let received = match self.policy.timeout {
            Some(timeout) => self.responses.recv_timeout(timeout),
            None => self
                .responses
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(response) => response,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    iteration = request.iteration,
                    action = ?self.policy.on_timeout,
                    "reviewer timed out"
                );
                self.on_timeout()
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!("reviewer disconnected, stopping search");
                EvaluationResponse::Stop
            }
        }
    }
}

impl ReviewerHandle {
    /// Block until the search asks for an evaluation; `None` once the
    /// search has finished
    pub fn next_request(&self) -> Option<EvaluationRequest> {
        self.requests.recv().ok()
    }

    /// Send the answer to the pending request; false if the search is gone
    pub fn respond(&self, response: EvaluationResponse) -> bool {
        self.responses.send(response).is_ok()
    }
}
