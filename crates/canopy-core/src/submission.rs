//! Submission controller: readiness gating and the request lifecycle.
//!
//! ```text
//!            begin (both files)            finish (2xx + result)
//!   Idle ─────────────────────▶ InFlight ─────────────────────▶ Succeeded
//!    │  ▲                          │
//!    │  │ new selection            │ finish (error / transport failure)
//!    │  └────────── Failed ◀───────┘
//!    └── begin (missing file) ──▶ Failed
//! ```
//!
//! The controller is sans-IO: [`begin`](SubmissionController::begin)
//! hands out a [`PendingSubmission`] carrying the request, the caller
//! performs the network round trip, and
//! [`finish`](SubmissionController::finish) applies the outcome. At most
//! one request is outstanding, and there is no cancellation: once begun,
//! a submission always ends in `Succeeded` or `Failed`.

use std::rc::Rc;

use crate::error::{SubmissionError, TransportError};
use crate::selection::{PreviewHandles, SelectionManager};
use crate::transport::{AnalysisRequest, TransportResponse, decode_outcome};
use crate::types::AnalysisResult;

/// Where the controller is in the request lifecycle.
///
/// Exactly one variant holds at a time, so a result and an error are
/// never shown together.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    /// Nothing submitted, or the last outcome was cleared by a new selection.
    #[default]
    Idle,
    /// A request is outstanding.
    InFlight,
    /// The service returned a result.
    Succeeded(Rc<AnalysisResult>),
    /// The last attempt failed.
    Failed(SubmissionError),
}

impl SubmissionState {
    /// Returns `true` while a request is outstanding (the loading indicator).
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    /// The analysis result, if the last attempt succeeded.
    #[must_use]
    pub const fn result(&self) -> Option<&Rc<AnalysisResult>> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    /// The error, if the last attempt failed.
    #[must_use]
    pub const fn error(&self) -> Option<&SubmissionError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The user-visible error message, if the last attempt failed.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    /// Short name of the state, for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InFlight => "in_flight",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// A submission that has been started but not yet completed.
///
/// Deliberately not `Clone`: each pending submission finishes at most once.
#[derive(Debug)]
pub struct PendingSubmission {
    request: AnalysisRequest,
}

impl PendingSubmission {
    /// The request to send.
    #[must_use]
    pub const fn request(&self) -> &AnalysisRequest {
        &self.request
    }
}

/// Drives [`SubmissionState`] transitions.
#[derive(Debug, Default)]
pub struct SubmissionController {
    state: SubmissionState,
}

impl SubmissionController {
    /// Create a controller in the [`Idle`](SubmissionState::Idle) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// True iff both slots hold a file and no request is outstanding.
    #[must_use]
    pub fn can_submit<P: PreviewHandles>(&self, selection: &SelectionManager<P>) -> bool {
        !self.state.is_loading() && selection.is_complete()
    }

    /// Start a submission.
    ///
    /// On success the controller is [`InFlight`](SubmissionState::InFlight)
    /// with any prior result or error cleared, and the returned
    /// [`PendingSubmission`] carries the multipart request to send.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::Validation`] if a slot is empty. The controller
    ///   moves to `Failed` with that error; no request is built.
    /// - [`SubmissionError::Busy`] if a request is already outstanding. The
    ///   state is left unchanged.
    pub fn begin<P: PreviewHandles>(
        &mut self,
        selection: &SelectionManager<P>,
    ) -> Result<PendingSubmission, SubmissionError> {
        if self.state.is_loading() {
            tracing::warn!("submission rejected: request already in flight");
            return Err(SubmissionError::Busy);
        }

        let request = match AnalysisRequest::from_selection(selection) {
            Ok(request) => request,
            Err(missing) => {
                let err = SubmissionError::Validation { missing };
                tracing::warn!(error = %err, "submission rejected: missing image");
                self.state = SubmissionState::Failed(err.clone());
                return Err(err);
            }
        };

        self.state = SubmissionState::InFlight;
        tracing::debug!(parts = request.parts().len(), "submission in flight");
        Ok(PendingSubmission { request })
    }

    /// Apply the outcome of a pending submission.
    ///
    /// Returns `false` (and changes nothing) if no request is in flight.
    /// Otherwise the state becomes `Succeeded` or `Failed`, and the
    /// loading indicator is off either way.
    pub fn finish(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<TransportResponse, TransportError>,
    ) -> bool {
        if !self.state.is_loading() {
            tracing::debug!(state = self.state.name(), "ignoring outcome: nothing in flight");
            return false;
        }
        // The request is spent; the token only proves a begin happened.
        drop(pending);

        self.state = match decode_outcome(outcome) {
            Ok(result) => {
                tracing::debug!("analysis succeeded");
                SubmissionState::Succeeded(Rc::new(result))
            }
            Err(err) => {
                match std::error::Error::source(&err) {
                    Some(cause) => {
                        tracing::warn!(kind = err.kind(), %cause, "analysis failed");
                    }
                    None => tracing::warn!(kind = err.kind(), error = %err, "analysis failed"),
                }
                SubmissionState::Failed(err)
            }
        };
        true
    }

    /// Drop a finished outcome so the user can submit again.
    ///
    /// `Succeeded` and `Failed` return to `Idle`; `Idle` and `InFlight`
    /// are unchanged. Returns `true` if the state changed.
    pub fn clear_outcome(&mut self) -> bool {
        match self.state {
            SubmissionState::Succeeded(_) | SubmissionState::Failed(_) => {
                self.state = SubmissionState::Idle;
                true
            }
            SubmissionState::Idle | SubmissionState::InFlight => false,
        }
    }
}
