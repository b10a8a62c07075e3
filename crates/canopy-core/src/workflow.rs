//! The before/after workflow: selection, submission, and presentation
//! behind one façade that enforces the cross-component rules.
//!
//! - A successful selection clears any finished result or error.
//! - Submission is gated on both slots being filled and nothing in flight.
//! - Every state change bumps [`revision`](Workflow::revision) and notifies
//!   subscribers.

use crate::error::{SelectionError, SubmissionError, TransportError};
use crate::observe::{Change, Observers, SubscriptionId};
use crate::present::Presentation;
use crate::selection::{ImageSelection, PreviewHandles, SelectionManager};
use crate::submission::{PendingSubmission, SubmissionController, SubmissionState};
use crate::transport::{AnalysisTransport, TransportResponse};
use crate::types::Slot;

/// Owns the selection manager and submission controller.
#[derive(Debug)]
pub struct Workflow<P: PreviewHandles> {
    selection: SelectionManager<P>,
    submission: SubmissionController,
    observers: Observers,
    revision: u64,
}

impl<P: PreviewHandles> Workflow<P> {
    /// Create an idle workflow with empty slots.
    #[must_use]
    pub fn new(previews: P) -> Self {
        Self {
            selection: SelectionManager::new(previews),
            submission: SubmissionController::new(),
            observers: Observers::default(),
            revision: 0,
        }
    }

    /// Select a file for `slot`.
    ///
    /// On success any finished result or error is cleared (without
    /// resubmitting). On rejection nothing changes except that
    /// subscribers are told about the rejection.
    ///
    /// # Errors
    ///
    /// Propagates [`SelectionError`] from the selection manager.
    pub fn select(
        &mut self,
        slot: Slot,
        name: impl Into<String>,
        declared_mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<(), SelectionError> {
        match self.selection.select(slot, name, declared_mime, bytes) {
            Ok(_) => {
                self.submission.clear_outcome();
                self.changed(Change::Selected(slot));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%slot, error = %err, "selection rejected");
                self.changed(Change::Rejected(slot));
                Err(err)
            }
        }
    }

    /// Remove the selection for `slot`.
    pub fn clear(&mut self, slot: Slot) {
        if self.selection.clear(slot) {
            self.submission.clear_outcome();
            self.changed(Change::Cleared(slot));
        }
    }

    /// The current selection for `slot`.
    #[must_use]
    pub const fn selection(&self, slot: Slot) -> Option<&ImageSelection> {
        self.selection.get(slot)
    }

    /// The selection manager.
    #[must_use]
    pub const fn selections(&self) -> &SelectionManager<P> {
        &self.selection
    }

    /// Current submission state.
    #[must_use]
    pub const fn state(&self) -> &SubmissionState {
        self.submission.state()
    }

    /// True iff both slots hold a file and no request is outstanding.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.submission.can_submit(&self.selection)
    }

    /// Returns `true` while a request is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.submission.state().is_loading()
    }

    /// Display sections for the current result, if the last attempt succeeded.
    #[must_use]
    pub fn presentation(&self) -> Option<Presentation<'_>> {
        self.state().result().map(|r| Presentation::new(r))
    }

    /// Start a submission. See [`SubmissionController::begin`].
    ///
    /// # Errors
    ///
    /// [`SubmissionError::Validation`] (state moves to `Failed`) or
    /// [`SubmissionError::Busy`] (state unchanged).
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmissionError> {
        let before = self.submission.state().name();
        let outcome = self.submission.begin(&self.selection);
        if !matches!(outcome, Err(SubmissionError::Busy)) {
            tracing::debug!(from = before, to = self.state().name(), "submission state");
            self.changed(Change::Submission);
        }
        outcome
    }

    /// Apply a transport outcome. See [`SubmissionController::finish`].
    ///
    /// Returns `false` if no request was in flight.
    pub fn finish_submit(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<TransportResponse, TransportError>,
    ) -> bool {
        let applied = self.submission.finish(pending, outcome);
        if applied {
            tracing::debug!(to = self.state().name(), "submission state");
            self.changed(Change::Submission);
        }
        applied
    }

    /// Validate, send the request through `transport`, and apply the outcome.
    ///
    /// Holds `&mut self` across the network call, so it suits callers
    /// that own the workflow outright. UI layers that must keep selection
    /// responsive during the request use [`begin_submit`](Self::begin_submit)
    /// and [`finish_submit`](Self::finish_submit) around their own await.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    pub async fn submit<T: AnalysisTransport>(&mut self, transport: &T) -> &SubmissionState {
        if let Ok(pending) = self.begin_submit() {
            let outcome = transport.send(pending.request()).await;
            self.finish_submit(pending, outcome);
        }
        self.state()
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(Change) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    /// Remove a change listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Monotonic counter bumped on every change, for polling UIs.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    fn changed(&mut self, change: Change) {
        self.revision += 1;
        self.observers.notify(change);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::selection::tests::{CountingPreviews, JPEG, PNG};

    fn workflow() -> Workflow<CountingPreviews> {
        Workflow::new(CountingPreviews::default())
    }

    fn ok(body: &str) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status: 200,
            body: body.to_owned(),
        })
    }

    #[test]
    fn can_submit_requires_both_slots() {
        let mut w = workflow();
        assert!(!w.can_submit());
        w.select(Slot::Before, "a.jpg", None, JPEG.to_vec()).unwrap();
        assert!(!w.can_submit());
        w.select(Slot::After, "b.png", None, PNG.to_vec()).unwrap();
        assert!(w.can_submit());
        w.clear(Slot::Before);
        assert!(!w.can_submit());
    }

    #[test]
    fn selecting_clears_finished_outcome() {
        let mut w = workflow();
        w.select(Slot::Before, "a.jpg", None, JPEG.to_vec()).unwrap();
        w.select(Slot::After, "b.png", None, PNG.to_vec()).unwrap();
        let pending = w.begin_submit().unwrap();
        w.finish_submit(pending, ok("{}"));
        assert!(w.state().result().is_some());

        w.select(Slot::After, "c.png", None, PNG.to_vec()).unwrap();
        assert_eq!(*w.state(), SubmissionState::Idle);
        assert!(w.can_submit());
    }

    #[test]
    fn selecting_after_failure_returns_to_idle() {
        let mut w = workflow();
        w.select(Slot::Before, "a.jpg", None, JPEG.to_vec()).unwrap();
        w.begin_submit().unwrap_err();
        assert!(matches!(
            w.state().error(),
            Some(SubmissionError::Validation { .. })
        ));

        w.select(Slot::After, "b.png", None, PNG.to_vec()).unwrap();
        assert_eq!(*w.state(), SubmissionState::Idle);
        assert!(w.state().error().is_none());
        assert!(w.can_submit());
    }

    #[test]
    fn selecting_after_transport_failure_returns_to_idle() {
        let mut w = workflow();
        w.select(Slot::Before, "a.jpg", None, JPEG.to_vec()).unwrap();
        w.select(Slot::After, "b.png", None, PNG.to_vec()).unwrap();
        let pending = w.begin_submit().unwrap();
        w.finish_submit(pending, Err(TransportError("offline".into())));
        assert!(w.state().error().is_some());

        w.select(Slot::Before, "c.jpg", None, JPEG.to_vec()).unwrap();
        assert_eq!(*w.state(), SubmissionState::Idle);
        assert!(w.state().error().is_none());
        assert!(w.can_submit());
    }

    #[test]
    fn rejected_selection_keeps_outcome() {
        let mut w = workflow();
        w.select(Slot::Before, "a.jpg", None, JPEG.to_vec()).unwrap();
        w.begin_submit().unwrap_err();
        assert!(w.state().error().is_some());

        w.select(Slot::After, "bad.gif", None, b"GIF89a".to_vec())
            .unwrap_err();
        assert!(w.state().error().is_some());
    }

    #[test]
    fn selection_during_flight_keeps_loading() {
        let mut w = workflow();
        w.select(Slot::Before, "a.jpg", None, JPEG.to_vec()).unwrap();
        w.select(Slot::After, "b.png", None, PNG.to_vec()).unwrap();
        let pending = w.begin_submit().unwrap();

        w.select(Slot::Before, "c.jpg", None, JPEG.to_vec()).unwrap();
        assert!(w.is_loading());
        assert!(!w.can_submit());

        assert!(w.finish_submit(pending, ok("{}")));
        assert!(!w.is_loading());
    }

    #[test]
    fn subscribers_see_every_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut w = workflow();
        let sink = Rc::clone(&seen);
        w.subscribe(move |c| sink.borrow_mut().push(c));

        w.select(Slot::Before, "a.jpg", None, JPEG.to_vec()).unwrap();
        w.select(Slot::After, "x.gif", None, b"GIF89a".to_vec())
            .unwrap_err();
        w.select(Slot::After, "b.png", None, PNG.to_vec()).unwrap();
        let pending = w.begin_submit().unwrap();
        w.finish_submit(pending, ok("{}"));
        w.clear(Slot::After);

        assert_eq!(
            *seen.borrow(),
            vec![
                Change::Selected(Slot::Before),
                Change::Rejected(Slot::After),
                Change::Selected(Slot::After),
                Change::Submission,
                Change::Submission,
                Change::Cleared(Slot::After),
            ]
        );
        assert_eq!(w.revision(), 6);
    }

    #[test]
    fn busy_begin_does_not_notify() {
        let mut w = workflow();
        w.select(Slot::Before, "a.jpg", None, JPEG.to_vec()).unwrap();
        w.select(Slot::After, "b.png", None, PNG.to_vec()).unwrap();
        let _pending = w.begin_submit().unwrap();
        let revision = w.revision();
        assert_eq!(w.begin_submit().unwrap_err(), SubmissionError::Busy);
        assert_eq!(w.revision(), revision);
    }

    #[test]
    fn presentation_follows_result() {
        let mut w = workflow();
        assert!(w.presentation().is_none());
        w.select(Slot::Before, "a.jpg", None, JPEG.to_vec()).unwrap();
        w.select(Slot::After, "b.png", None, PNG.to_vec()).unwrap();
        let pending = w.begin_submit().unwrap();
        w.finish_submit(pending, ok(r#"{"alignment_message": "Feature-based alignment successful."}"#));
        assert_eq!(
            w.presentation().unwrap().alignment_note,
            Some("Feature-based alignment successful.")
        );
    }

    #[test]
    fn dropping_workflow_releases_previews() {
        let previews = CountingPreviews::default();
        let ledger = Rc::clone(&previews.state);
        let mut w = Workflow::new(previews);
        w.select(Slot::Before, "a.jpg", None, JPEG.to_vec()).unwrap();
        w.select(Slot::After, "b.png", None, PNG.to_vec()).unwrap();
        drop(w);
        assert!(ledger.borrow().live.is_empty());
    }
}
