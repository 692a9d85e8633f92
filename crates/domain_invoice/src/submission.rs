//! Submission pipeline
//!
//! ```text
//! Idle ──submit──▶ Validating ──errors──▶ Idle (Invalid, errors shown)
//!                       │
//!                       └──valid──▶ Submitting ──ok──▶ Idle (Succeeded, reset)
//!                                        └──────err──▶ Idle (Failed, draft kept)
//! ```
//!
//! [`SubmissionTracker`] holds the phase and refuses a second attempt while
//! one is in flight. [`SubmissionPipeline`] performs the create call and the
//! side effects that follow it.

use std::sync::Arc;
use tracing::{info, warn};

use core_kernel::OperationMetadata;

use crate::draft::InvoiceDraft;
use crate::error::SubmissionError;
use crate::ports::{CreateInvoiceRequest, InvoicePort, ListRefresh, Notification, Notifier};
use crate::schema::ValidationErrors;

pub const SUCCESS_TITLE: &str = "Success";
pub const SUCCESS_MESSAGE: &str = "Invoice created successfully";
pub const FAILURE_TITLE: &str = "Error";
pub const FAILURE_MESSAGE: &str = "Failed to create invoice. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
}

/// How the last attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptResult {
    Invalid,
    Succeeded,
    Failed,
}

/// Result of one submit request, as seen by the dialog
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent
    Invalid(ValidationErrors),
    /// The invoice was created and the session closed
    Created,
    /// The create call failed; the draft is kept for a retry
    Failed,
    /// Ignored because another submission is awaiting its response
    InFlight,
    /// Ignored because the session is closed
    Closed,
    /// Ignored because the discard prompt is showing
    ConfirmationPending,
}

/// Phase bookkeeping for one session's submissions
#[derive(Debug, Clone, Default)]
pub struct SubmissionTracker {
    phase: SubmissionPhase,
    last: Option<AttemptResult>,
    dispatched: u32,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn last(&self) -> Option<AttemptResult> {
        self.last
    }

    /// Number of create calls made so far
    pub fn dispatched(&self) -> u32 {
        self.dispatched
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase != SubmissionPhase::Idle
    }

    /// Idle -> Validating
    pub fn begin(&mut self) -> Result<(), SubmissionError> {
        if self.phase != SubmissionPhase::Idle {
            return Err(SubmissionError::InFlight);
        }
        self.phase = SubmissionPhase::Validating;
        Ok(())
    }

    /// Validating -> Idle with errors
    pub fn reject(&mut self) {
        self.phase = SubmissionPhase::Idle;
        self.last = Some(AttemptResult::Invalid);
    }

    /// Validating -> Submitting
    pub fn dispatch(&mut self) {
        self.phase = SubmissionPhase::Submitting;
        self.dispatched += 1;
    }

    /// Submitting -> Idle
    pub fn settle(&mut self, succeeded: bool) {
        self.phase = SubmissionPhase::Idle;
        self.last = Some(if succeeded {
            AttemptResult::Succeeded
        } else {
            AttemptResult::Failed
        });
    }

    /// Back to Idle when the awaiting task went away before a response
    pub fn abandon(&mut self) {
        if self.phase == SubmissionPhase::Submitting {
            self.last = Some(AttemptResult::Failed);
        }
        self.phase = SubmissionPhase::Idle;
    }
}

/// The create call and its follow-up effects
#[derive(Clone)]
pub struct SubmissionPipeline {
    invoices: Arc<dyn InvoicePort>,
    refresh: Arc<dyn ListRefresh>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for SubmissionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionPipeline").finish_non_exhaustive()
    }
}

impl SubmissionPipeline {
    pub fn new(
        invoices: Arc<dyn InvoicePort>,
        refresh: Arc<dyn ListRefresh>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            invoices,
            refresh,
            notifier,
        }
    }

    pub fn invoices(&self) -> &Arc<dyn InvoicePort> {
        &self.invoices
    }

    /// Sends `draft` as a single-invoice batch
    ///
    /// On success the user is told and the list is refreshed. On failure the
    /// user gets a generic message; the error detail is only logged.
    pub async fn dispatch(&self, draft: InvoiceDraft) -> Result<(), SubmissionError> {
        let request = CreateInvoiceRequest::single(draft);
        let metadata = OperationMetadata::new_request();
        let request_id = metadata.request_id;

        match self.invoices.create_invoices(&request, Some(metadata)).await {
            Ok(_) => {
                info!(request_id = ?request_id, "Invoice created");
                self.notifier
                    .notify(Notification::success(SUCCESS_TITLE, SUCCESS_MESSAGE));
                self.refresh.refresh();
                Ok(())
            }
            Err(e) => {
                warn!(request_id = ?request_id, error = %e, "Create invoice failed");
                self.notifier
                    .notify(Notification::error(FAILURE_TITLE, FAILURE_MESSAGE));
                Err(SubmissionError::Rejected(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::{CountingRefresh, MockInvoicePort, RecordingNotifier};
    use crate::ports::Severity;

    struct Harness {
        port: Arc<MockInvoicePort>,
        refresh: Arc<CountingRefresh>,
        notifier: Arc<RecordingNotifier>,
        pipeline: SubmissionPipeline,
    }

    fn harness(port: MockInvoicePort) -> Harness {
        let port = Arc::new(port);
        let refresh = Arc::new(CountingRefresh::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let pipeline = SubmissionPipeline::new(port.clone(), refresh.clone(), notifier.clone());
        Harness {
            port,
            refresh,
            notifier,
            pipeline,
        }
    }

    #[test]
    fn test_tracker_refuses_second_begin() {
        let mut tracker = SubmissionTracker::new();
        tracker.begin().unwrap();
        tracker.dispatch();

        assert!(matches!(tracker.begin(), Err(SubmissionError::InFlight)));
        assert_eq!(tracker.phase(), SubmissionPhase::Submitting);

        tracker.settle(false);
        assert_eq!(tracker.last(), Some(AttemptResult::Failed));
        assert!(tracker.begin().is_ok());
    }

    #[test]
    fn test_tracker_invalid_returns_to_idle() {
        let mut tracker = SubmissionTracker::new();
        tracker.begin().unwrap();
        tracker.reject();

        assert_eq!(tracker.phase(), SubmissionPhase::Idle);
        assert_eq!(tracker.last(), Some(AttemptResult::Invalid));
        assert_eq!(tracker.dispatched(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_success_notifies_and_refreshes() {
        let h = harness(MockInvoicePort::new());

        h.pipeline.dispatch(InvoiceDraft::new()).await.unwrap();

        assert_eq!(h.port.create_calls().await, 1);
        assert_eq!(h.refresh.count(), 1);
        assert_eq!(
            h.notifier.last(),
            Some(Notification::success("Success", "Invoice created successfully"))
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_hides_detail() {
        let h = harness(MockInvoicePort::failing("invoice-service down"));

        let result = h.pipeline.dispatch(InvoiceDraft::new()).await;

        assert!(matches!(result, Err(SubmissionError::Rejected(_))));
        assert_eq!(h.refresh.count(), 0);
        let toast = h.notifier.last().unwrap();
        assert_eq!(toast.severity, Severity::Destructive);
        assert_eq!(toast.description, "Failed to create invoice. Please try again.");
        assert!(!toast.description.contains("down"));
    }
}
