//! Session Harness
//!
//! A [`CreateInvoiceSession`] wired to the mock collaborators, with handles
//! kept on each so tests can inspect what the session sent and said.

use std::sync::Arc;

use domain_invoice::ports::mock::{CountingRefresh, MockInvoicePort, RecordingNotifier};
use domain_invoice::{CreateInvoiceSession, RemovePolicy, SubmissionPipeline};

/// A session and handles on every collaborator it talks to
pub struct SessionHarness {
    pub port: Arc<MockInvoicePort>,
    pub refresh: Arc<CountingRefresh>,
    pub notifier: Arc<RecordingNotifier>,
    pub session: CreateInvoiceSession,
}

impl SessionHarness {
    /// Session over a mock port that accepts every request
    pub fn new() -> Self {
        Self::with_port(MockInvoicePort::new(), RemovePolicy::default())
    }

    /// Session over a mock port that rejects every request
    pub fn failing() -> Self {
        Self::with_port(MockInvoicePort::failing("invoice-service"), RemovePolicy::default())
    }

    pub fn with_port(port: MockInvoicePort, policy: RemovePolicy) -> Self {
        let port = Arc::new(port);
        let refresh = Arc::new(CountingRefresh::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let pipeline = SubmissionPipeline::new(port.clone(), refresh.clone(), notifier.clone());
        Self {
            port,
            refresh,
            notifier,
            session: CreateInvoiceSession::new(pipeline, policy),
        }
    }
}

impl Default for SessionHarness {
    fn default() -> Self {
        Self::new()
    }
}
