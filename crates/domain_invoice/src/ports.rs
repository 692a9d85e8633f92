//! Invoice Domain Ports
//!
//! The collaborators the invoice core depends on, expressed as traits so that
//! the HTTP adapter, the CLI and the tests can each supply their own.
//!
//! # Collaborators
//!
//! - [`InvoicePort`]: create invoices and fetch pages of the invoice list
//! - [`ListRefresh`]: zero-argument trigger telling the list view to re-fetch
//! - [`Notifier`]: fire-and-forget toasts
//! - [`TokenProvider`]: read-only access to the session's auth tokens,
//!   injected into adapters instead of living in a global
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_invoice::{SubmissionPipeline, RefreshTrigger};
//! use std::sync::Arc;
//!
//! let pipeline = SubmissionPipeline::new(
//!     Arc::new(HttpInvoiceAdapter::new(config, tokens)?),
//!     Arc::new(RefreshTrigger::new()),
//!     Arc::new(ConsoleNotifier),
//! );
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, OperationMetadata, PortError};

use crate::draft::InvoiceDraft;
use crate::listing::{InvoicePage, InvoiceQuery};

/// Body of the create-invoice call
///
/// The backend accepts a batch; the dialog always sends exactly one draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    pub invoices: Vec<InvoiceDraft>,
}

impl CreateInvoiceRequest {
    /// Wraps one draft as `{"invoices": [draft]}`
    pub fn single(draft: InvoiceDraft) -> Self {
        Self { invoices: vec![draft] }
    }
}

/// Port for the invoice service
#[async_trait]
pub trait InvoicePort: DomainPort {
    /// Creates the invoices in `request`
    ///
    /// The response body is returned as-is; the domain only cares whether
    /// the call succeeded.
    async fn create_invoices(
        &self,
        request: &CreateInvoiceRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<serde_json::Value, PortError>;

    /// Fetches one page of invoices
    async fn list_invoices(
        &self,
        query: &InvoiceQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<InvoicePage, PortError>;
}

/// Tells the invoice list to re-fetch
pub trait ListRefresh: Send + Sync {
    fn refresh(&self);
}

/// Toast severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Default,
    Destructive,
}

/// A transient message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

/// Surfaces notifications to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Read-only view of the session's auth tokens
pub trait TokenProvider: Send + Sync {
    /// Bearer token for the `Authorization` header
    fn access_token(&self) -> Option<String>;

    /// Organisation token for the `org-token` header
    fn org_token(&self) -> Option<String>;
}

/// Mock implementations of the invoice ports for testing
///
/// `MockInvoicePort` records every create request, can be told to fail, and
/// can hold calls open until released so tests can observe a submission
/// while it is in flight.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};
    use tokio::sync::{Notify, RwLock};

    use crate::listing::Paging;

    /// In-memory mock implementation of InvoicePort
    #[derive(Debug, Default)]
    pub struct MockInvoicePort {
        requests: Arc<RwLock<Vec<CreateInvoiceRequest>>>,
        queries: Arc<RwLock<Vec<InvoiceQuery>>>,
        failure: Arc<RwLock<Option<String>>>,
        page: Arc<RwLock<Option<InvoicePage>>>,
        gate: Option<Arc<Notify>>,
    }

    impl MockInvoicePort {
        /// Creates a mock that accepts every request
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a mock that rejects every request
        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                failure: Arc::new(RwLock::new(Some(message.into()))),
                ..Self::default()
            }
        }

        /// Creates a mock whose calls wait until the returned handle is notified
        pub fn gated() -> (Self, Arc<Notify>) {
            let gate = Arc::new(Notify::new());
            let port = Self {
                gate: Some(gate.clone()),
                ..Self::default()
            };
            (port, gate)
        }

        /// Serves `page` from `list_invoices`
        pub async fn with_page(self, page: InvoicePage) -> Self {
            *self.page.write().await = Some(page);
            self
        }

        /// Makes later calls fail (`Some`) or succeed (`None`)
        pub async fn set_failure(&self, message: Option<&str>) {
            *self.failure.write().await = message.map(str::to_string);
        }

        /// Every create request received so far
        pub async fn requests(&self) -> Vec<CreateInvoiceRequest> {
            self.requests.read().await.clone()
        }

        pub async fn create_calls(&self) -> usize {
            self.requests.read().await.len()
        }

        /// Every list query received so far
        pub async fn queries(&self) -> Vec<InvoiceQuery> {
            self.queries.read().await.clone()
        }

        async fn outcome(&self) -> Result<(), PortError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.failure.read().await.as_ref() {
                Some(message) => Err(PortError::ServiceUnavailable {
                    service: message.clone(),
                }),
                None => Ok(()),
            }
        }
    }

    impl DomainPort for MockInvoicePort {}

    #[async_trait]
    impl InvoicePort for MockInvoicePort {
        async fn create_invoices(
            &self,
            request: &CreateInvoiceRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<serde_json::Value, PortError> {
            self.requests.write().await.push(request.clone());
            self.outcome().await?;
            Ok(serde_json::json!({ "status": "SUCCESS", "count": request.invoices.len() }))
        }

        async fn list_invoices(
            &self,
            query: &InvoiceQuery,
            _metadata: Option<OperationMetadata>,
        ) -> Result<InvoicePage, PortError> {
            self.queries.write().await.push(query.clone());
            self.outcome().await?;
            let page = self.page.read().await.clone();
            Ok(page.unwrap_or_else(|| InvoicePage {
                data: Vec::new(),
                paging: Paging {
                    total_records: 0,
                    page_num: query.page_num,
                    page_size: query.page_size,
                },
            }))
        }
    }

    /// Notifier that keeps every notification
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn notifications(&self) -> Vec<Notification> {
            self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        pub fn last(&self) -> Option<Notification> {
            self.notifications().pop()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(notification);
        }
    }

    /// ListRefresh that counts its triggers
    #[derive(Debug, Default)]
    pub struct CountingRefresh {
        count: AtomicUsize,
    }

    impl CountingRefresh {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    impl ListRefresh for CountingRefresh {
        fn refresh(&self) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    #[test]
    fn test_request_wraps_single_draft() {
        let mut draft = InvoiceDraft::new();
        draft.invoice_number = "INV-1".into();

        let json = serde_json::to_value(CreateInvoiceRequest::single(draft)).unwrap();
        assert_eq!(json["invoices"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["invoices"][0]["invoiceNumber"], "INV-1");
    }

    #[test]
    fn test_notification_severity() {
        assert_eq!(Notification::success("Success", "ok").severity, Severity::Default);
        assert_eq!(Notification::error("Error", "no").severity, Severity::Destructive);
    }

    #[tokio::test]
    async fn test_mock_port_records_and_fails() {
        let port = MockInvoicePort::failing("invoice-service");
        let request = CreateInvoiceRequest::single(InvoiceDraft::new());

        let result = port.create_invoices(&request, None).await;
        assert!(matches!(result, Err(PortError::ServiceUnavailable { .. })));
        assert_eq!(port.create_calls().await, 1);

        port.set_failure(None).await;
        assert!(port.create_invoices(&request, None).await.is_ok());
        assert_eq!(port.requests().await.len(), 2);
    }
}
