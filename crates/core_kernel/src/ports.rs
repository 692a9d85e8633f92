//! Ports for external collaborators
//!
//! The invoice core never talks to the network itself. Every collaborator
//! (create-invoice, list fetch, login) is a port trait defined in the domain
//! crate; the traits here are the shared pieces those ports build on.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │   domain_invoice (session,   │
//! │   submission, list state)    │
//! └──────────────┬───────────────┘
//!                │ InvoicePort / ListRefresh / Notifier
//!                ▼
//! ┌──────────────────────────────┐     ┌──────────────────────┐
//! │  infra_http (reqwest client) │     │  mock (tests)        │
//! └──────────────────────────────┘     └──────────────────────┘
//! ```

use std::fmt;
use thiserror::Error;

use crate::identifiers::RequestId;

/// Error type for port operations
///
/// Adapters map whatever their transport reports into one of these variants.
/// The domain treats all of them as opaque failures of the attempt.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The far side rejected the payload
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// Authentication or authorization failed
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
    },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// A response could not be decoded
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a Validation error with field information
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        PortError::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a Transformation error
    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::RateLimited { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so they can be shared behind an
/// `Arc` across async tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// Metadata about a port operation for tracing
#[derive(Debug, Clone, Default)]
pub struct OperationMetadata {
    /// Correlation ID for tracing across systems
    pub request_id: Option<RequestId>,
}

impl OperationMetadata {
    /// Creates metadata carrying a fresh request id
    pub fn new_request() -> Self {
        Self {
            request_id: Some(RequestId::new_v7()),
        }
    }
}
