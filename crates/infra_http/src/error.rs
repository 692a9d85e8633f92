//! HTTP error types
//!
//! Failures of a single call, before they are handed to the domain as a
//! [`PortError`].

use core_kernel::PortError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the backend
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request did not complete within the client timeout
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout {
        operation: &'static str,
        duration_ms: u64,
    },

    /// No connection could be made, or it broke mid-request
    #[error("{operation} failed to connect: {source}")]
    Connect {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("{operation} returned HTTP {status}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
        retry_after_secs: Option<u64>,
    },

    /// The response body was not what the operation expects
    #[error("{operation} returned an unreadable body: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    /// The client itself could not be built
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),
}

impl HttpError {
    /// Classifies a `reqwest` failure of `operation`
    pub fn from_reqwest(operation: &'static str, duration_ms: u64, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            HttpError::Timeout {
                operation,
                duration_ms,
            }
        } else if error.is_decode() {
            HttpError::Decode {
                operation,
                message: error.to_string(),
            }
        } else {
            HttpError::Connect {
                operation,
                source: error,
            }
        }
    }

    pub fn status(operation: &'static str, status: StatusCode, body: impl Into<String>) -> Self {
        HttpError::Status {
            operation,
            status,
            body: body.into(),
            retry_after_secs: None,
        }
    }

    pub fn decode(operation: &'static str, message: impl Into<String>) -> Self {
        HttpError::Decode {
            operation,
            message: message.into(),
        }
    }

    /// Status code of the response, if one arrived
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<HttpError> for PortError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Timeout {
                operation,
                duration_ms,
            } => PortError::Timeout {
                operation: operation.to_string(),
                duration_ms,
            },
            HttpError::Connect { operation, source } => PortError::Connection {
                message: format!("{} failed to connect", operation),
                source: Some(Box::new(source)),
            },
            HttpError::Decode { operation, message } => {
                PortError::transformation(format!("{}: {}", operation, message))
            }
            HttpError::Status {
                operation,
                status,
                body,
                retry_after_secs,
            } => match status.as_u16() {
                401 | 403 => PortError::unauthorized(format!("{} returned HTTP {}", operation, status)),
                404 => PortError::not_found(operation, status),
                400 | 409 | 422 => PortError::validation(body),
                429 => PortError::RateLimited {
                    retry_after_secs: retry_after_secs.unwrap_or(0),
                },
                500..=599 => PortError::ServiceUnavailable {
                    service: operation.to_string(),
                },
                _ => PortError::internal(format!("{} returned HTTP {}", operation, status)),
            },
            HttpError::Client(source) => PortError::Internal {
                message: "HTTP client setup failed".to_string(),
                source: Some(Box::new(source)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port_error(status: u16) -> PortError {
        let status = StatusCode::from_u16(status).unwrap();
        HttpError::status("create_invoices", status, "rejected").into()
    }

    #[test]
    fn test_auth_statuses_map_to_unauthorized() {
        assert!(matches!(port_error(401), PortError::Unauthorized { .. }));
        assert!(matches!(port_error(403), PortError::Unauthorized { .. }));
    }

    #[test]
    fn test_not_found() {
        assert!(port_error(404).is_not_found());
    }

    #[test]
    fn test_server_errors_are_transient() {
        let error = port_error(503);
        assert!(matches!(error, PortError::ServiceUnavailable { ref service } if service == "create_invoices"));
        assert!(error.is_transient());
    }

    #[test]
    fn test_bad_request_keeps_body() {
        match port_error(400) {
            PortError::Validation { message, .. } => assert_eq!(message, "rejected"),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_limit_carries_retry_after() {
        let error: PortError = HttpError::Status {
            operation: "list_invoices",
            status: StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
            retry_after_secs: Some(7),
        }
        .into();
        assert!(matches!(error, PortError::RateLimited { retry_after_secs: 7 }));
    }

    #[test]
    fn test_decode_maps_to_transformation() {
        let error: PortError = HttpError::decode("login", "missing access_token").into();
        assert!(matches!(error, PortError::Transformation { ref message } if message.contains("access_token")));
    }

    #[test]
    fn test_timeout_keeps_duration() {
        let error: PortError = HttpError::Timeout {
            operation: "list_invoices",
            duration_ms: 10_000,
        }
        .into();
        assert!(matches!(error, PortError::Timeout { duration_ms: 10_000, .. }));
    }
}
