//! Core error types used across the workspace

use thiserror::Error;

/// Core error type for the kernel
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl CoreError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoreError::InvalidStateTransition(message.into())
    }
}
