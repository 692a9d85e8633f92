//! Close/discard guard
//!
//! ```text
//! Open ──close (clean)──▶ Closed
//!   │
//!   └──close (dirty)──▶ ConfirmPending ──confirm──▶ Closed
//!                              └───────cancel──▶ Open
//! ```
//!
//! The guard only decides. Resetting the form on close is the session's job.

use core_kernel::CoreError;
use tracing::debug;

pub const CONFIRM_TITLE: &str = "Are you absolutely sure?";
pub const CONFIRM_MESSAGE: &str =
    "If you close this form, all unsaved changes will be lost. Are you sure you want to continue?";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CloseState {
    #[default]
    Open,
    ConfirmPending,
    Closed,
}

/// Answer to a close request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// The dialog closed
    Closed,
    /// Unsaved edits; ask the user before discarding them
    ConfirmationRequired,
    /// A submission is in flight; close controls are disabled
    Busy,
    /// Nothing to do
    AlreadyClosed,
}

#[derive(Debug, Clone, Default)]
pub struct CloseGuard {
    state: CloseState,
}

impl CloseGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CloseState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != CloseState::Closed
    }

    /// Handles a close request given whether the form has unsaved edits
    pub fn request_close(&mut self, dirty: bool) -> CloseDecision {
        match self.state {
            CloseState::Closed => CloseDecision::AlreadyClosed,
            CloseState::ConfirmPending => CloseDecision::ConfirmationRequired,
            CloseState::Open if dirty => {
                self.state = CloseState::ConfirmPending;
                debug!("Close requested with unsaved changes");
                CloseDecision::ConfirmationRequired
            }
            CloseState::Open => {
                self.state = CloseState::Closed;
                CloseDecision::Closed
            }
        }
    }

    /// The user chose to discard their edits
    pub fn confirm(&mut self) -> Result<(), CoreError> {
        match self.state {
            CloseState::ConfirmPending => {
                self.state = CloseState::Closed;
                Ok(())
            }
            other => Err(CoreError::invalid_state(format!(
                "cannot confirm close from {:?}",
                other
            ))),
        }
    }

    /// The user chose to keep editing
    pub fn cancel(&mut self) -> Result<(), CoreError> {
        match self.state {
            CloseState::ConfirmPending => {
                self.state = CloseState::Open;
                Ok(())
            }
            other => Err(CoreError::invalid_state(format!(
                "cannot cancel close from {:?}",
                other
            ))),
        }
    }

    /// Closes unconditionally, after a successful submission
    pub fn close(&mut self) {
        self.state = CloseState::Closed;
    }

    /// Opens the dialog again
    pub fn reopen(&mut self) {
        self.state = CloseState::Open;
    }
}
