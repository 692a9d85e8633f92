//! Invoice form errors

use core_kernel::{EntryId, PortError};
use thiserror::Error;

use crate::lists::{EntryKind, ListPath};
use crate::path::FieldPath;
use crate::value::ValueKind;

/// Errors raised by form edits
///
/// These are programming errors of the caller (a binding to a field that
/// does not exist, a stale entry handle), not validation failures. Validation
/// failures are data and come back as
/// [`ValidationErrors`](crate::ValidationErrors).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    /// A dotted path named a field that does not exist
    #[error("Invalid field path: {0}")]
    InvalidPath(String),

    /// The path does not lead to a leaf of the draft
    #[error("Unknown field: {0}")]
    UnknownPath(FieldPath),

    /// The value kind does not match the leaf
    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: FieldPath,
        expected: ValueKind,
        found: ValueKind,
    },

    /// No entry with this id in the list
    #[error("No entry {id} in {list}")]
    UnknownEntry {
        list: ListPath,
        id: EntryId,
    },

    /// The list holds a different kind of entry
    #[error("Cannot add {found} to {list}: expected {expected}")]
    EntryKindMismatch {
        list: ListPath,
        expected: EntryKind,
        found: EntryKind,
    },

    /// Removal refused because the list would fall below its minimum
    #[error("{list} requires at least {min} entries")]
    MinimumEntries {
        list: ListPath,
        min: usize,
    },

    /// The dialog has been closed
    #[error("Session is closed")]
    SessionClosed,

    /// The discard prompt is showing; confirm or cancel it first
    #[error("Close confirmation is pending")]
    ConfirmationPending,

    /// The draft is locked while its create call is outstanding
    #[error("A submission is in flight")]
    SubmissionInFlight,
}

/// Errors from handing a draft to the create-invoice collaborator
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// A submission is already awaiting its response
    #[error("A submission is already in flight")]
    InFlight,

    /// The collaborator rejected the request or could not be reached
    #[error("Create invoice failed: {0}")]
    Rejected(#[from] PortError),
}

/// Errors from computing the totals preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TotalsError {
    #[error("Totals exceed the supported amount range")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::FieldName;

    #[test]
    fn test_type_mismatch_message() {
        let err = FormError::TypeMismatch {
            path: FieldPath::of(FieldName::Items).index(0).field(FieldName::Rate),
            expected: ValueKind::Number,
            found: ValueKind::Text,
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch at items.0.rate: expected number, found text"
        );
    }

    #[test]
    fn test_minimum_entries_message() {
        let err = FormError::MinimumEntries { list: ListPath::Items, min: 1 };
        assert_eq!(err.to_string(), "items requires at least 1 entries");
    }

    #[test]
    fn test_port_error_converts() {
        let err: SubmissionError = PortError::unauthorized("token expired").into();
        assert!(matches!(err, SubmissionError::Rejected(PortError::Unauthorized { .. })));
    }
}
