//! Tests for core_kernel error types

use core_kernel::currency::{Currency, CurrencyError};
use core_kernel::error::CoreError;

#[test]
fn test_core_error_invalid_state() {
    let error = CoreError::invalid_state("cannot confirm close from Open");

    match error {
        CoreError::InvalidStateTransition(ref msg) => assert!(msg.contains("confirm close")),
    }
    assert_eq!(error.to_string(), "Invalid state transition: cannot confirm close from Open");
}

#[test]
fn test_unsupported_currency_code() {
    let error = "XYZ".parse::<Currency>().unwrap_err();

    assert_eq!(error, CurrencyError::Unsupported("XYZ".to_string()));
}
