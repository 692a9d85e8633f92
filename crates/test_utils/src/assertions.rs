//! Custom Test Assertions
//!
//! Provides assertion helpers for validation results and create payloads
//! that give more meaningful failure messages than bare `assert!`.

use domain_invoice::{CreateInvoiceRequest, FieldPath, InvoiceDraft, ValidationErrors};

/// Asserts that `errors` is empty, listing every message otherwise
pub fn assert_no_errors(errors: &ValidationErrors) {
    assert!(
        errors.is_empty(),
        "Expected no validation errors, got: {}",
        describe(errors)
    );
}

/// Asserts that `path` carries `message` among its messages
pub fn assert_has_error(errors: &ValidationErrors, path: &str, message: &str) {
    let parsed: FieldPath = path
        .parse()
        .unwrap_or_else(|e| panic!("Invalid path in assertion {:?}: {}", path, e));
    assert!(
        errors.messages(&parsed).iter().any(|m| m == message),
        "Expected {:?} at {}, got: {}",
        message,
        path,
        describe(errors)
    );
}

/// Asserts that `path` has at least one error
pub fn assert_error_at(errors: &ValidationErrors, path: &FieldPath) {
    assert!(
        errors.contains(path),
        "Expected an error at {}, got: {}",
        path,
        describe(errors)
    );
}

/// Asserts the request carries exactly one draft and returns it
pub fn assert_single_invoice(request: &CreateInvoiceRequest) -> &InvoiceDraft {
    assert_eq!(
        request.invoices.len(),
        1,
        "Expected exactly one invoice in the create request, got {}",
        request.invoices.len()
    );
    &request.invoices[0]
}

fn describe(errors: &ValidationErrors) -> String {
    let parts: Vec<String> = errors
        .iter()
        .map(|(path, messages)| format!("{} => {:?}", path, messages))
        .collect();
    format!("[{}]", parts.join(", "))
}
