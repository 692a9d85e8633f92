//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! invoice desk test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built drafts and entries, including the INV-003 scenario
//! - `builders`: Builder patterns for drafts and items
//! - `assertions`: Assertion helpers for validation results and payloads
//! - `generators`: Property-based test data generators
//! - `harness`: A session wired to the mock collaborators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;
pub mod harness;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
pub use harness::*;
