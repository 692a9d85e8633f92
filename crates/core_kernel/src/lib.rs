//! Core Kernel - Foundational types shared by the invoice desk crates
//!
//! This crate provides the building blocks used by the domain and adapter crates:
//! - Strongly-typed identifiers for sessions and list entries
//! - The fixed set of invoice currencies
//! - The error type every external collaborator reports through

pub mod currency;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use currency::{Currency, CurrencyError};
pub use identifiers::{EntryId, SessionId, RequestId};
pub use ports::{DomainPort, PortError, OperationMetadata};
pub use error::CoreError;
