//! HTTP Infrastructure Layer
//!
//! `reqwest` adapters for the collaborators the invoice domain defines as
//! ports. The domain never sees a status code: every transport failure is
//! mapped to a [`PortError`](core_kernel::PortError) here.
//!
//! # Adapters
//!
//! - [`HttpInvoiceAdapter`]: `InvoicePort` over the invoice service
//! - [`AuthClient`]: password-grant login and the profile lookup that yields
//!   the organisation token
//! - [`SessionTokens`]: in-memory token store read by the adapters through
//!   `TokenProvider`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_http::{AuthClient, ClientConfig, HttpInvoiceAdapter, SessionTokens};
//!
//! let config = ClientConfig::load()?;
//! let tokens = Arc::new(SessionTokens::new());
//! AuthClient::new(&config, tokens.clone())?.login(&LoginForm::new(user, pass)).await?;
//!
//! let invoices: Arc<dyn InvoicePort> = Arc::new(HttpInvoiceAdapter::new(&config, tokens)?);
//! ```

pub mod config;
pub mod error;
pub mod client;
pub mod auth;

pub use config::ClientConfig;
pub use error::HttpError;
pub use client::HttpInvoiceAdapter;
pub use auth::{AuthClient, SessionTokens};
