//! Invoice Creation Domain
//!
//! This crate holds everything behind the "Create Invoice" dialog that is not
//! rendering: the nested draft, its validation rules, the form state that
//! tracks edits, and the submit/close state machines.
//!
//! # Components
//!
//! - **Draft** ([`draft`]): the invoice being edited, serialised field-for-field
//!   as the backend expects it
//! - **Schema** ([`schema`]): declarative rules producing a [`ValidationErrors`]
//!   set keyed by [`FieldPath`]
//! - **Form** ([`form`]): current values, touched paths and the sticky dirty flag
//! - **Lists** ([`lists`]): append/remove on the dynamic lists, addressed by
//!   stable [`EntryId`](core_kernel::EntryId) handles
//! - **Submission** ([`submission`]): validate, then hand the draft to the
//!   create-invoice collaborator exactly once
//! - **Guard** ([`guard`]): a dirty draft is never discarded without confirmation
//! - **Session** ([`session`]): one open dialog tying the above together
//!
//! Supporting modules cover the invoice list view ([`listing`]), the login form
//! ([`login`]) and a totals preview ([`totals`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_invoice::{CreateInvoiceSession, FieldName, FieldPath, SubmitOutcome};
//!
//! let session = CreateInvoiceSession::new(pipeline, RemovePolicy::default());
//! session.set_field(&FieldPath::of(FieldName::InvoiceNumber), "INV-003")?;
//!
//! match session.submit().await {
//!     SubmitOutcome::Invalid(errors) => show_inline(errors),
//!     SubmitOutcome::Created => close_dialog(),
//!     _ => {}
//! }
//! ```

pub mod path;
pub mod value;
pub mod draft;
pub mod lists;
pub mod schema;
pub mod form;
pub mod submission;
pub mod guard;
pub mod session;
pub mod ports;
pub mod listing;
pub mod login;
pub mod totals;
pub mod error;

pub use path::{FieldName, FieldPath, PathSegment};
pub use value::{FieldValue, ValueKind};
pub use draft::{
    InvoiceDraft, Customer, Contact, Address, BankAccount, Document, CustomField,
    Extension, AddDeduct, ExtensionType, Item,
};
pub use lists::{Entry, EntryList, EntryKind, ListEntry, ListPath, RemovePolicy};
pub use schema::{Schema, FieldSource, ValidationErrors, INVOICE_SCHEMA};
pub use form::InvoiceForm;
pub use submission::{SubmissionPipeline, SubmissionPhase, SubmissionTracker, AttemptResult, SubmitOutcome};
pub use guard::{CloseGuard, CloseState, CloseDecision};
pub use session::CreateInvoiceSession;
pub use ports::{
    InvoicePort, ListRefresh, Notifier, TokenProvider, Notification, Severity,
    CreateInvoiceRequest,
};
pub use listing::{InvoiceQuery, InvoiceListState, InvoicePage, InvoiceSummary, Paging, SortBy, SortDirection, RefreshTrigger};
pub use login::{LoginForm, LOGIN_SCHEMA};
pub use totals::DraftTotals;
pub use error::{FormError, SubmissionError, TotalsError};
