//! Create-invoice session
//!
//! One open dialog: the form, the submission tracker and the close guard
//! behind a single lock. Every operation except [`submit`] completes without
//! suspending. `submit` releases the lock before awaiting the create call, so
//! the dialog stays responsive and a second submit is refused rather than
//! queued.
//!
//! [`submit`]: CreateInvoiceSession::submit

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use core_kernel::{CoreError, EntryId, SessionId};

use crate::draft::InvoiceDraft;
use crate::error::FormError;
use crate::form::InvoiceForm;
use crate::guard::{CloseDecision, CloseGuard, CloseState};
use crate::lists::{ListEntry, ListPath, RemovePolicy};
use crate::path::{FieldPath, PathSegment};
use crate::schema::{ValidationErrors, INVOICE_SCHEMA};
use crate::submission::{SubmissionPhase, SubmissionPipeline, SubmissionTracker, SubmitOutcome};
use crate::value::FieldValue;

#[derive(Debug)]
struct SessionState {
    form: InvoiceForm,
    tracker: SubmissionTracker,
    guard: CloseGuard,
    shown: ValidationErrors,
}

pub struct CreateInvoiceSession {
    id: SessionId,
    state: Mutex<SessionState>,
    pipeline: SubmissionPipeline,
}

impl std::fmt::Debug for CreateInvoiceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateInvoiceSession")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Returns the tracker to Idle if `submit` is dropped mid-flight
struct AttemptGuard<'a> {
    session: &'a CreateInvoiceSession,
    settled: bool,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(session_id = %self.session.id, "Submission abandoned before a response");
            self.session.lock().tracker.abandon();
        }
    }
}

impl CreateInvoiceSession {
    /// Opens a session over an empty draft
    pub fn new(pipeline: SubmissionPipeline, remove_policy: RemovePolicy) -> Self {
        let id = SessionId::new_v7();
        debug!(session_id = %id, "Create invoice session opened");
        Self {
            id,
            state: Mutex::new(SessionState {
                form: InvoiceForm::with_policy(remove_policy),
                tracker: SubmissionTracker::new(),
                guard: CloseGuard::new(),
                shown: ValidationErrors::new(),
            }),
            pipeline,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the state for an edit
    ///
    /// Edits need an open dialog with no discard prompt showing and no
    /// create call outstanding.
    fn open_state(&self) -> Result<MutexGuard<'_, SessionState>, FormError> {
        let state = self.lock();
        match state.guard.state() {
            CloseState::Closed => Err(FormError::SessionClosed),
            CloseState::ConfirmPending => Err(FormError::ConfirmationPending),
            CloseState::Open if state.tracker.is_in_flight() => Err(FormError::SubmissionInFlight),
            CloseState::Open => Ok(state),
        }
    }

    /// Writes one leaf of the draft
    ///
    /// After the first submit attempt, the errors shown are recomputed on
    /// every edit so they clear as the user fixes them.
    pub fn set_field(&self, path: &FieldPath, value: impl Into<FieldValue>) -> Result<(), FormError> {
        let mut state = self.open_state()?;
        state.form.set_field(path, value)?;
        state.revalidate();
        Ok(())
    }

    pub fn append(&self, list: ListPath, entry: ListEntry) -> Result<EntryId, FormError> {
        let mut state = self.open_state()?;
        let id = state.form.append(list, entry)?;
        state.revalidate();
        Ok(id)
    }

    pub fn remove(&self, list: ListPath, id: EntryId) -> Result<ListEntry, FormError> {
        let mut state = self.open_state()?;
        let entry = state.form.remove(list, id)?;
        state.revalidate();
        Ok(entry)
    }

    /// Enters every value of `draft` through the form operations
    ///
    /// Scalar fields are written one at a time and list entries appended, so
    /// the result is the same as a user typing the draft in by hand. Fails
    /// on the first operation that fails; earlier writes stay.
    pub fn fill(&self, draft: &InvoiceDraft) -> Result<(), FormError> {
        let mut state = self.open_state()?;
        for (path, _) in INVOICE_SCHEMA.leaves(draft) {
            let outside_lists = path
                .segments()
                .iter()
                .all(|segment| matches!(segment, PathSegment::Field(_)));
            if outside_lists {
                state.form.set_field(&path, draft.get(&path)?)?;
            }
        }
        for address in draft.customer.addresses.values() {
            state.form.append(ListPath::Addresses, ListEntry::Address(address.clone()))?;
        }
        for document in draft.documents.values() {
            state.form.append(ListPath::Documents, ListEntry::Document(document.clone()))?;
        }
        for field in draft.custom_fields.values() {
            state.form.append(ListPath::CustomFields, ListEntry::CustomField(field.clone()))?;
        }
        for extension in draft.extensions.values() {
            state.form.append(ListPath::Extensions, ListEntry::Extension(extension.clone()))?;
        }
        for item in draft.items.values() {
            state.form.append(ListPath::Items, ListEntry::Item(item.clone()))?;
        }
        state.revalidate();
        Ok(())
    }

    pub fn value(&self, path: &FieldPath) -> Result<FieldValue, FormError> {
        self.lock().form.value(path)
    }

    /// Runs the schema over the current draft without submitting
    pub fn validate(&self) -> ValidationErrors {
        self.lock().form.validate()
    }

    /// Errors currently shown inline (empty until the first submit attempt)
    pub fn errors(&self) -> ValidationErrors {
        self.lock().shown.clone()
    }

    /// Snapshot of the draft
    pub fn draft(&self) -> InvoiceDraft {
        self.lock().form.draft().clone()
    }

    /// Read access to the whole form
    pub fn with_form<R>(&self, read: impl FnOnce(&InvoiceForm) -> R) -> R {
        read(&self.lock().form)
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().form.is_dirty()
    }

    pub fn is_open(&self) -> bool {
        self.lock().guard.is_open()
    }

    pub fn close_state(&self) -> CloseState {
        self.lock().guard.state()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.lock().tracker.phase()
    }

    /// Validates, then hands the draft to the create-invoice collaborator
    ///
    /// At most one create call is in flight per session. On success the
    /// form is reset and the session closes; on failure every value stays.
    pub async fn submit(&self) -> SubmitOutcome {
        let draft = {
            let mut state = self.lock();
            match state.guard.state() {
                CloseState::Closed => return SubmitOutcome::Closed,
                CloseState::ConfirmPending => return SubmitOutcome::ConfirmationPending,
                CloseState::Open => {}
            }
            if state.tracker.begin().is_err() {
                warn!(session_id = %self.id, "Submit ignored, a submission is already in flight");
                return SubmitOutcome::InFlight;
            }

            let errors = state.form.validate();
            state.shown = errors.clone();
            if !errors.is_empty() {
                state.tracker.reject();
                debug!(session_id = %self.id, errors = errors.len(), "Submit blocked by validation");
                return SubmitOutcome::Invalid(errors);
            }

            state.tracker.dispatch();
            state.form.draft().clone()
        };

        let mut attempt = AttemptGuard {
            session: self,
            settled: false,
        };
        let result = self.pipeline.dispatch(draft).await;
        attempt.settled = true;

        let mut state = self.lock();
        match result {
            Ok(()) => {
                state.discard();
                state.guard.close();
                info!(session_id = %self.id, "Invoice submitted, session closed");
                SubmitOutcome::Created
            }
            Err(_) => {
                state.tracker.settle(false);
                SubmitOutcome::Failed
            }
        }
    }

    /// Handles the dialog's close control
    pub fn request_close(&self) -> CloseDecision {
        let mut state = self.lock();
        if state.tracker.is_in_flight() {
            return CloseDecision::Busy;
        }
        let dirty = state.form.is_dirty();
        let decision = state.guard.request_close(dirty);
        if decision == CloseDecision::Closed {
            state.discard();
            info!(session_id = %self.id, "Session closed");
        }
        decision
    }

    /// Discards the draft after the user confirmed
    pub fn confirm_close(&self) -> Result<(), CoreError> {
        let mut state = self.lock();
        state.guard.confirm()?;
        state.discard();
        info!(session_id = %self.id, "Unsaved changes discarded, session closed");
        Ok(())
    }

    /// Keeps editing; draft and dirty flag are untouched
    pub fn cancel_close(&self) -> Result<(), CoreError> {
        self.lock().guard.cancel()
    }

    /// Opens the dialog again over an empty draft
    pub fn reopen(&self) {
        let mut state = self.lock();
        if !state.guard.is_open() {
            state.discard();
            state.guard.reopen();
            debug!(session_id = %self.id, "Session reopened");
        }
    }
}

impl SessionState {
    fn revalidate(&mut self) {
        if self.tracker.last().is_some() {
            self.shown = self.form.validate();
        }
    }

    fn discard(&mut self) {
        self.form.reset();
        self.shown = ValidationErrors::new();
        self.tracker = SubmissionTracker::new();
    }
}
