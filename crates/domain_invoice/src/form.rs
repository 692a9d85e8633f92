//! Form state controller
//!
//! [`InvoiceForm`] owns the current, possibly invalid, draft. It tracks
//! which paths the user has touched and whether the draft has ever moved
//! away from its initial state. Validation is recomputed from the draft on
//! every call; nothing is cached.

use core_kernel::EntryId;
use std::collections::BTreeSet;
use tracing::debug;

use crate::draft::InvoiceDraft;
use crate::error::FormError;
use crate::lists::{ListEntry, ListPath, RemovePolicy};
use crate::path::FieldPath;
use crate::schema::{ValidationErrors, INVOICE_SCHEMA};
use crate::value::FieldValue;

/// Editable state of one create-invoice dialog
#[derive(Debug, Clone)]
pub struct InvoiceForm {
    draft: InvoiceDraft,
    initial: InvoiceDraft,
    dirty: bool,
    touched: BTreeSet<FieldPath>,
    remove_policy: RemovePolicy,
}

impl Default for InvoiceForm {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceForm {
    /// Creates a form over an empty draft
    pub fn new() -> Self {
        Self::with_policy(RemovePolicy::default())
    }

    pub fn with_policy(remove_policy: RemovePolicy) -> Self {
        Self {
            draft: InvoiceDraft::new(),
            initial: InvoiceDraft::new(),
            dirty: false,
            touched: BTreeSet::new(),
            remove_policy,
        }
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn remove_policy(&self) -> RemovePolicy {
        self.remove_policy
    }

    /// Reads the leaf at `path`
    pub fn value(&self, path: &FieldPath) -> Result<FieldValue, FormError> {
        self.draft.get(path)
    }

    /// Writes one leaf and marks it touched
    pub fn set_field(&mut self, path: &FieldPath, value: impl Into<FieldValue>) -> Result<(), FormError> {
        self.draft.set(path, value.into())?;
        self.touched.insert(path.clone());
        self.mark_if_changed();
        debug!(path = %path, dirty = self.dirty, "Field updated");
        Ok(())
    }

    /// Marks `path` touched without changing it (the field lost focus)
    pub fn touch(&mut self, path: &FieldPath) -> Result<(), FormError> {
        self.draft.get(path)?;
        self.touched.insert(path.clone());
        Ok(())
    }

    pub fn is_touched(&self, path: &FieldPath) -> bool {
        self.touched.contains(path)
    }

    pub fn touched(&self) -> impl Iterator<Item = &FieldPath> {
        self.touched.iter()
    }

    /// Runs the invoice schema against the current draft
    pub fn validate(&self) -> ValidationErrors {
        INVOICE_SCHEMA.validate(&self.draft)
    }

    /// Clears every value, the touched set and the dirty flag
    pub fn reset(&mut self) {
        self.draft = self.initial.clone();
        self.touched.clear();
        self.dirty = false;
        debug!("Form reset");
    }

    /// True once any edit has moved the draft away from its initial state
    ///
    /// Editing a field back to its initial value does not clear the flag;
    /// only [`reset`](InvoiceForm::reset) does.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Appends `entry` to `list` and returns its stable id
    pub fn append(&mut self, list: ListPath, entry: ListEntry) -> Result<EntryId, FormError> {
        let id = self.draft.append(list, entry)?;
        self.mark_if_changed();
        debug!(list = %list, entry = %id, "List entry appended");
        Ok(id)
    }

    /// Removes entry `id` from `list`
    ///
    /// Touched paths inside the removed entry are dropped and those of later
    /// siblings move down with their entries.
    pub fn remove(&mut self, list: ListPath, id: EntryId) -> Result<ListEntry, FormError> {
        let list_path = list.field_path(&self.draft)?;
        let min = list.min_entries();
        if self.remove_policy == RemovePolicy::Block
            && self.draft.position(list, id).is_ok()
            && self.draft.entry_count(list)? <= min
        {
            return Err(FormError::MinimumEntries { list, min });
        }

        let (index, entry) = self.draft.remove(list, id)?;
        self.touched = std::mem::take(&mut self.touched)
            .into_iter()
            .filter_map(|path| path.after_removal(&list_path, index))
            .collect();
        self.mark_if_changed();
        debug!(list = %list, entry = %id, index, "List entry removed");
        Ok(entry)
    }

    /// Current position of entry `id`, for building field paths
    pub fn position(&self, list: ListPath, id: EntryId) -> Result<usize, FormError> {
        self.draft.position(list, id)
    }

    fn mark_if_changed(&mut self) {
        if !self.dirty && self.draft != self.initial {
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{Address, Item};
    use crate::path::FieldName;
    use rust_decimal_macros::dec;

    fn number() -> FieldPath {
        FieldPath::of(FieldName::InvoiceNumber)
    }

    fn item_rate(index: usize) -> FieldPath {
        FieldPath::of(FieldName::Items).index(index).field(FieldName::Rate)
    }

    #[test]
    fn test_new_form_is_clean() {
        let form = InvoiceForm::new();
        assert!(!form.is_dirty());
        assert_eq!(form.draft(), &InvoiceDraft::new());
    }

    #[test]
    fn test_set_field_marks_dirty_and_touched() {
        let mut form = InvoiceForm::new();
        form.set_field(&number(), "INV-1").unwrap();

        assert!(form.is_dirty());
        assert!(form.is_touched(&number()));
        assert_eq!(form.value(&number()).unwrap(), FieldValue::from("INV-1"));
    }

    #[test]
    fn test_setting_initial_value_is_not_dirty() {
        let mut form = InvoiceForm::new();
        form.set_field(&number(), "").unwrap();
        assert!(!form.is_dirty());
        assert!(form.is_touched(&number()));
    }

    #[test]
    fn test_dirty_is_sticky_until_reset() {
        let mut form = InvoiceForm::new();
        form.set_field(&number(), "INV-1").unwrap();
        form.set_field(&number(), "").unwrap();
        assert!(form.is_dirty());

        form.reset();
        assert!(!form.is_dirty());
        assert!(!form.is_touched(&number()));
        assert_eq!(form.draft(), &InvoiceDraft::new());
    }

    #[test]
    fn test_failed_set_changes_nothing() {
        let mut form = InvoiceForm::new();
        let result = form.set_field(&item_rate(0), dec!(3));

        assert!(matches!(result, Err(FormError::UnknownPath(_))));
        assert!(!form.is_dirty());
        assert!(!form.is_touched(&item_rate(0)));
    }

    #[test]
    fn test_validate_does_not_block_edits() {
        let mut form = InvoiceForm::new();
        assert!(!form.validate().is_empty());
        form.set_field(&number(), "INV-1").unwrap();
        assert!(!form.validate().contains(&number()));
    }

    #[test]
    fn test_remove_rebases_touched_paths() {
        let mut form = InvoiceForm::new();
        let a = form.append(ListPath::Items, ListEntry::Item(Item::default())).unwrap();
        let b = form.append(ListPath::Items, ListEntry::Item(Item::default())).unwrap();
        let c = form.append(ListPath::Items, ListEntry::Item(Item::default())).unwrap();
        form.set_field(&item_rate(1), dec!(2)).unwrap();
        form.set_field(&item_rate(2), dec!(7)).unwrap();

        form.remove(ListPath::Items, b).unwrap();

        assert_eq!(form.position(ListPath::Items, a).unwrap(), 0);
        assert_eq!(form.position(ListPath::Items, c).unwrap(), 1);
        assert!(form.is_touched(&item_rate(1)));
        assert!(!form.is_touched(&item_rate(2)));
        assert_eq!(form.value(&item_rate(1)).unwrap(), FieldValue::from(dec!(7)));
    }

    #[test]
    fn test_flag_at_submit_allows_emptying_required_list() {
        let mut form = InvoiceForm::new();
        let id = form.append(ListPath::Addresses, ListEntry::Address(Address::default())).unwrap();

        form.remove(ListPath::Addresses, id).unwrap();

        let errors = form.validate();
        let addresses = FieldPath::of(FieldName::Customer).field(FieldName::Addresses);
        assert_eq!(errors.get(&addresses), Some("At least one address is required"));
    }

    #[test]
    fn test_block_policy_keeps_last_entry() {
        let mut form = InvoiceForm::with_policy(RemovePolicy::Block);
        let first = form.append(ListPath::Items, ListEntry::Item(Item::default())).unwrap();

        let result = form.remove(ListPath::Items, first);
        assert_eq!(result, Err(FormError::MinimumEntries { list: ListPath::Items, min: 1 }));
        assert_eq!(form.draft().items.len(), 1);

        let second = form.append(ListPath::Items, ListEntry::Item(Item::default())).unwrap();
        assert!(form.remove(ListPath::Items, second).is_ok());
    }

    #[test]
    fn test_block_policy_reports_unknown_entry_first() {
        let mut form = InvoiceForm::with_policy(RemovePolicy::Block);
        let ghost = EntryId::new();
        let result = form.remove(ListPath::Items, ghost);
        assert_eq!(result, Err(FormError::UnknownEntry { list: ListPath::Items, id: ghost }));
    }

    #[test]
    fn test_append_marks_dirty() {
        let mut form = InvoiceForm::new();
        form.append(ListPath::Items, ListEntry::Item(Item::default())).unwrap();
        assert!(form.is_dirty());
    }
}
