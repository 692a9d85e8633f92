//! Dynamic lists and stable entry identity
//!
//! Every list in the draft (addresses, documents, custom fields, extensions,
//! items and the lists nested inside items) is an [`EntryList`]. Each entry
//! gets an [`EntryId`] when it is appended. The id never changes and is never
//! reused, so removing a middle entry leaves the bindings of its siblings
//! intact even though their positions shift.
//!
//! Ids are local to one session: they are not serialised, and a list read
//! from JSON gets fresh ids.

use core_kernel::EntryId;
use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::draft::{Address, CustomField, Document, Extension, InvoiceDraft, Item};
use crate::error::FormError;
use crate::path::{FieldName, FieldPath};

/// One list entry and its handle
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub id: EntryId,
    pub value: T,
}

/// An ordered list whose entries carry stable ids
#[derive(Debug, Clone, PartialEq)]
pub struct EntryList<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for EntryList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntryList<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Appends `value` under a fresh id and returns the id
    pub fn push(&mut self, value: T) -> EntryId {
        let id = EntryId::new_v7();
        self.entries.push(Entry { id, value });
        id
    }

    /// Removes the entry with `id`, returning its former position and value
    pub fn remove(&mut self, id: EntryId) -> Option<(usize, T)> {
        let index = self.position(id)?;
        let entry = self.entries.remove(index);
        Some((index, entry.value))
    }

    /// Current position of the entry with `id`
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(|entry| &mut entry.value)
    }

    pub fn by_id(&self, id: EntryId) -> Option<&T> {
        self.entries.iter().find(|entry| entry.id == id).map(|entry| &entry.value)
    }

    pub fn by_id_mut(&mut self, id: EntryId) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .map(|entry| &mut entry.value)
    }

    /// Ids in list order, for keying rendered rows
    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|entry| &entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> FromIterator<T> for EntryList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = EntryList::new();
        for value in iter {
            list.push(value);
        }
        list
    }
}

impl<T: Serialize> Serialize for EntryList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(&entry.value)?;
        }
        seq.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for EntryList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<T>::deserialize(deserializer)?;
        Ok(values.into_iter().collect())
    }
}

/// What removing an entry may do to a list with a required minimum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovePolicy {
    /// Allow the removal; the schema reports the short list at submission
    #[default]
    FlagAtSubmit,
    /// Refuse the removal with [`FormError::MinimumEntries`]
    Block,
}

/// The kind of entry a list holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Address,
    Document,
    CustomField,
    Extension,
    Item,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntryKind::Address => "address",
            EntryKind::Document => "document",
            EntryKind::CustomField => "custom field",
            EntryKind::Extension => "extension",
            EntryKind::Item => "item",
        };
        f.write_str(name)
    }
}

/// A value to append to, or removed from, one of the lists
#[derive(Debug, Clone, PartialEq)]
pub enum ListEntry {
    Address(Address),
    Document(Document),
    CustomField(CustomField),
    Extension(Extension),
    Item(Item),
}

impl ListEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            ListEntry::Address(_) => EntryKind::Address,
            ListEntry::Document(_) => EntryKind::Document,
            ListEntry::CustomField(_) => EntryKind::CustomField,
            ListEntry::Extension(_) => EntryKind::Extension,
            ListEntry::Item(_) => EntryKind::Item,
        }
    }
}

/// Names one of the dynamic lists
///
/// Lists nested in an item are addressed through the item's id, so the
/// handle stays valid while other items are added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListPath {
    Addresses,
    Documents,
    CustomFields,
    Extensions,
    Items,
    ItemCustomFields(EntryId),
    ItemExtensions(EntryId),
}

impl ListPath {
    /// The kind of entry the list accepts
    pub fn kind(&self) -> EntryKind {
        match self {
            ListPath::Addresses => EntryKind::Address,
            ListPath::Documents => EntryKind::Document,
            ListPath::CustomFields | ListPath::ItemCustomFields(_) => EntryKind::CustomField,
            ListPath::Extensions | ListPath::ItemExtensions(_) => EntryKind::Extension,
            ListPath::Items => EntryKind::Item,
        }
    }

    /// Entries the schema requires at submission
    pub fn min_entries(&self) -> usize {
        match self {
            ListPath::Addresses | ListPath::Items => 1,
            _ => 0,
        }
    }

    /// The positional path of the list in `draft`
    pub fn field_path(&self, draft: &InvoiceDraft) -> Result<FieldPath, FormError> {
        let path = match self {
            ListPath::Addresses => FieldPath::of(FieldName::Customer).field(FieldName::Addresses),
            ListPath::Documents => FieldPath::of(FieldName::Documents),
            ListPath::CustomFields => FieldPath::of(FieldName::CustomFields),
            ListPath::Extensions => FieldPath::of(FieldName::Extensions),
            ListPath::Items => FieldPath::of(FieldName::Items),
            ListPath::ItemCustomFields(item) => {
                FieldPath::of(FieldName::Items)
                    .index(draft.item_position(*item)?)
                    .field(FieldName::CustomFields)
            }
            ListPath::ItemExtensions(item) => {
                FieldPath::of(FieldName::Items)
                    .index(draft.item_position(*item)?)
                    .field(FieldName::Extensions)
            }
        };
        Ok(path)
    }
}

impl fmt::Display for ListPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListPath::Addresses => f.write_str("customer.addresses"),
            ListPath::Documents => f.write_str("documents"),
            ListPath::CustomFields => f.write_str("customFields"),
            ListPath::Extensions => f.write_str("extensions"),
            ListPath::Items => f.write_str("items"),
            ListPath::ItemCustomFields(item) => write!(f, "items[{}].customFields", item),
            ListPath::ItemExtensions(item) => write!(f, "items[{}].extensions", item),
        }
    }
}

impl InvoiceDraft {
    /// Appends `entry` to `list` under a fresh id
    pub fn append(&mut self, list: ListPath, entry: ListEntry) -> Result<EntryId, FormError> {
        let id = match (list, entry) {
            (ListPath::Addresses, ListEntry::Address(v)) => self.customer.addresses.push(v),
            (ListPath::Documents, ListEntry::Document(v)) => self.documents.push(v),
            (ListPath::CustomFields, ListEntry::CustomField(v)) => self.custom_fields.push(v),
            (ListPath::Extensions, ListEntry::Extension(v)) => self.extensions.push(v),
            (ListPath::Items, ListEntry::Item(v)) => self.items.push(v),
            (ListPath::ItemCustomFields(item), ListEntry::CustomField(v)) => {
                self.item_mut(item)?.custom_fields.push(v)
            }
            (ListPath::ItemExtensions(item), ListEntry::Extension(v)) => {
                self.item_mut(item)?.extensions.push(v)
            }
            (list, entry) => {
                return Err(FormError::EntryKindMismatch {
                    list,
                    expected: list.kind(),
                    found: entry.kind(),
                })
            }
        };
        Ok(id)
    }

    /// Removes the entry `id` from `list`
    ///
    /// Returns the position the entry held and its value. The ids of the
    /// remaining entries are untouched.
    pub fn remove(&mut self, list: ListPath, id: EntryId) -> Result<(usize, ListEntry), FormError> {
        let removed = match list {
            ListPath::Addresses => self
                .customer
                .addresses
                .remove(id)
                .map(|(i, v)| (i, ListEntry::Address(v))),
            ListPath::Documents => self.documents.remove(id).map(|(i, v)| (i, ListEntry::Document(v))),
            ListPath::CustomFields => self
                .custom_fields
                .remove(id)
                .map(|(i, v)| (i, ListEntry::CustomField(v))),
            ListPath::Extensions => self.extensions.remove(id).map(|(i, v)| (i, ListEntry::Extension(v))),
            ListPath::Items => self.items.remove(id).map(|(i, v)| (i, ListEntry::Item(v))),
            ListPath::ItemCustomFields(item) => self
                .item_mut(item)?
                .custom_fields
                .remove(id)
                .map(|(i, v)| (i, ListEntry::CustomField(v))),
            ListPath::ItemExtensions(item) => self
                .item_mut(item)?
                .extensions
                .remove(id)
                .map(|(i, v)| (i, ListEntry::Extension(v))),
        };
        removed.ok_or(FormError::UnknownEntry { list, id })
    }

    /// Current position of entry `id` in `list`
    pub fn position(&self, list: ListPath, id: EntryId) -> Result<usize, FormError> {
        let position = match list {
            ListPath::Addresses => self.customer.addresses.position(id),
            ListPath::Documents => self.documents.position(id),
            ListPath::CustomFields => self.custom_fields.position(id),
            ListPath::Extensions => self.extensions.position(id),
            ListPath::Items => self.items.position(id),
            ListPath::ItemCustomFields(item) => self.item(item)?.custom_fields.position(id),
            ListPath::ItemExtensions(item) => self.item(item)?.extensions.position(id),
        };
        position.ok_or(FormError::UnknownEntry { list, id })
    }

    /// Number of entries in `list`
    pub fn entry_count(&self, list: ListPath) -> Result<usize, FormError> {
        let len = match list {
            ListPath::Addresses => self.customer.addresses.len(),
            ListPath::Documents => self.documents.len(),
            ListPath::CustomFields => self.custom_fields.len(),
            ListPath::Extensions => self.extensions.len(),
            ListPath::Items => self.items.len(),
            ListPath::ItemCustomFields(item) => self.item(item)?.custom_fields.len(),
            ListPath::ItemExtensions(item) => self.item(item)?.extensions.len(),
        };
        Ok(len)
    }

    pub(crate) fn item_position(&self, item: EntryId) -> Result<usize, FormError> {
        self.items.position(item).ok_or(FormError::UnknownEntry {
            list: ListPath::Items,
            id: item,
        })
    }

    fn item(&self, item: EntryId) -> Result<&Item, FormError> {
        self.items.by_id(item).ok_or(FormError::UnknownEntry {
            list: ListPath::Items,
            id: item,
        })
    }

    fn item_mut(&mut self, item: EntryId) -> Result<&mut Item, FormError> {
        self.items.by_id_mut(item).ok_or(FormError::UnknownEntry {
            list: ListPath::Items,
            id: item,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn named_item(name: &str) -> Item {
        Item {
            item_name: name.to_string(),
            ..Item::default()
        }
    }

    #[test]
    fn test_push_assigns_distinct_ids() {
        let mut list = EntryList::new();
        let a = list.push(1);
        let b = list.push(2);
        assert_ne!(a, b);
        assert_eq!(list.ids().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_remove_middle_keeps_sibling_ids() {
        let mut list = EntryList::new();
        let a = list.push("a");
        let b = list.push("b");
        let c = list.push("c");

        assert_eq!(list.remove(b), Some((1, "b")));
        assert_eq!(list.ids().collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(list.by_id(c), Some(&"c"));
        assert_eq!(list.position(c), Some(1));
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut list: EntryList<u8> = EntryList::new();
        assert_eq!(list.remove(EntryId::new()), None);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let list: EntryList<CustomField> = vec![CustomField::new("po", "123")].into_iter().collect();
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json, serde_json::json!([{"key": "po", "value": "123"}]));
    }

    #[test]
    fn test_append_to_nested_item_list() {
        let mut draft = InvoiceDraft::new();
        let item = draft.append(ListPath::Items, ListEntry::Item(named_item("Widget"))).unwrap();
        let ext = draft
            .append(
                ListPath::ItemExtensions(item),
                ListEntry::Extension(Extension { value: dec!(5), ..Extension::default() }),
            )
            .unwrap();

        assert_eq!(draft.position(ListPath::ItemExtensions(item), ext).unwrap(), 0);
        assert_eq!(
            ListPath::ItemExtensions(item).field_path(&draft).unwrap().to_string(),
            "items.0.extensions"
        );
    }

    #[test]
    fn test_append_wrong_kind_is_rejected() {
        let mut draft = InvoiceDraft::new();
        let result = draft.append(ListPath::Items, ListEntry::CustomField(CustomField::default()));

        assert!(matches!(
            result,
            Err(FormError::EntryKindMismatch { expected: EntryKind::Item, found: EntryKind::CustomField, .. })
        ));
        assert!(draft.items.is_empty());
    }

    #[test]
    fn test_nested_list_of_unknown_item() {
        let mut draft = InvoiceDraft::new();
        let ghost = EntryId::new();
        let result = draft.append(ListPath::ItemCustomFields(ghost), ListEntry::CustomField(CustomField::default()));
        assert!(matches!(result, Err(FormError::UnknownEntry { list: ListPath::Items, id }) if id == ghost));
    }

    #[test]
    fn test_remove_returns_position_and_value() {
        let mut draft = InvoiceDraft::new();
        draft.append(ListPath::Items, ListEntry::Item(named_item("A"))).unwrap();
        let b = draft.append(ListPath::Items, ListEntry::Item(named_item("B"))).unwrap();

        let (index, entry) = draft.remove(ListPath::Items, b).unwrap();
        assert_eq!(index, 1);
        assert_eq!(entry, ListEntry::Item(named_item("B")));
        assert_eq!(draft.entry_count(ListPath::Items).unwrap(), 1);
    }
}
