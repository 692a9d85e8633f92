//! The invoice draft
//!
//! [`InvoiceDraft`] is the in-progress invoice owned by one creation session.
//! Its JSON form is the contract with the backend and is kept field-for-field:
//! camelCase keys, nested `customer`/`bankAccount` objects and plain arrays
//! for every list. Entry handles never reach the wire.
//!
//! Every field may be empty or out of range while the user is typing; the
//! [`schema`](crate::schema) decides what is acceptable at submission.

use chrono::NaiveDate;
use core_kernel::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FormError;
use crate::lists::EntryList;
use crate::path::{FieldName, FieldPath, PathSegment};
use crate::schema::FieldSource;
use crate::value::{FieldValue, ValueKind};

/// Whether an extension adds to or deducts from the amount it applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddDeduct {
    #[default]
    Add,
    Deduct,
}

/// How an extension value is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionType {
    /// An absolute amount in the invoice currency
    #[default]
    FixedValue,
    /// A percentage of the amount the extension applies to
    Percentage,
}

/// The invoice being created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceDraft {
    pub bank_account: BankAccount,
    pub customer: Customer,
    #[serde(skip_serializing_if = "EntryList::is_empty")]
    pub documents: EntryList<Document>,
    pub invoice_reference: String,
    pub invoice_number: String,
    pub currency: Option<Currency>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub description: String,
    #[serde(skip_serializing_if = "EntryList::is_empty")]
    pub custom_fields: EntryList<CustomField>,
    #[serde(skip_serializing_if = "EntryList::is_empty")]
    pub extensions: EntryList<Extension>,
    pub items: EntryList<Item>,
}

/// The customer being billed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub contact: Contact,
    pub addresses: EntryList<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub email: String,
    pub mobile_number: String,
}

/// A customer address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub premise: String,
    pub country_code: String,
    pub postcode: String,
    pub county: String,
    pub city: String,
    pub address_type: String,
}

/// Optional text is either absent or non-empty, as the form keeps it
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.is_empty()))
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// The account the customer pays into
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankAccount {
    #[serde(skip_serializing_if = "is_blank", deserialize_with = "blank_as_none")]
    pub bank_id: Option<String>,
    pub sort_code: String,
    pub account_number: String,
    pub account_name: String,
}

/// A document attached to the invoice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    #[serde(skip_serializing_if = "is_blank", deserialize_with = "blank_as_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "is_blank", deserialize_with = "blank_as_none")]
    pub document_name: Option<String>,
    #[serde(skip_serializing_if = "is_blank", deserialize_with = "blank_as_none")]
    pub document_url: Option<String>,
}

/// A free-form key/value pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomField {
    pub key: String,
    pub value: String,
}

impl CustomField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A named charge or discount on the invoice or on one item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Extension {
    pub add_deduct: AddDeduct,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    #[serde(rename = "type")]
    pub kind: ExtensionType,
    pub name: String,
}

impl Extension {
    pub fn new(name: impl Into<String>, add_deduct: AddDeduct, kind: ExtensionType, value: Decimal) -> Self {
        Self {
            add_deduct,
            value,
            kind,
            name: name.into(),
        }
    }
}

/// A line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    #[serde(skip_serializing_if = "is_blank", deserialize_with = "blank_as_none")]
    pub item_reference: Option<String>,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    pub item_name: String,
    #[serde(rename = "itemUOM")]
    pub item_uom: String,
    #[serde(skip_serializing_if = "EntryList::is_empty")]
    pub custom_fields: EntryList<CustomField>,
    #[serde(skip_serializing_if = "EntryList::is_empty")]
    pub extensions: EntryList<Extension>,
}

impl Default for Item {
    /// A fresh line: quantity 1, rate 0, everything else empty
    fn default() -> Self {
        Self {
            item_reference: None,
            description: String::new(),
            quantity: Decimal::ONE,
            rate: Decimal::ZERO,
            item_name: String::new(),
            item_uom: String::new(),
            custom_fields: EntryList::new(),
            extensions: EntryList::new(),
        }
    }
}

/// Why a leaf could not be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LeafError {
    Unknown,
    Mismatch(ValueKind),
}

impl From<ValueKind> for LeafError {
    fn from(expected: ValueKind) -> Self {
        LeafError::Mismatch(expected)
    }
}

/// Read and write access to the scalar fields of one object
pub(crate) trait Leaves {
    fn leaf(&self, name: FieldName) -> Option<FieldValue>;
    fn set_leaf(&mut self, name: FieldName, value: FieldValue) -> Result<(), LeafError>;
}

fn text(value: &str) -> Option<FieldValue> {
    Some(FieldValue::Text(value.to_string()))
}

fn optional_text(value: &Option<String>) -> Option<FieldValue> {
    Some(FieldValue::Text(value.clone().unwrap_or_default()))
}

impl Leaves for InvoiceDraft {
    fn leaf(&self, name: FieldName) -> Option<FieldValue> {
        match name {
            FieldName::InvoiceNumber => text(&self.invoice_number),
            FieldName::InvoiceReference => text(&self.invoice_reference),
            FieldName::Currency => Some(FieldValue::Currency(self.currency)),
            FieldName::InvoiceDate => Some(FieldValue::Date(self.invoice_date)),
            FieldName::DueDate => Some(FieldValue::Date(self.due_date)),
            FieldName::Description => text(&self.description),
            _ => None,
        }
    }

    fn set_leaf(&mut self, name: FieldName, value: FieldValue) -> Result<(), LeafError> {
        match name {
            FieldName::InvoiceNumber => self.invoice_number = value.into_text()?,
            FieldName::InvoiceReference => self.invoice_reference = value.into_text()?,
            FieldName::Currency => self.currency = value.into_currency()?,
            FieldName::InvoiceDate => self.invoice_date = value.into_date()?,
            FieldName::DueDate => self.due_date = value.into_date()?,
            FieldName::Description => self.description = value.into_text()?,
            _ => return Err(LeafError::Unknown),
        }
        Ok(())
    }
}

impl Leaves for Customer {
    fn leaf(&self, name: FieldName) -> Option<FieldValue> {
        match name {
            FieldName::FirstName => text(&self.first_name),
            FieldName::LastName => text(&self.last_name),
            _ => None,
        }
    }

    fn set_leaf(&mut self, name: FieldName, value: FieldValue) -> Result<(), LeafError> {
        match name {
            FieldName::FirstName => self.first_name = value.into_text()?,
            FieldName::LastName => self.last_name = value.into_text()?,
            _ => return Err(LeafError::Unknown),
        }
        Ok(())
    }
}

impl Leaves for Contact {
    fn leaf(&self, name: FieldName) -> Option<FieldValue> {
        match name {
            FieldName::Email => text(&self.email),
            FieldName::MobileNumber => text(&self.mobile_number),
            _ => None,
        }
    }

    fn set_leaf(&mut self, name: FieldName, value: FieldValue) -> Result<(), LeafError> {
        match name {
            FieldName::Email => self.email = value.into_text()?,
            FieldName::MobileNumber => self.mobile_number = value.into_text()?,
            _ => return Err(LeafError::Unknown),
        }
        Ok(())
    }
}

impl Leaves for Address {
    fn leaf(&self, name: FieldName) -> Option<FieldValue> {
        match name {
            FieldName::Premise => text(&self.premise),
            FieldName::CountryCode => text(&self.country_code),
            FieldName::Postcode => text(&self.postcode),
            FieldName::County => text(&self.county),
            FieldName::City => text(&self.city),
            FieldName::AddressType => text(&self.address_type),
            _ => None,
        }
    }

    fn set_leaf(&mut self, name: FieldName, value: FieldValue) -> Result<(), LeafError> {
        let field = match name {
            FieldName::Premise => &mut self.premise,
            FieldName::CountryCode => &mut self.country_code,
            FieldName::Postcode => &mut self.postcode,
            FieldName::County => &mut self.county,
            FieldName::City => &mut self.city,
            FieldName::AddressType => &mut self.address_type,
            _ => return Err(LeafError::Unknown),
        };
        *field = value.into_text()?;
        Ok(())
    }
}

impl Leaves for BankAccount {
    fn leaf(&self, name: FieldName) -> Option<FieldValue> {
        match name {
            FieldName::BankId => optional_text(&self.bank_id),
            FieldName::SortCode => text(&self.sort_code),
            FieldName::AccountNumber => text(&self.account_number),
            FieldName::AccountName => text(&self.account_name),
            _ => None,
        }
    }

    fn set_leaf(&mut self, name: FieldName, value: FieldValue) -> Result<(), LeafError> {
        match name {
            FieldName::BankId => self.bank_id = value.into_optional_text()?,
            FieldName::SortCode => self.sort_code = value.into_text()?,
            FieldName::AccountNumber => self.account_number = value.into_text()?,
            FieldName::AccountName => self.account_name = value.into_text()?,
            _ => return Err(LeafError::Unknown),
        }
        Ok(())
    }
}

impl Leaves for Document {
    fn leaf(&self, name: FieldName) -> Option<FieldValue> {
        match name {
            FieldName::DocumentId => optional_text(&self.document_id),
            FieldName::DocumentName => optional_text(&self.document_name),
            FieldName::DocumentUrl => optional_text(&self.document_url),
            _ => None,
        }
    }

    fn set_leaf(&mut self, name: FieldName, value: FieldValue) -> Result<(), LeafError> {
        let field = match name {
            FieldName::DocumentId => &mut self.document_id,
            FieldName::DocumentName => &mut self.document_name,
            FieldName::DocumentUrl => &mut self.document_url,
            _ => return Err(LeafError::Unknown),
        };
        *field = value.into_optional_text()?;
        Ok(())
    }
}

impl Leaves for CustomField {
    fn leaf(&self, name: FieldName) -> Option<FieldValue> {
        match name {
            FieldName::Key => text(&self.key),
            FieldName::Value => text(&self.value),
            _ => None,
        }
    }

    fn set_leaf(&mut self, name: FieldName, value: FieldValue) -> Result<(), LeafError> {
        match name {
            FieldName::Key => self.key = value.into_text()?,
            FieldName::Value => self.value = value.into_text()?,
            _ => return Err(LeafError::Unknown),
        }
        Ok(())
    }
}

impl Leaves for Extension {
    fn leaf(&self, name: FieldName) -> Option<FieldValue> {
        match name {
            FieldName::AddDeduct => Some(FieldValue::AddDeduct(self.add_deduct)),
            FieldName::Type => Some(FieldValue::ExtensionType(self.kind)),
            FieldName::Value => Some(FieldValue::Number(self.value)),
            FieldName::Name => text(&self.name),
            _ => None,
        }
    }

    fn set_leaf(&mut self, name: FieldName, value: FieldValue) -> Result<(), LeafError> {
        match name {
            FieldName::AddDeduct => self.add_deduct = value.into_add_deduct()?,
            FieldName::Type => self.kind = value.into_extension_type()?,
            FieldName::Value => self.value = value.into_number()?,
            FieldName::Name => self.name = value.into_text()?,
            _ => return Err(LeafError::Unknown),
        }
        Ok(())
    }
}

impl Leaves for Item {
    fn leaf(&self, name: FieldName) -> Option<FieldValue> {
        match name {
            FieldName::ItemReference => optional_text(&self.item_reference),
            FieldName::Description => text(&self.description),
            FieldName::Quantity => Some(FieldValue::Number(self.quantity)),
            FieldName::Rate => Some(FieldValue::Number(self.rate)),
            FieldName::ItemName => text(&self.item_name),
            FieldName::ItemUom => text(&self.item_uom),
            _ => None,
        }
    }

    fn set_leaf(&mut self, name: FieldName, value: FieldValue) -> Result<(), LeafError> {
        match name {
            FieldName::ItemReference => self.item_reference = value.into_optional_text()?,
            FieldName::Description => self.description = value.into_text()?,
            FieldName::Quantity => self.quantity = value.into_number()?,
            FieldName::Rate => self.rate = value.into_number()?,
            FieldName::ItemName => self.item_name = value.into_text()?,
            FieldName::ItemUom => self.item_uom = value.into_text()?,
            _ => return Err(LeafError::Unknown),
        }
        Ok(())
    }
}

use PathSegment::{Field as F, Index as I};

impl InvoiceDraft {
    /// Creates an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the leaf at `path`
    pub fn get(&self, path: &FieldPath) -> Result<FieldValue, FormError> {
        self.resolve(path.segments())
            .and_then(|(node, name)| node.leaf(name))
            .ok_or_else(|| FormError::UnknownPath(path.clone()))
    }

    /// Writes the leaf at `path`
    ///
    /// List positions in `path` must already exist; use
    /// [`append`](InvoiceDraft::append) to grow a list.
    pub fn set(&mut self, path: &FieldPath, value: FieldValue) -> Result<(), FormError> {
        let found = value.kind();
        let (node, name) = self
            .resolve_mut(path.segments())
            .ok_or_else(|| FormError::UnknownPath(path.clone()))?;
        node.set_leaf(name, value).map_err(|e| match e {
            LeafError::Unknown => FormError::UnknownPath(path.clone()),
            LeafError::Mismatch(expected) => FormError::TypeMismatch {
                path: path.clone(),
                expected,
                found,
            },
        })
    }

    /// Number of entries in the list at `path`
    pub fn len_at(&self, path: &FieldPath) -> Result<usize, FormError> {
        let len = match path.segments() {
            [F(FieldName::Customer), F(FieldName::Addresses)] => Some(self.customer.addresses.len()),
            [F(FieldName::Documents)] => Some(self.documents.len()),
            [F(FieldName::CustomFields)] => Some(self.custom_fields.len()),
            [F(FieldName::Extensions)] => Some(self.extensions.len()),
            [F(FieldName::Items)] => Some(self.items.len()),
            [F(FieldName::Items), I(i), F(FieldName::CustomFields)] => {
                self.items.get(*i).map(|item| item.custom_fields.len())
            }
            [F(FieldName::Items), I(i), F(FieldName::Extensions)] => {
                self.items.get(*i).map(|item| item.extensions.len())
            }
            _ => None,
        };
        len.ok_or_else(|| FormError::UnknownPath(path.clone()))
    }

    fn resolve(&self, segments: &[PathSegment]) -> Option<(&dyn Leaves, FieldName)> {
        let (last, parent) = segments.split_last()?;
        let F(name) = *last else { return None };
        let node: &dyn Leaves = match parent {
            [] => self,
            [F(FieldName::Customer)] => &self.customer,
            [F(FieldName::Customer), F(FieldName::Contact)] => &self.customer.contact,
            [F(FieldName::Customer), F(FieldName::Addresses), I(i)] => self.customer.addresses.get(*i)?,
            [F(FieldName::BankAccount)] => &self.bank_account,
            [F(FieldName::Documents), I(i)] => self.documents.get(*i)?,
            [F(FieldName::CustomFields), I(i)] => self.custom_fields.get(*i)?,
            [F(FieldName::Extensions), I(i)] => self.extensions.get(*i)?,
            [F(FieldName::Items), I(i)] => self.items.get(*i)?,
            [F(FieldName::Items), I(i), F(FieldName::CustomFields), I(j)] => {
                self.items.get(*i)?.custom_fields.get(*j)?
            }
            [F(FieldName::Items), I(i), F(FieldName::Extensions), I(j)] => {
                self.items.get(*i)?.extensions.get(*j)?
            }
            _ => return None,
        };
        Some((node, name))
    }

    fn resolve_mut(&mut self, segments: &[PathSegment]) -> Option<(&mut dyn Leaves, FieldName)> {
        let (last, parent) = segments.split_last()?;
        let F(name) = *last else { return None };
        let node: &mut dyn Leaves = match parent {
            [] => self,
            [F(FieldName::Customer)] => &mut self.customer,
            [F(FieldName::Customer), F(FieldName::Contact)] => &mut self.customer.contact,
            [F(FieldName::Customer), F(FieldName::Addresses), I(i)] => self.customer.addresses.get_mut(*i)?,
            [F(FieldName::BankAccount)] => &mut self.bank_account,
            [F(FieldName::Documents), I(i)] => self.documents.get_mut(*i)?,
            [F(FieldName::CustomFields), I(i)] => self.custom_fields.get_mut(*i)?,
            [F(FieldName::Extensions), I(i)] => self.extensions.get_mut(*i)?,
            [F(FieldName::Items), I(i)] => self.items.get_mut(*i)?,
            [F(FieldName::Items), I(i), F(FieldName::CustomFields), I(j)] => {
                self.items.get_mut(*i)?.custom_fields.get_mut(*j)?
            }
            [F(FieldName::Items), I(i), F(FieldName::Extensions), I(j)] => {
                self.items.get_mut(*i)?.extensions.get_mut(*j)?
            }
            _ => return None,
        };
        Some((node, name))
    }
}

impl FieldSource for InvoiceDraft {
    fn field_value(&self, path: &FieldPath) -> Option<FieldValue> {
        self.get(path).ok()
    }

    fn list_len(&self, path: &FieldPath) -> Option<usize> {
        self.len_at(path).ok()
    }
}
