//! Declarative form schema
//!
//! A [`Schema`] is a static tree of [`FieldSchema`] nodes: leaves carry a
//! value kind and a list of [`Rule`]s, objects group fields, and lists repeat
//! an entry schema with an optional minimum length. Validation walks the tree
//! against any [`FieldSource`] and collects every violated rule into a
//! [`ValidationErrors`] set keyed by [`FieldPath`].
//!
//! # Rules
//!
//! - `Required`: text must be non-empty, dates and currency must be set
//! - `Email` / `Url`: checked only when the text is non-empty
//! - `Length`: character count bounds, with separate messages
//! - `AtLeast`: numeric lower bound
//!
//! Validation has no side effects and depends only on the values it reads,
//! so the same draft always yields the same error set.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use validator::{ValidateEmail, ValidateUrl};

use crate::path::{FieldName, FieldPath};
use crate::value::{FieldValue, ValueKind};

/// Anything the schema can read values from
pub trait FieldSource {
    /// The leaf at `path`, or `None` if the path does not resolve
    fn field_value(&self, path: &FieldPath) -> Option<FieldValue>;

    /// The length of the list at `path`, or `None` if it does not resolve
    fn list_len(&self, path: &FieldPath) -> Option<usize>;
}

/// A single validation rule on a leaf
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Required(&'static str),
    Email(&'static str),
    Url(&'static str),
    Length {
        min: usize,
        max: usize,
        too_short: &'static str,
        too_long: &'static str,
    },
    AtLeast {
        min: Decimal,
        message: &'static str,
    },
}

impl Rule {
    /// Returns the message if `value` violates this rule
    pub fn check(&self, value: Option<&FieldValue>) -> Option<&'static str> {
        match (self, value) {
            (Rule::Required(message), None) => Some(*message),
            (Rule::Required(message), Some(value)) => value.is_blank().then_some(*message),
            (_, None) => None,
            (Rule::Email(message), Some(FieldValue::Text(text))) => {
                (!text.is_empty() && !text.validate_email()).then_some(*message)
            }
            (Rule::Url(message), Some(FieldValue::Text(text))) => {
                (!text.is_empty() && !text.validate_url()).then_some(*message)
            }
            (Rule::Length { min, max, too_short, too_long }, Some(FieldValue::Text(text))) => {
                let len = text.chars().count();
                if len < *min {
                    Some(*too_short)
                } else if len > *max {
                    Some(*too_long)
                } else {
                    None
                }
            }
            (Rule::AtLeast { min, message }, Some(FieldValue::Number(n))) => (n < min).then_some(*message),
            _ => None,
        }
    }
}

/// Shape of one schema node
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Leaf {
        value: ValueKind,
        rules: &'static [Rule],
    },
    Object(&'static [FieldSchema]),
    List {
        entry: &'static [FieldSchema],
        min: Option<(usize, &'static str)>,
    },
}

/// A named node in the schema tree
#[derive(Debug, Clone, Copy)]
pub struct FieldSchema {
    pub name: FieldName,
    pub kind: FieldKind,
}

impl FieldSchema {
    pub const fn leaf(name: FieldName, value: ValueKind, rules: &'static [Rule]) -> Self {
        Self {
            name,
            kind: FieldKind::Leaf { value, rules },
        }
    }

    pub const fn object(name: FieldName, fields: &'static [FieldSchema]) -> Self {
        Self {
            name,
            kind: FieldKind::Object(fields),
        }
    }

    pub const fn list(name: FieldName, entry: &'static [FieldSchema]) -> Self {
        Self {
            name,
            kind: FieldKind::List { entry, min: None },
        }
    }

    pub const fn non_empty_list(name: FieldName, entry: &'static [FieldSchema], message: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::List {
                entry,
                min: Some((1, message)),
            },
        }
    }
}

/// Root of a schema tree
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [FieldSchema],
}

impl Schema {
    pub const fn new(fields: &'static [FieldSchema]) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &'static [FieldSchema] {
        self.fields
    }

    /// Validates every field of `source`
    pub fn validate<S: FieldSource + ?Sized>(&self, source: &S) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        walk(self.fields, &FieldPath::root(), source, &mut |path, node| {
            check_node(path, node, source, &mut errors);
        });
        errors
    }

    /// Every leaf `source` currently has, with its declared kind
    ///
    /// List entries are expanded to the lengths present in `source`.
    pub fn leaves<S: FieldSource + ?Sized>(&self, source: &S) -> Vec<(FieldPath, ValueKind)> {
        let mut leaves = Vec::new();
        walk(self.fields, &FieldPath::root(), source, &mut |path, node| {
            if let FieldKind::Leaf { value, .. } = node.kind {
                leaves.push((path.clone(), value));
            }
        });
        leaves
    }
}

fn walk<S, V>(fields: &[FieldSchema], base: &FieldPath, source: &S, visit: &mut V)
where
    S: FieldSource + ?Sized,
    V: FnMut(&FieldPath, &FieldSchema),
{
    for node in fields {
        let path = base.clone().field(node.name);
        visit(&path, node);
        match node.kind {
            FieldKind::Leaf { .. } => {}
            FieldKind::Object(children) => walk(children, &path, source, visit),
            FieldKind::List { entry, .. } => {
                let len = source.list_len(&path).unwrap_or(0);
                for index in 0..len {
                    walk(entry, &path.clone().index(index), source, visit);
                }
            }
        }
    }
}

fn check_node<S: FieldSource + ?Sized>(
    path: &FieldPath,
    node: &FieldSchema,
    source: &S,
    errors: &mut ValidationErrors,
) {
    match node.kind {
        FieldKind::Leaf { rules, .. } => {
            let value = source.field_value(path);
            for rule in rules {
                if let Some(message) = rule.check(value.as_ref()) {
                    errors.add(path.clone(), message);
                }
            }
        }
        FieldKind::List { min: Some((min, message)), .. } => {
            if source.list_len(path).unwrap_or(0) < min {
                errors.add(path.clone(), message);
            }
        }
        _ => {}
    }
}

/// Field-keyed validation messages
///
/// Ordered by path so that iteration and serialisation are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<FieldPath, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against `path`
    pub fn add(&mut self, path: FieldPath, message: impl Into<String>) {
        self.errors.entry(path).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one message
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The first message for `path`, as shown inline under the field
    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        self.errors.get(path).and_then(|messages| messages.first()).map(String::as_str)
    }

    pub fn messages(&self, path: &FieldPath) -> &[String] {
        self.errors.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.errors.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &[String])> {
        self.errors.iter().map(|(path, messages)| (path, messages.as_slice()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.errors.keys()
    }

    /// Errors at or below `prefix`, e.g. everything inside one item
    pub fn under(&self, prefix: &FieldPath) -> ValidationErrors {
        let errors = self
            .errors
            .iter()
            .filter(|(path, _)| path.starts_with(prefix))
            .map(|(path, messages)| (path.clone(), messages.clone()))
            .collect();
        ValidationErrors { errors }
    }
}

const fn text(name: FieldName, rules: &'static [Rule]) -> FieldSchema {
    FieldSchema::leaf(name, ValueKind::Text, rules)
}

static CUSTOM_FIELD: &[FieldSchema] = &[
    text(FieldName::Key, &[Rule::Required("Custom field key is required")]),
    text(FieldName::Value, &[Rule::Required("Custom field value is required")]),
];

static EXTENSION: &[FieldSchema] = &[
    FieldSchema::leaf(FieldName::AddDeduct, ValueKind::AddDeduct, &[]),
    FieldSchema::leaf(FieldName::Type, ValueKind::ExtensionType, &[]),
    FieldSchema::leaf(
        FieldName::Value,
        ValueKind::Number,
        &[Rule::AtLeast {
            min: Decimal::ZERO,
            message: "Extension value must be a positive number",
        }],
    ),
    text(FieldName::Name, &[Rule::Required("Extension name is required")]),
];

static ADDRESS: &[FieldSchema] = &[
    text(FieldName::Premise, &[Rule::Required("Premise is required")]),
    text(
        FieldName::CountryCode,
        &[Rule::Length {
            min: 2,
            max: 3,
            too_short: "Country code is required",
            too_long: "Country code should be 2-3 characters",
        }],
    ),
    text(FieldName::Postcode, &[Rule::Required("Postcode is required")]),
    text(FieldName::County, &[Rule::Required("County is required")]),
    text(FieldName::City, &[Rule::Required("City is required")]),
    text(FieldName::AddressType, &[Rule::Required("Address type is required")]),
];

static CONTACT: &[FieldSchema] = &[
    text(
        FieldName::Email,
        &[Rule::Required("Email is required"), Rule::Email("Invalid email address")],
    ),
    text(FieldName::MobileNumber, &[Rule::Required("Mobile number is required")]),
];

static CUSTOMER: &[FieldSchema] = &[
    text(FieldName::FirstName, &[Rule::Required("First name is required")]),
    text(FieldName::LastName, &[Rule::Required("Last name is required")]),
    FieldSchema::object(FieldName::Contact, CONTACT),
    FieldSchema::non_empty_list(FieldName::Addresses, ADDRESS, "At least one address is required"),
];

static BANK_ACCOUNT: &[FieldSchema] = &[
    text(FieldName::BankId, &[]),
    text(FieldName::SortCode, &[Rule::Required("Sort code is required")]),
    text(FieldName::AccountNumber, &[Rule::Required("Account number is required")]),
    text(FieldName::AccountName, &[Rule::Required("Account name is required")]),
];

static DOCUMENT: &[FieldSchema] = &[
    text(FieldName::DocumentId, &[]),
    text(FieldName::DocumentName, &[]),
    text(FieldName::DocumentUrl, &[Rule::Url("Invalid document URL")]),
];

static ITEM: &[FieldSchema] = &[
    text(FieldName::ItemReference, &[]),
    text(FieldName::Description, &[Rule::Required("Item description is required")]),
    FieldSchema::leaf(
        FieldName::Quantity,
        ValueKind::Number,
        &[Rule::AtLeast {
            min: Decimal::ONE,
            message: "Quantity must be at least 1",
        }],
    ),
    FieldSchema::leaf(
        FieldName::Rate,
        ValueKind::Number,
        &[Rule::AtLeast {
            min: Decimal::ZERO,
            message: "Rate must be a positive number",
        }],
    ),
    text(FieldName::ItemName, &[Rule::Required("Item name is required")]),
    text(FieldName::ItemUom, &[Rule::Required("Unit of Measure is required")]),
    FieldSchema::list(FieldName::CustomFields, CUSTOM_FIELD),
    FieldSchema::list(FieldName::Extensions, EXTENSION),
];

static INVOICE: &[FieldSchema] = &[
    FieldSchema::object(FieldName::BankAccount, BANK_ACCOUNT),
    FieldSchema::object(FieldName::Customer, CUSTOMER),
    FieldSchema::list(FieldName::Documents, DOCUMENT),
    text(FieldName::InvoiceReference, &[Rule::Required("Invoice reference is required")]),
    text(FieldName::InvoiceNumber, &[Rule::Required("Invoice number is required")]),
    FieldSchema::leaf(FieldName::Currency, ValueKind::Currency, &[Rule::Required("Currency is required")]),
    FieldSchema::leaf(FieldName::InvoiceDate, ValueKind::Date, &[Rule::Required("Invoice date is required")]),
    FieldSchema::leaf(FieldName::DueDate, ValueKind::Date, &[Rule::Required("Due date is required")]),
    text(FieldName::Description, &[Rule::Required("Description is required")]),
    FieldSchema::list(FieldName::CustomFields, CUSTOM_FIELD),
    FieldSchema::list(FieldName::Extensions, EXTENSION),
    FieldSchema::non_empty_list(FieldName::Items, ITEM, "At least one item is required"),
];

/// The create-invoice form
pub static INVOICE_SCHEMA: Schema = Schema::new(INVOICE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{Address, CustomField, Document, Extension, InvoiceDraft, Item};
    use chrono::NaiveDate;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn path(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    fn valid_draft() -> InvoiceDraft {
        let mut draft = InvoiceDraft::new();
        draft.invoice_number = "INV-003".into();
        draft.invoice_reference = "REF-1".into();
        draft.currency = Some(Currency::GBP);
        draft.invoice_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        draft.due_date = NaiveDate::from_ymd_opt(2024, 1, 31);
        draft.description = "Consulting".into();
        draft.customer.first_name = "Jane".into();
        draft.customer.last_name = "Doe".into();
        draft.customer.contact.email = "jane@example.com".into();
        draft.customer.contact.mobile_number = "07700900000".into();
        draft.customer.addresses.push(Address {
            premise: "1 High St".into(),
            country_code: "GB".into(),
            postcode: "AB1 2CD".into(),
            county: "Kent".into(),
            city: "Canterbury".into(),
            address_type: "BILLING".into(),
        });
        draft.bank_account.sort_code = "12-34-56".into();
        draft.bank_account.account_number = "12345678".into();
        draft.bank_account.account_name = "Jane Doe".into();
        draft.items.push(Item {
            description: "Widget".into(),
            quantity: dec!(2),
            rate: dec!(5),
            item_name: "Widget".into(),
            item_uom: "EA".into(),
            ..Item::default()
        });
        draft
    }

    #[test]
    fn test_valid_draft_has_no_errors() {
        let errors = INVOICE_SCHEMA.validate(&valid_draft());
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_empty_draft_reports_required_fields() {
        let errors = INVOICE_SCHEMA.validate(&InvoiceDraft::new());

        assert_eq!(errors.get(&path("invoiceNumber")), Some("Invoice number is required"));
        assert_eq!(errors.get(&path("customer.firstName")), Some("First name is required"));
        assert_eq!(errors.get(&path("customer.contact.email")), Some("Email is required"));
        assert_eq!(errors.get(&path("customer.addresses")), Some("At least one address is required"));
        assert_eq!(errors.get(&path("items")), Some("At least one item is required"));
        assert_eq!(errors.get(&path("currency")), Some("Currency is required"));
        assert!(!errors.contains(&path("bankAccount.bankId")));
    }

    #[test]
    fn test_malformed_email() {
        let mut draft = valid_draft();
        draft.customer.contact.email = "not-an-email".into();

        let errors = INVOICE_SCHEMA.validate(&draft);
        assert_eq!(errors.messages(&path("customer.contact.email")), ["Invalid email address"]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_country_code_length() {
        let mut draft = valid_draft();
        draft.customer.addresses.get_mut(0).unwrap().country_code = "GBRX".into();
        let errors = INVOICE_SCHEMA.validate(&draft);
        assert_eq!(
            errors.get(&path("customer.addresses.0.countryCode")),
            Some("Country code should be 2-3 characters")
        );

        draft.customer.addresses.get_mut(0).unwrap().country_code = "G".into();
        let errors = INVOICE_SCHEMA.validate(&draft);
        assert_eq!(errors.get(&path("customer.addresses.0.countryCode")), Some("Country code is required"));
    }

    #[test]
    fn test_indexed_item_paths() {
        let mut draft = valid_draft();
        draft.items.push(Item {
            rate: dec!(-1),
            quantity: dec!(0),
            ..Item::default()
        });

        let errors = INVOICE_SCHEMA.validate(&draft);
        assert_eq!(errors.get(&path("items.1.rate")), Some("Rate must be a positive number"));
        assert_eq!(errors.get(&path("items.1.quantity")), Some("Quantity must be at least 1"));
        assert_eq!(errors.get(&path("items.1.itemUOM")), Some("Unit of Measure is required"));
        assert!(errors.under(&path("items.0")).is_empty());
    }

    #[test]
    fn test_nested_item_lists_are_validated() {
        let mut draft = valid_draft();
        let item = draft.items.get_mut(0).unwrap();
        item.custom_fields.push(CustomField::new("po", ""));
        item.extensions.push(Extension {
            value: dec!(-5),
            ..Extension::default()
        });

        let errors = INVOICE_SCHEMA.validate(&draft);
        assert_eq!(errors.get(&path("items.0.customFields.0.value")), Some("Custom field value is required"));
        assert_eq!(
            errors.get(&path("items.0.extensions.0.value")),
            Some("Extension value must be a positive number")
        );
        assert_eq!(errors.get(&path("items.0.extensions.0.name")), Some("Extension name is required"));
    }

    #[test]
    fn test_document_url_checked_only_when_present() {
        let mut draft = valid_draft();
        draft.documents.push(Document::default());
        assert!(INVOICE_SCHEMA.validate(&draft).is_empty());

        draft.documents.get_mut(0).unwrap().document_url = Some("not a url".into());
        let errors = INVOICE_SCHEMA.validate(&draft);
        assert_eq!(errors.get(&path("documents.0.documentUrl")), Some("Invalid document URL"));
    }

    #[test]
    fn test_declared_kinds_match_draft() {
        let mut draft = valid_draft();
        draft.documents.push(Document::default());
        draft.custom_fields.push(CustomField::default());
        draft.extensions.push(Extension::default());
        let item = draft.items.get_mut(0).unwrap();
        item.custom_fields.push(CustomField::default());
        item.extensions.push(Extension::default());

        let leaves = INVOICE_SCHEMA.leaves(&draft);
        assert!(leaves.len() > 40);
        for (leaf, kind) in leaves {
            let value = draft.get(&leaf).unwrap_or_else(|e| panic!("{}: {}", leaf, e));
            assert_eq!(value.kind(), kind, "kind of {}", leaf);
        }
    }

    #[test]
    fn test_errors_serialize_keyed_by_dotted_path() {
        let mut errors = ValidationErrors::new();
        errors.add(path("items.2.rate"), "Rate must be a positive number");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"items.2.rate": ["Rate must be a positive number"]}));
    }
}
