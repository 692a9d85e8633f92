//! Property-Based Test Generators
//!
//! Provides proptest strategies for drafts that satisfy every schema rule,
//! and helpers to pick which rule to break.

use chrono::NaiveDate;
use core_kernel::Currency;
use domain_invoice::schema::{FieldKind, FieldSchema, Rule};
use domain_invoice::{
    AddDeduct, Address, BankAccount, Contact, CustomField, Customer, EntryList, Extension,
    ExtensionType, FieldPath, InvoiceDraft, Item, INVOICE_SCHEMA,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![Just(Currency::GBP), Just(Currency::USD), Just(Currency::EUR)]
}

/// Non-empty text without surrounding whitespace
pub fn text_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,14}[A-Za-z0-9]"
}

pub fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(\\.[a-z]{1,5})?@[a-z]{2,8}\\.(com|org|co\\.uk)"
}

pub fn country_code_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{2,3}"
}

pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2040, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("day 1-28 exists in every month"))
}

/// Whole quantities from 1
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1000).prop_map(Decimal::from)
}

/// Non-negative amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|minor| Decimal::new(minor, 2))
}

pub fn custom_field_strategy() -> impl Strategy<Value = CustomField> {
    (text_strategy(), text_strategy()).prop_map(|(key, value)| CustomField::new(key, value))
}

pub fn extension_strategy() -> impl Strategy<Value = Extension> {
    (
        prop_oneof![Just(AddDeduct::Add), Just(AddDeduct::Deduct)],
        prop_oneof![Just(ExtensionType::FixedValue), Just(ExtensionType::Percentage)],
        amount_strategy(),
        text_strategy(),
    )
        .prop_map(|(add_deduct, kind, value, name)| Extension::new(name, add_deduct, kind, value))
}

pub fn address_strategy() -> impl Strategy<Value = Address> {
    (
        text_strategy(),
        country_code_strategy(),
        text_strategy(),
        text_strategy(),
        text_strategy(),
        text_strategy(),
    )
        .prop_map(|(premise, country_code, postcode, county, city, address_type)| Address {
            premise,
            country_code,
            postcode,
            county,
            city,
            address_type,
        })
}

pub fn item_strategy() -> impl Strategy<Value = Item> {
    (
        proptest::option::of(text_strategy()),
        text_strategy(),
        quantity_strategy(),
        amount_strategy(),
        text_strategy(),
        text_strategy(),
        prop::collection::vec(custom_field_strategy(), 0..3),
        prop::collection::vec(extension_strategy(), 0..3),
    )
        .prop_map(
            |(item_reference, description, quantity, rate, item_name, item_uom, fields, extensions)| Item {
                item_reference,
                description,
                quantity,
                rate,
                item_name,
                item_uom,
                custom_fields: fields.into_iter().collect(),
                extensions: extensions.into_iter().collect(),
            },
        )
}

fn customer_strategy() -> impl Strategy<Value = Customer> {
    (
        text_strategy(),
        text_strategy(),
        email_strategy(),
        text_strategy(),
        prop::collection::vec(address_strategy(), 1..3),
    )
        .prop_map(|(first_name, last_name, email, mobile_number, addresses)| Customer {
            first_name,
            last_name,
            contact: Contact { email, mobile_number },
            addresses: addresses.into_iter().collect(),
        })
}

fn bank_account_strategy() -> impl Strategy<Value = BankAccount> {
    (
        proptest::option::of(text_strategy()),
        "[0-9]{2}-[0-9]{2}-[0-9]{2}",
        "[0-9]{8}",
        text_strategy(),
    )
        .prop_map(|(bank_id, sort_code, account_number, account_name)| BankAccount {
            bank_id,
            sort_code,
            account_number,
            account_name,
        })
}

/// Strategy for drafts that pass every schema rule
pub fn valid_draft_strategy() -> impl Strategy<Value = InvoiceDraft> {
    let header = (
        text_strategy(),
        text_strategy(),
        currency_strategy(),
        date_strategy(),
        date_strategy(),
        text_strategy(),
    );
    let lists = (
        prop::collection::vec(custom_field_strategy(), 0..3),
        prop::collection::vec(extension_strategy(), 0..3),
        prop::collection::vec(item_strategy(), 1..4),
    );
    (header, customer_strategy(), bank_account_strategy(), lists).prop_map(
        |(
            (invoice_number, invoice_reference, currency, invoice_date, due_date, description),
            customer,
            bank_account,
            (custom_fields, extensions, items),
        )| InvoiceDraft {
            bank_account,
            customer,
            documents: EntryList::new(),
            invoice_reference,
            invoice_number,
            currency: Some(currency),
            invoice_date: Some(invoice_date),
            due_date: Some(due_date),
            description,
            custom_fields: custom_fields.into_iter().collect(),
            extensions: extensions.into_iter().collect(),
            items: items.into_iter().collect(),
        },
    )
}

/// Paths of every leaf in `draft` that carries a `Required` rule
pub fn required_leaf_paths(draft: &InvoiceDraft) -> Vec<FieldPath> {
    let mut paths = Vec::new();
    collect_required(INVOICE_SCHEMA.fields(), &FieldPath::root(), draft, &mut paths);
    paths
}

fn collect_required(fields: &[FieldSchema], base: &FieldPath, draft: &InvoiceDraft, out: &mut Vec<FieldPath>) {
    for node in fields {
        let path = base.clone().field(node.name);
        match node.kind {
            FieldKind::Leaf { rules, .. } => {
                if rules.iter().any(|r| matches!(r, Rule::Required(_))) {
                    out.push(path);
                }
            }
            FieldKind::Object(children) => collect_required(children, &path, draft, out),
            FieldKind::List { entry, .. } => {
                for index in 0..draft.len_at(&path).unwrap_or(0) {
                    collect_required(entry, &path.clone().index(index), draft, out);
                }
            }
        }
    }
}
