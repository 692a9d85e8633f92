//! Pre-built Test Fixtures
//!
//! Provides ready-to-use drafts and list entries. Every fixture is valid
//! against the invoice schema unless its name says otherwise.

use chrono::NaiveDate;
use core_kernel::Currency;
use domain_invoice::{
    AddDeduct, Address, BankAccount, Contact, CustomField, Customer, Document, Extension,
    ExtensionType, InvoiceDraft, Item,
};
use rust_decimal_macros::dec;

/// Fixture for list entries
pub struct EntryFixtures;

impl EntryFixtures {
    /// A billing address in the UK
    pub fn address() -> Address {
        Address {
            premise: "1 High Street".to_string(),
            country_code: "GB".to_string(),
            postcode: "CT1 2AB".to_string(),
            county: "Kent".to_string(),
            city: "Canterbury".to_string(),
            address_type: "BILLING".to_string(),
        }
    }

    /// The item of the INV-003 scenario
    pub fn widget() -> Item {
        Item {
            description: "Widget".to_string(),
            quantity: dec!(2),
            rate: dec!(5),
            item_name: "Widget".to_string(),
            item_uom: "EA".to_string(),
            ..Item::default()
        }
    }

    /// What the dialog appends when "Add item" is clicked
    pub fn blank_item() -> Item {
        Item::default()
    }

    pub fn discount() -> Extension {
        Extension::new("Discount", AddDeduct::Deduct, ExtensionType::Percentage, dec!(10))
    }

    pub fn delivery() -> Extension {
        Extension::new("Delivery", AddDeduct::Add, ExtensionType::FixedValue, dec!(4.99))
    }

    pub fn purchase_order() -> CustomField {
        CustomField::new("PO", "PO-7781")
    }

    pub fn document() -> Document {
        Document {
            document_id: Some("DOC-1".to_string()),
            document_name: Some("terms.pdf".to_string()),
            document_url: Some("https://files.example.com/terms.pdf".to_string()),
        }
    }
}

/// Fixture for whole drafts
pub struct DraftFixtures;

impl DraftFixtures {
    /// The draft the dialog opens with
    pub fn empty() -> InvoiceDraft {
        InvoiceDraft::new()
    }

    /// A complete, valid draft with one address and one item
    pub fn valid() -> InvoiceDraft {
        let mut draft = InvoiceDraft {
            bank_account: BankAccount {
                bank_id: None,
                sort_code: "12-34-56".to_string(),
                account_number: "12345678".to_string(),
                account_name: "Jane Doe".to_string(),
            },
            customer: Customer {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                contact: Contact {
                    email: "jane.doe@example.com".to_string(),
                    mobile_number: "07700900123".to_string(),
                },
                ..Customer::default()
            },
            invoice_reference: "REF-2024-001".to_string(),
            invoice_number: "INV-001".to_string(),
            currency: Some(Currency::GBP),
            invoice_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            description: "March consulting".to_string(),
            ..InvoiceDraft::default()
        };
        draft.customer.addresses.push(EntryFixtures::address());
        draft.items.push(EntryFixtures::widget());
        draft
    }

    /// The INV-003 scenario: a valid draft whose single item has quantity 2
    pub fn inv_003() -> InvoiceDraft {
        InvoiceDraft {
            invoice_number: "INV-003".to_string(),
            ..Self::valid()
        }
    }

    /// A valid draft exercising every optional list
    pub fn full() -> InvoiceDraft {
        let mut draft = Self::valid();
        draft.bank_account.bank_id = Some("BANK-01".to_string());
        draft.documents.push(EntryFixtures::document());
        draft.custom_fields.push(EntryFixtures::purchase_order());
        draft.extensions.push(EntryFixtures::discount());
        let mut item = EntryFixtures::widget();
        item.item_reference = Some("SKU-42".to_string());
        item.custom_fields.push(CustomField::new("colour", "blue"));
        item.extensions.push(EntryFixtures::delivery());
        draft.items.push(item);
        draft
    }
}
