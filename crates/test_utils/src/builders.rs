//! Test Data Builders
//!
//! Builders start from a valid fixture so a test only states the fields it
//! cares about. Use the `without_*` methods to break a draft on purpose.

use chrono::NaiveDate;
use core_kernel::Currency;
use domain_invoice::{
    Address, CustomField, Document, EntryList, Extension, InvoiceDraft, Item,
};
use rust_decimal::Decimal;

use crate::fixtures::{DraftFixtures, EntryFixtures};

/// Builder for invoice drafts
pub struct DraftBuilder {
    draft: InvoiceDraft,
}

impl Default for DraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftBuilder {
    /// Starts from [`DraftFixtures::valid`]
    pub fn new() -> Self {
        Self {
            draft: DraftFixtures::valid(),
        }
    }

    /// Starts from an empty draft
    pub fn empty() -> Self {
        Self {
            draft: DraftFixtures::empty(),
        }
    }

    pub fn with_invoice_number(mut self, number: impl Into<String>) -> Self {
        self.draft.invoice_number = number.into();
        self
    }

    pub fn with_invoice_reference(mut self, reference: impl Into<String>) -> Self {
        self.draft.invoice_reference = reference.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.draft.description = description.into();
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.draft.currency = Some(currency);
        self
    }

    pub fn without_currency(mut self) -> Self {
        self.draft.currency = None;
        self
    }

    pub fn with_dates(mut self, invoice_date: NaiveDate, due_date: NaiveDate) -> Self {
        self.draft.invoice_date = Some(invoice_date);
        self.draft.due_date = Some(due_date);
        self
    }

    pub fn with_customer_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.draft.customer.first_name = first.into();
        self.draft.customer.last_name = last.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.draft.customer.contact.email = email.into();
        self
    }

    pub fn with_mobile_number(mut self, number: impl Into<String>) -> Self {
        self.draft.customer.contact.mobile_number = number.into();
        self
    }

    pub fn with_bank_id(mut self, bank_id: impl Into<String>) -> Self {
        self.draft.bank_account.bank_id = Some(bank_id.into());
        self
    }

    /// Appends an address to those already present
    pub fn with_address(mut self, address: Address) -> Self {
        self.draft.customer.addresses.push(address);
        self
    }

    pub fn without_addresses(mut self) -> Self {
        self.draft.customer.addresses = EntryList::new();
        self
    }

    /// Appends an item to those already present
    pub fn with_item(mut self, item: Item) -> Self {
        self.draft.items.push(item);
        self
    }

    /// Replaces all items with `items`
    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.draft.items = items.into_iter().collect();
        self
    }

    pub fn without_items(mut self) -> Self {
        self.draft.items = EntryList::new();
        self
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.draft.documents.push(document);
        self
    }

    pub fn with_custom_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.draft.custom_fields.push(CustomField::new(key, value));
        self
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.draft.extensions.push(extension);
        self
    }

    pub fn build(self) -> InvoiceDraft {
        self.draft
    }
}

/// Builder for line items
pub struct ItemBuilder {
    item: Item,
}

impl Default for ItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemBuilder {
    /// Starts from [`EntryFixtures::widget`]
    pub fn new() -> Self {
        Self {
            item: EntryFixtures::widget(),
        }
    }

    /// Starts from the blank item the dialog appends
    pub fn blank() -> Self {
        Self {
            item: EntryFixtures::blank_item(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.item.item_reference = Some(reference.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.item.description = description.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.item.item_name = name.into();
        self
    }

    pub fn with_uom(mut self, uom: impl Into<String>) -> Self {
        self.item.item_uom = uom.into();
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.item.quantity = quantity;
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.item.rate = rate;
        self
    }

    pub fn with_custom_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.item.custom_fields.push(CustomField::new(key, value));
        self
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.item.extensions.push(extension);
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}
