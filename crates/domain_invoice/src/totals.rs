//! Totals preview
//!
//! Computed from the draft for display while editing. The backend computes
//! its own totals; nothing here is sent.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::draft::{AddDeduct, Extension, ExtensionType, InvoiceDraft, Item};
use crate::error::TotalsError;
use crate::lists::EntryList;

const DEFAULT_DECIMAL_PLACES: u32 = 2;

/// One item's amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotal {
    /// quantity * rate
    pub gross: Decimal,
    /// Signed sum of the item's extensions
    pub adjustments: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftTotals {
    pub lines: Vec<LineTotal>,
    /// Sum of the item nets
    pub subtotal: Decimal,
    /// Signed sum of the invoice-level extensions
    pub adjustments: Decimal,
    pub total: Decimal,
}

fn add(a: Decimal, b: Decimal) -> Result<Decimal, TotalsError> {
    a.checked_add(b).ok_or(TotalsError::Overflow)
}

fn sum(values: impl IntoIterator<Item = Decimal>) -> Result<Decimal, TotalsError> {
    values.into_iter().try_fold(Decimal::ZERO, add)
}

impl Extension {
    /// Signed effect of this extension on `base`
    pub fn amount_on(&self, base: Decimal) -> Result<Decimal, TotalsError> {
        let amount = match self.kind {
            ExtensionType::FixedValue => self.value,
            ExtensionType::Percentage => base
                .checked_mul(self.value)
                .and_then(|v| v.checked_div(dec!(100)))
                .ok_or(TotalsError::Overflow)?,
        };
        Ok(match self.add_deduct {
            AddDeduct::Add => amount,
            AddDeduct::Deduct => -amount,
        })
    }
}

fn adjustments(extensions: &EntryList<Extension>, base: Decimal) -> Result<Decimal, TotalsError> {
    extensions
        .values()
        .map(|e| e.amount_on(base))
        .try_fold(Decimal::ZERO, |acc, amount| add(acc, amount?))
}

impl Item {
    pub fn line_total(&self) -> Result<LineTotal, TotalsError> {
        let gross = self
            .quantity
            .checked_mul(self.rate)
            .ok_or(TotalsError::Overflow)?;
        let adjustments = adjustments(&self.extensions, gross)?;
        Ok(LineTotal {
            gross,
            adjustments,
            net: add(gross, adjustments)?,
        })
    }
}

impl InvoiceDraft {
    /// Item lines, then invoice extensions applied over the subtotal
    ///
    /// Rounded to the currency's minor unit (two places when unset). Amounts
    /// beyond the range of [`Decimal`] give [`TotalsError::Overflow`].
    pub fn totals(&self) -> Result<DraftTotals, TotalsError> {
        let places = self
            .currency
            .map(|c| c.decimal_places())
            .unwrap_or(DEFAULT_DECIMAL_PLACES);

        let lines = self
            .items
            .values()
            .map(Item::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        let subtotal = sum(lines.iter().map(|l| l.net))?;
        let invoice_adjustments = adjustments(&self.extensions, subtotal)?;
        let total = add(subtotal, invoice_adjustments)?;

        Ok(DraftTotals {
            lines: lines
                .into_iter()
                .map(|l| LineTotal {
                    gross: l.gross.round_dp(places),
                    adjustments: l.adjustments.round_dp(places),
                    net: l.net.round_dp(places),
                })
                .collect(),
            subtotal: subtotal.round_dp(places),
            adjustments: invoice_adjustments.round_dp(places),
            total: total.round_dp(places),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: Decimal, rate: Decimal) -> Item {
        Item {
            quantity,
            rate,
            ..Item::default()
        }
    }

    #[test]
    fn test_plain_items() {
        let mut draft = InvoiceDraft::new();
        draft.items.push(item(dec!(2), dec!(5)));
        draft.items.push(item(dec!(1), dec!(2.50)));

        let totals = draft.totals().unwrap();
        assert_eq!(totals.subtotal, dec!(12.50));
        assert_eq!(totals.total, dec!(12.50));
        assert_eq!(totals.lines.len(), 2);
    }

    #[test]
    fn test_item_and_invoice_extensions() {
        let mut draft = InvoiceDraft::new();
        let mut line = item(dec!(4), dec!(25));
        line.extensions.push(Extension::new("Delivery", AddDeduct::Add, ExtensionType::FixedValue, dec!(10)));
        draft.items.push(line);
        draft
            .extensions
            .push(Extension::new("Discount", AddDeduct::Deduct, ExtensionType::Percentage, dec!(10)));

        let totals = draft.totals().unwrap();
        assert_eq!(totals.lines[0].gross, dec!(100));
        assert_eq!(totals.lines[0].net, dec!(110));
        assert_eq!(totals.adjustments, dec!(-11));
        assert_eq!(totals.total, dec!(99));
    }

    #[test]
    fn test_deductions_are_not_clamped() {
        let mut draft = InvoiceDraft::new();
        draft.items.push(item(dec!(1), dec!(5)));
        draft
            .extensions
            .push(Extension::new("Credit", AddDeduct::Deduct, ExtensionType::FixedValue, dec!(8)));

        assert_eq!(draft.totals().unwrap().total, dec!(-3));
    }

    #[test]
    fn test_rounds_to_minor_unit() {
        let mut draft = InvoiceDraft::new();
        draft.items.push(item(dec!(3), dec!(0.333)));
        assert_eq!(draft.totals().unwrap().total, dec!(1.00));
    }

    #[test]
    fn test_item_overflow_is_reported() {
        let big = Decimal::from_i128_with_scale(10_i128.pow(20), 0);
        let mut draft = InvoiceDraft::new();
        draft.items.push(item(big, big));

        assert_eq!(draft.totals(), Err(TotalsError::Overflow));
    }

    #[test]
    fn test_subtotal_overflow_is_reported() {
        let mut draft = InvoiceDraft::new();
        draft.items.push(item(Decimal::MAX, dec!(1)));
        draft.items.push(item(Decimal::MAX, dec!(1)));

        assert_eq!(draft.totals(), Err(TotalsError::Overflow));
    }

    #[test]
    fn test_percentage_overflow_is_reported() {
        let mut draft = InvoiceDraft::new();
        draft.items.push(item(Decimal::MAX, dec!(1)));
        draft
            .extensions
            .push(Extension::new("Markup", AddDeduct::Add, ExtensionType::Percentage, dec!(200)));

        assert_eq!(draft.totals(), Err(TotalsError::Overflow));
    }
}
