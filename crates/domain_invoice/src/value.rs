//! Leaf values
//!
//! A form binding reads and writes leaves as [`FieldValue`]. Each leaf has
//! one [`ValueKind`]; writing a value of another kind is a programming error.

use chrono::NaiveDate;
use core_kernel::Currency;
use rust_decimal::Decimal;
use std::fmt;

use crate::draft::{AddDeduct, ExtensionType};

/// The kind of value a leaf holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Text,
    Number,
    Date,
    Currency,
    AddDeduct,
    ExtensionType,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::Currency => "currency",
            ValueKind::AddDeduct => "add/deduct",
            ValueKind::ExtensionType => "extension type",
        };
        f.write_str(name)
    }
}

/// The value of one leaf field
///
/// Optional text leaves read back as an empty `Text` when unset; dates and
/// currency carry their own `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Date(Option<NaiveDate>),
    Currency(Option<Currency>),
    AddDeduct(AddDeduct),
    ExtensionType(ExtensionType),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Number(_) => ValueKind::Number,
            FieldValue::Date(_) => ValueKind::Date,
            FieldValue::Currency(_) => ValueKind::Currency,
            FieldValue::AddDeduct(_) => ValueKind::AddDeduct,
            FieldValue::ExtensionType(_) => ValueKind::ExtensionType,
        }
    }

    /// Returns true for empty text and unset dates or currency
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Date(date) => date.is_none(),
            FieldValue::Currency(currency) => currency.is_none(),
            FieldValue::Number(_) | FieldValue::AddDeduct(_) | FieldValue::ExtensionType(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub(crate) fn into_text(self) -> Result<String, ValueKind> {
        match self {
            FieldValue::Text(text) => Ok(text),
            _ => Err(ValueKind::Text),
        }
    }

    /// Empty text clears an optional leaf
    pub(crate) fn into_optional_text(self) -> Result<Option<String>, ValueKind> {
        self.into_text().map(|text| (!text.is_empty()).then_some(text))
    }

    pub(crate) fn into_number(self) -> Result<Decimal, ValueKind> {
        match self {
            FieldValue::Number(n) => Ok(n),
            _ => Err(ValueKind::Number),
        }
    }

    pub(crate) fn into_date(self) -> Result<Option<NaiveDate>, ValueKind> {
        match self {
            FieldValue::Date(date) => Ok(date),
            _ => Err(ValueKind::Date),
        }
    }

    pub(crate) fn into_currency(self) -> Result<Option<Currency>, ValueKind> {
        match self {
            FieldValue::Currency(currency) => Ok(currency),
            _ => Err(ValueKind::Currency),
        }
    }

    pub(crate) fn into_add_deduct(self) -> Result<AddDeduct, ValueKind> {
        match self {
            FieldValue::AddDeduct(v) => Ok(v),
            _ => Err(ValueKind::AddDeduct),
        }
    }

    pub(crate) fn into_extension_type(self) -> Result<ExtensionType, ValueKind> {
        match self {
            FieldValue::ExtensionType(v) => Ok(v),
            _ => Err(ValueKind::ExtensionType),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(Decimal::from(value))
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(Some(value))
    }
}

impl From<Currency> for FieldValue {
    fn from(value: Currency) -> Self {
        FieldValue::Currency(Some(value))
    }
}

impl From<AddDeduct> for FieldValue {
    fn from(value: AddDeduct) -> Self {
        FieldValue::AddDeduct(value)
    }
}

impl From<ExtensionType> for FieldValue {
    fn from(value: ExtensionType) -> Self {
        FieldValue::ExtensionType(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::from("").is_blank());
        assert!(FieldValue::Date(None).is_blank());
        assert!(FieldValue::Currency(None).is_blank());
        assert!(!FieldValue::from(dec!(0)).is_blank());
        assert!(!FieldValue::from("x").is_blank());
    }

    #[test]
    fn test_optional_text_clears_on_empty() {
        assert_eq!(FieldValue::from("").into_optional_text(), Ok(None));
        assert_eq!(
            FieldValue::from("B-1").into_optional_text(),
            Ok(Some("B-1".to_string()))
        );
    }

    #[test]
    fn test_conversion_reports_expected_kind() {
        assert_eq!(FieldValue::from("2").into_number(), Err(ValueKind::Number));
        assert_eq!(FieldValue::from(2i64).into_text(), Err(ValueKind::Text));
    }
}
