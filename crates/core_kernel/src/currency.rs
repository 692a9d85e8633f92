//! Invoice currencies
//!
//! The create-invoice dialog offers a fixed set of ISO 4217 codes; the
//! backend receives the bare code string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currency codes accepted on a new invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    GBP,
    USD,
    EUR,
}

impl Currency {
    /// Every selectable currency, in the order the picker lists them
    pub const ALL: [Currency; 3] = [Currency::GBP, Currency::USD, Currency::EUR];

    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::GBP => "£",
            Currency::USD => "$",
            Currency::EUR => "€",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::GBP => "GBP",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CurrencyError::Unsupported(s.to_string()))
    }
}

/// Errors raised while reading a currency code
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Unsupported currency: {0}")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("gbp".parse::<Currency>(), Ok(Currency::GBP));
        assert_eq!(" EUR ".parse::<Currency>(), Ok(Currency::EUR));
    }

    #[test]
    fn test_parse_rejects_unknown_code() {
        assert_eq!(
            "JPY".parse::<Currency>(),
            Err(CurrencyError::Unsupported("JPY".to_string()))
        );
    }

    #[test]
    fn test_serializes_as_bare_code() {
        let json = serde_json::to_string(&Currency::USD).unwrap();
        assert_eq!(json, "\"USD\"");
    }
}
