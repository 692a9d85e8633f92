//! Typed field paths
//!
//! A path such as `items.2.rate` is held as a sequence of field-name and
//! index segments rather than a dotted string, so error lookups and field
//! writes are checked against the known field set at compile time.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::FormError;

macro_rules! field_names {
    ($($variant:ident => $wire:literal),+ $(,)?) => {
        /// Every field name that can appear in a form path
        ///
        /// The wire name is the camelCase key the backend uses.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum FieldName {
            $($variant),+
        }

        impl FieldName {
            /// All field names, in declaration order
            pub const ALL: &'static [FieldName] = &[$(FieldName::$variant),+];

            /// Returns the wire name of the field
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(FieldName::$variant => $wire),+
                }
            }
        }
    };
}

field_names! {
    // invoice
    InvoiceNumber => "invoiceNumber",
    InvoiceReference => "invoiceReference",
    Currency => "currency",
    InvoiceDate => "invoiceDate",
    DueDate => "dueDate",
    Description => "description",
    // customer
    Customer => "customer",
    FirstName => "firstName",
    LastName => "lastName",
    Contact => "contact",
    Email => "email",
    MobileNumber => "mobileNumber",
    Addresses => "addresses",
    Premise => "premise",
    CountryCode => "countryCode",
    Postcode => "postcode",
    County => "county",
    City => "city",
    AddressType => "addressType",
    // bank account
    BankAccount => "bankAccount",
    BankId => "bankId",
    SortCode => "sortCode",
    AccountNumber => "accountNumber",
    AccountName => "accountName",
    // documents
    Documents => "documents",
    DocumentId => "documentId",
    DocumentName => "documentName",
    DocumentUrl => "documentUrl",
    // custom fields and extensions
    CustomFields => "customFields",
    Key => "key",
    Value => "value",
    Extensions => "extensions",
    AddDeduct => "addDeduct",
    Type => "type",
    Name => "name",
    // items
    Items => "items",
    ItemReference => "itemReference",
    Quantity => "quantity",
    Rate => "rate",
    ItemName => "itemName",
    ItemUom => "itemUOM",
    // login
    Username => "username",
    Password => "password",
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| FormError::InvalidPath(s.to_string()))
    }
}

/// One step of a path: a named field or a position in a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Field(FieldName),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Location of a field or list inside a form
///
/// Paths address list entries by position. Positions shift when an entry
/// is removed; the stable handle of an entry is its
/// [`EntryId`](core_kernel::EntryId), not its path.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path (the form itself)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A path with a single top-level field
    pub fn of(name: FieldName) -> Self {
        Self(vec![PathSegment::Field(name)])
    }

    /// Extends the path with a field name
    pub fn field(mut self, name: FieldName) -> Self {
        self.0.push(PathSegment::Field(name));
        self
    }

    /// Extends the path with a list position
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `prefix` is this path or one of its ancestors
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Maps this path across the removal of `list[index]`
    ///
    /// Paths inside the removed entry yield `None`. Paths inside later
    /// siblings move down by one position. Everything else is unchanged.
    pub fn after_removal(&self, list: &FieldPath, index: usize) -> Option<FieldPath> {
        if !self.starts_with(list) {
            return Some(self.clone());
        }
        match self.0.get(list.len()) {
            Some(PathSegment::Index(i)) if *i == index => None,
            Some(PathSegment::Index(i)) if *i > index => {
                let mut segments = self.0.clone();
                segments[list.len()] = PathSegment::Index(i - 1);
                Some(FieldPath(segments))
            }
            _ => Some(self.clone()),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(FieldPath::root());
        }
        s.split('.')
            .map(|part| match part.parse::<usize>() {
                Ok(index) => Ok(PathSegment::Index(index)),
                Err(_) => part
                    .parse::<FieldName>()
                    .map(PathSegment::Field)
                    .map_err(|_| FormError::InvalidPath(s.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FieldPath)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_path(item: usize) -> FieldPath {
        FieldPath::of(FieldName::Items).index(item).field(FieldName::Rate)
    }

    #[test]
    fn test_display_dotted() {
        let path = FieldPath::of(FieldName::Customer)
            .field(FieldName::Contact)
            .field(FieldName::Email);
        assert_eq!(path.to_string(), "customer.contact.email");
        assert_eq!(rate_path(2).to_string(), "items.2.rate");
    }

    #[test]
    fn test_parse_dotted() {
        let parsed: FieldPath = "items.2.rate".parse().unwrap();
        assert_eq!(parsed, rate_path(2));

        let uom: FieldPath = "items.0.itemUOM".parse().unwrap();
        assert_eq!(uom, FieldPath::of(FieldName::Items).index(0).field(FieldName::ItemUom));
    }

    #[test]
    fn test_parse_rejects_unknown_name() {
        let result = "items.0.colour".parse::<FieldPath>();
        assert!(matches!(result, Err(FormError::InvalidPath(_))));
    }

    #[test]
    fn test_after_removal_drops_removed_entry() {
        let list = FieldPath::of(FieldName::Items);
        assert_eq!(rate_path(1).after_removal(&list, 1), None);
    }

    #[test]
    fn test_after_removal_shifts_later_siblings() {
        let list = FieldPath::of(FieldName::Items);
        assert_eq!(rate_path(3).after_removal(&list, 1), Some(rate_path(2)));
        assert_eq!(rate_path(0).after_removal(&list, 1), Some(rate_path(0)));
    }

    #[test]
    fn test_after_removal_ignores_other_lists() {
        let list = FieldPath::of(FieldName::Extensions);
        assert_eq!(rate_path(3).after_removal(&list, 0), Some(rate_path(3)));
    }

    #[test]
    fn test_ordering_is_positional() {
        assert!(rate_path(1) < rate_path(2));
        assert!(FieldPath::of(FieldName::InvoiceNumber) < FieldPath::of(FieldName::Items));
    }
}
