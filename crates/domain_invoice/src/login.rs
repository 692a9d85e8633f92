//! Login form

use std::fmt;

use crate::path::{FieldName, FieldPath, PathSegment};
use crate::schema::{FieldSchema, FieldSource, Rule, Schema, ValidationErrors};
use crate::value::{FieldValue, ValueKind};

static LOGIN: &[FieldSchema] = &[
    FieldSchema::leaf(FieldName::Username, ValueKind::Text, &[Rule::Required("Username is required")]),
    FieldSchema::leaf(FieldName::Password, ValueKind::Text, &[Rule::Required("Password is required")]),
];

pub static LOGIN_SCHEMA: Schema = Schema::new(LOGIN);

/// Credentials typed into the login page
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> ValidationErrors {
        LOGIN_SCHEMA.validate(self)
    }
}

impl FieldSource for LoginForm {
    fn field_value(&self, path: &FieldPath) -> Option<FieldValue> {
        match path.segments() {
            [PathSegment::Field(FieldName::Username)] => Some(FieldValue::from(self.username.as_str())),
            [PathSegment::Field(FieldName::Password)] => Some(FieldValue::from(self.password.as_str())),
            _ => None,
        }
    }

    fn list_len(&self, _path: &FieldPath) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_login_reports_both_fields() {
        let errors = LoginForm::default().validate();
        assert_eq!(errors.get(&FieldPath::of(FieldName::Username)), Some("Username is required"));
        assert_eq!(errors.get(&FieldPath::of(FieldName::Password)), Some("Password is required"));
    }

    #[test]
    fn test_filled_login_is_valid() {
        assert!(LoginForm::new("jane", "s3cret").validate().is_empty());
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", LoginForm::new("jane", "s3cret"));
        assert!(rendered.contains("jane"));
        assert!(!rendered.contains("s3cret"));
    }
}
