//! Field-level validation errors.
//!
//! Checks record at most one message per field; the first failing check for a
//! field wins so clients see the most basic problem first.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

lazy_static! {
    /// Pragmatic e-mail shape check (local part, `@`, dotted domain).
    pub static ref EMAIL_RX: Regex = Regex::new(concat!(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
        r"[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    ))
    .expect("e-mail pattern is valid");
}

/// Collected `field -> message` validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field failure.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record `message` for `field` unless the field already has one.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Record `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Fold `other` in; fields already recorded keep their first message.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "validation failed ({})", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// E-mail must be present and well-formed.
pub fn validate_email(v: &mut ValidationErrors, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(
        EMAIL_RX.is_match(email),
        "email",
        "must be a valid email address",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_per_field_wins() {
        let mut v = ValidationErrors::new();
        v.add("email", "must be provided");
        v.add("email", "must be a valid email address");
        assert_eq!(v.get("email"), Some("must be provided"));
    }

    #[test]
    fn test_merge_keeps_existing_messages() {
        let mut v = ValidationErrors::single("price", "must be a non-negative number");
        let mut other = ValidationErrors::single("sort", "invalid sort value");
        other.add("price", "ignored");
        v.merge(other);
        assert_eq!(v.get("price"), Some("must be a non-negative number"));
        assert_eq!(v.get("sort"), Some("invalid sort value"));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());
        let err = ValidationErrors::single("page", "must be greater than zero")
            .into_result()
            .unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["page"]);
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let v = ValidationErrors::single("sort", "invalid sort value");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, serde_json::json!({"sort": "invalid sort value"}));
    }

    #[test]
    fn test_validate_email() {
        let mut v = ValidationErrors::new();
        validate_email(&mut v, "alice@example.com");
        assert!(v.is_empty());

        let mut v = ValidationErrors::new();
        validate_email(&mut v, "");
        assert_eq!(v.get("email"), Some("must be provided"));

        let mut v = ValidationErrors::new();
        validate_email(&mut v, "not-an-email");
        assert_eq!(v.get("email"), Some("must be a valid email address"));
    }
}
