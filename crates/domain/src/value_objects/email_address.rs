//! Email address value object with validation
//!
//! The normalized (trimmed, lower-cased) form is the natural key used by
//! upsert-by-email, so normalization happens at construction and nowhere else.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::DomainError;

/// A validated, normalized email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(transparent)]
pub struct EmailAddress {
    #[validate(email)]
    value: String,
}

impl EmailAddress {
    /// Create a new email address, trimming, lower-casing and validating
    pub fn new(email: impl Into<String>) -> Result<Self, DomainError> {
        let value = email.into().trim().to_lowercase();

        let candidate = Self { value };
        candidate
            .validate()
            .map_err(|e| DomainError::InvalidEmailAddress(e.to_string()))?;

        Ok(candidate)
    }

    /// Get the email address as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get the local part (before @)
    pub fn local_part(&self) -> &str {
        self.value.split('@').next().unwrap_or("")
    }

    /// Get the domain part (after @)
    pub fn domain(&self) -> &str {
        self.value.split('@').nth(1).unwrap_or("")
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_is_accepted() {
        let email = EmailAddress::new("user@example.com").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn email_is_normalized_to_lowercase() {
        let email = EmailAddress::new("User@Example.COM").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn whitespace_trimmed() {
        let email = EmailAddress::new("  a@x.io  ").unwrap();
        assert_eq!(email.as_str(), "a@x.io");
    }

    #[test]
    fn normalized_forms_are_equal() {
        let e1 = EmailAddress::new("A@X.io").unwrap();
        let e2 = EmailAddress::new(" a@x.io").unwrap();
        assert_eq!(e1, e2);
    }

    #[test]
    fn email_parts_are_extracted() {
        let email = EmailAddress::new("owner@taskboard.dev").unwrap();
        assert_eq!(email.local_part(), "owner");
        assert_eq!(email.domain(), "taskboard.dev");
    }

    #[test]
    fn invalid_email_is_rejected() {
        assert!(EmailAddress::new("not-an-email").is_err());
        assert!(EmailAddress::new("@nodomain.com").is_err());
        assert!(EmailAddress::new("noat.com").is_err());
    }

    #[test]
    fn display_format() {
        let email = EmailAddress::new("test@example.com").unwrap();
        assert_eq!(email.to_string(), "test@example.com");
    }

    #[test]
    fn try_from_str() {
        let email: EmailAddress = "test@example.com".try_into().unwrap();
        assert_eq!(email.as_str(), "test@example.com");
    }

    #[test]
    fn serialization_is_transparent() {
        let email = EmailAddress::new("test@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, r#""test@example.com""#);
        let parsed: EmailAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(email, parsed);
    }
}
