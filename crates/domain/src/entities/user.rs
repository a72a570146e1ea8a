//! User entity - Owner or assignee of tasks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{EmailAddress, UserId};

/// A user that can own and be assigned tasks
///
/// The normalized email is the natural key: creating a task for an email
/// that already exists updates that user in place (upsert) rather than
/// inserting a duplicate. Users are never deleted while referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Display name
    pub full_name: String,
    /// Normalized email address, unique across all users
    pub email: EmailAddress,
    /// Contact telephone number
    pub telephone: String,
    /// When this user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    #[must_use]
    pub fn new(
        full_name: impl Into<String>,
        email: EmailAddress,
        telephone: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(),
            full_name: full_name.into(),
            email,
            telephone: telephone.into(),
            created_at: Utc::now(),
        }
    }

    /// Check whether an upsert with these contact details would change anything
    #[must_use]
    pub fn matches_contact(&self, full_name: &str, telephone: &str) -> bool {
        self.full_name == full_name && self.telephone == telephone
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.full_name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_email() -> EmailAddress {
        EmailAddress::new("a@x.io").unwrap()
    }

    #[test]
    fn new_user_has_fresh_id() {
        let u1 = User::new("Ada", sample_email(), "+972501234567");
        let u2 = User::new("Ada", sample_email(), "+972501234567");
        assert_ne!(u1.id, u2.id);
    }

    #[test]
    fn matches_contact() {
        let user = User::new("Ada", sample_email(), "+972501234567");
        assert!(user.matches_contact("Ada", "+972501234567"));
        assert!(!user.matches_contact("Ada L.", "+972501234567"));
        assert!(!user.matches_contact("Ada", "+15550001111"));
    }

    #[test]
    fn display_format() {
        let user = User::new("Ada", sample_email(), "+972501234567");
        assert_eq!(user.to_string(), "Ada <a@x.io>");
    }

    #[test]
    fn serialization_roundtrip() {
        let user = User::new("Ada", sample_email(), "+972501234567");
        let json = serde_json::to_string(&user).unwrap();
        let parsed: User = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, user);
    }
}
