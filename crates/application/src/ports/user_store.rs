//! User storage port
//!
//! Users are created explicitly or upserted by email during task writes;
//! the core never deletes them.

use async_trait::async_trait;
use domain::entities::User;
use domain::value_objects::{EmailAddress, UserId};
#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::error::ApplicationError;
use crate::pagination::{Page, PageRequest};

/// Port for user persistence operations
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait UserStorePort: Send + Sync {
    /// Insert a new user; a normalized-email collision is a
    /// `Validation` error
    async fn create(&self, user: &User) -> Result<(), ApplicationError>;

    /// Find a user by id
    async fn find(&self, id: &UserId) -> Result<Option<User>, ApplicationError>;

    /// Find several users by id in one round trip
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, ApplicationError>;

    /// Find a user by normalized email
    async fn find_by_email(&self, email: &EmailAddress)
    -> Result<Option<User>, ApplicationError>;

    /// Insert-or-update keyed on the normalized email, as a single
    /// conditional statement (not a read-then-write): creates the user if
    /// the email is unknown, otherwise updates name and telephone in
    /// place. Returns the stored row either way.
    async fn upsert_by_email(
        &self,
        full_name: &str,
        email: &EmailAddress,
        telephone: &str,
    ) -> Result<User, ApplicationError>;

    /// Check whether a user exists
    async fn exists(&self, id: &UserId) -> Result<bool, ApplicationError>;

    /// List users, optionally filtered by a case-insensitive substring of
    /// name or email
    async fn search<'a>(
        &self,
        term: Option<&'a str>,
        page: PageRequest,
    ) -> Result<Page<User>, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn UserStorePort) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn UserStorePort>();
    }
}
