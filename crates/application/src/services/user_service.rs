//! User service - Explicit user management
//!
//! Users are also upserted implicitly by the task service; this service
//! carries the explicit API operations. The core never deletes users.

use std::sync::Arc;

use domain::entities::User;
use domain::value_objects::{EmailAddress, UserId};
use tracing::{info, instrument};

use crate::error::ApplicationError;
use crate::pagination::{Page, PageRequest};
use crate::ports::UserStorePort;
use crate::services::task_service::UserInput;

/// Service for explicit user operations
pub struct UserService {
    users: Arc<dyn UserStorePort>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl UserService {
    /// Create a new user service
    pub fn new(users: Arc<dyn UserStorePort>) -> Self {
        Self { users }
    }

    /// Create a user; a duplicate normalized email is a validation error
    #[instrument(skip(self, input))]
    pub async fn create_user(&self, input: UserInput) -> Result<User, ApplicationError> {
        let email = EmailAddress::new(&input.email)?;
        let user = User::new(input.full_name, email, input.telephone);

        self.users.create(&user).await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Get a user by id
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &UserId) -> Result<Option<User>, ApplicationError> {
        self.users.find(id).await
    }

    /// Get a user by email; the input is normalized before lookup
    #[instrument(skip(self, raw_email))]
    pub async fn get_user_by_email(
        &self,
        raw_email: &str,
    ) -> Result<Option<User>, ApplicationError> {
        let email = EmailAddress::new(raw_email)?;
        self.users.find_by_email(&email).await
    }

    /// List users, optionally filtered by a substring of name or email
    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<User>, ApplicationError> {
        let term = search.map(str::trim).filter(|t| !t.is_empty());
        self.users.search(term, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockUserStorePort;

    fn sample_input() -> UserInput {
        UserInput {
            full_name: "Ada".to_string(),
            email: "Ada@X.io".to_string(),
            telephone: "+972501234567".to_string(),
        }
    }

    #[tokio::test]
    async fn create_normalizes_email() {
        let mut users = MockUserStorePort::new();
        users
            .expect_create()
            .withf(|user| user.email.as_str() == "ada@x.io")
            .times(1)
            .returning(|_| Ok(()));

        let svc = UserService::new(Arc::new(users));
        let user = svc.create_user(sample_input()).await.unwrap();
        assert_eq!(user.email.as_str(), "ada@x.io");
    }

    #[tokio::test]
    async fn create_rejects_invalid_email() {
        let svc = UserService::new(Arc::new(MockUserStorePort::new()));

        let mut input = sample_input();
        input.email = "not-an-email".to_string();

        let result = svc.create_user(input).await;
        assert!(matches!(result, Err(ApplicationError::Domain(_))));
    }

    #[tokio::test]
    async fn create_surfaces_duplicate_email() {
        let mut users = MockUserStorePort::new();
        users.expect_create().returning(|_| {
            Err(ApplicationError::Validation(
                "email already in use".to_string(),
            ))
        });

        let svc = UserService::new(Arc::new(users));
        let result = svc.create_user(sample_input()).await;
        assert!(matches!(result, Err(ApplicationError::Validation(_))));
    }

    #[tokio::test]
    async fn lookup_by_email_normalizes() {
        let mut users = MockUserStorePort::new();
        users
            .expect_find_by_email()
            .withf(|email| email.as_str() == "ada@x.io")
            .returning(|_| Ok(None));

        let svc = UserService::new(Arc::new(users));
        let found = svc.get_user_by_email("  ADA@x.io ").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn list_drops_blank_search_terms() {
        let mut users = MockUserStorePort::new();
        users
            .expect_search()
            .withf(|term, _| term.is_none())
            .returning(|_, page| Ok(Page::new(vec![], page, 0)));

        let svc = UserService::new(Arc::new(users));
        let page = svc
            .list_users(Some("   "), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total_items, 0);
    }
}
