use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, User, UserChanges};

/// Repository trait for User persistence
///
/// Implementations assign identity on create. Email lookups ignore ASCII case.
/// The list-backed stores return `find_all` in insertion order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user with a freshly generated id
    async fn create(&self, input: NewUser) -> UserResult<User>;

    /// Every stored user
    async fn find_all(&self) -> UserResult<Vec<User>>;

    /// Get a user by ID
    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Get a user by email
    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Apply a partial update; `None` if no user has `id`
    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<Option<User>>;

    /// Delete a user by ID; `false` if nothing was removed
    async fn delete(&self, id: Uuid) -> UserResult<bool>;

    /// Readiness check for the backing store
    async fn health_check(&self) -> UserResult<()> {
        Ok(())
    }
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Email uniqueness backstop shared by the list-backed stores
pub(crate) fn ensure_email_free(users: &[User], email: &str, except: Option<Uuid>) -> UserResult<()> {
    let taken = users
        .iter()
        .any(|u| Some(u.id) != except && u.has_email(email));

    if taken {
        Err(UserError::DuplicateEmail(email.to_string()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: NewUser) -> UserResult<User> {
        let mut users = self.users.write().await;
        ensure_email_free(&users, &input.email, None)?;

        let user = User::new(input);
        users.push(user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.has_email(email)).cloned())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;

        let Some(index) = users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(email) = &changes.email {
            ensure_email_free(&users, email, Some(id))?;
        }

        let user = &mut users[index];
        user.apply_changes(changes);

        tracing::info!(user_id = %id, "Updated user");
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;

        let before = users.len();
        users.retain(|u| u.id != id);

        if users.len() < before {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
