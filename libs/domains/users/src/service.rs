use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, NewUser, UpdateUser, User, UserChanges, UserResponse};
use crate::password::{Argon2Hashing, PasswordHashing};
use crate::repository::UserRepository;

/// Service layer for User business logic
///
/// Owns the uniqueness and existence rules; repositories only store.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    hasher: Arc<dyn PasswordHashing>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_hasher(repository, Argon2Hashing)
    }

    pub fn with_hasher(repository: R, hasher: impl PasswordHashing + 'static) -> Self {
        Self {
            repository: Arc::new(repository),
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new user; the email must not belong to anyone yet
    pub async fn create(&self, input: CreateUser) -> UserResult<UserResponse> {
        input.validate()?;

        if self.repository.find_by_email(&input.email).await?.is_some() {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let created = self
            .repository
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
                bio: input.bio,
                contact: input.contact,
                module: input.module,
            })
            .await?;

        Ok(created.into())
    }

    pub async fn find_all(&self) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.find_all().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    pub async fn find_one(&self, id: Uuid) -> UserResult<UserResponse> {
        self.repository
            .find_by_id(id)
            .await?
            .map(Into::into)
            .ok_or(UserError::NotFound(id))
    }

    /// Apply a partial update.
    ///
    /// The email uniqueness lookup only runs when the patch carries an email;
    /// keeping one's own address is not a conflict.
    pub async fn update(&self, id: Uuid, input: UpdateUser) -> UserResult<UserResponse> {
        input.validate()?;

        if self.repository.find_by_id(id).await?.is_none() {
            return Err(UserError::NotFound(id));
        }

        if let Some(email) = &input.email {
            if let Some(owner) = self.repository.find_by_email(email).await? {
                if owner.id != id {
                    return Err(UserError::DuplicateEmail(email.clone()));
                }
            }
        }

        let password_hash = input
            .password
            .as_deref()
            .map(|password| self.hasher.hash(password))
            .transpose()?;

        self.repository
            .update(id, UserChanges::from_update(input, password_hash))
            .await?
            .map(Into::into)
            .ok_or(UserError::NotFound(id))
    }

    pub async fn delete(&self, id: Uuid) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    /// Stored record including the password hash. Not exposed over HTTP.
    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.repository.find_by_email(email).await
    }

    pub(crate) fn hasher(&self) -> &dyn PasswordHashing {
        self.hasher.as_ref()
    }

    pub async fn health_check(&self) -> UserResult<()> {
        self.repository.health_check().await
    }
}

/// Fast reversible stand-in for Argon2 in unit tests
#[cfg(test)]
pub(crate) struct PlainHashing;

#[cfg(test)]
impl PasswordHashing for PlainHashing {
    fn hash(&self, password: &str) -> UserResult<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> UserResult<bool> {
        Ok(hash.strip_prefix("plain:") == Some(password))
    }
}
