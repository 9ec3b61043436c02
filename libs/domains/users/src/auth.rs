use axum_helpers::JwtAuth;
use std::sync::{Arc, OnceLock};
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, TokenResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

const DUMMY_PASSWORD: &str = "dummy-password-for-timing";

/// Credential check and token issuance
pub struct AuthService<R: UserRepository> {
    users: UserService<R>,
    jwt: JwtAuth,
    dummy_hash: Arc<OnceLock<Option<String>>>,
}

impl<R: UserRepository> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            jwt: self.jwt.clone(),
            dummy_hash: Arc::clone(&self.dummy_hash),
        }
    }
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(users: UserService<R>, jwt: JwtAuth) -> Self {
        Self {
            users,
            jwt,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Verify email/password and sign a token for the user.
    ///
    /// Unknown email and wrong password fail identically. An unknown email
    /// still pays for one hash verification.
    pub async fn login(&self, input: LoginRequest) -> UserResult<TokenResponse> {
        input.validate()?;

        let hasher = self.users.hasher();
        let Some(user) = self.users.find_by_email(&input.email).await? else {
            if let Some(hash) = self.dummy_hash.get_or_init(|| hasher.hash(DUMMY_PASSWORD).ok()) {
                let _ = hasher.verify(&input.password, hash);
            }
            tracing::debug!("Login attempt for unknown email");
            return Err(UserError::InvalidCredentials);
        };

        if !hasher.verify(&input.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(UserError::InvalidCredentials);
        }

        let token = self
            .jwt
            .create_token(&user.id.to_string(), &user.email)
            .map_err(|e| UserError::Token(e.to_string()))?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(TokenResponse { token })
    }
}
