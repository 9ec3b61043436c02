use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, FieldError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with id '{0}' not found")]
    NotFound(Uuid),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<validator::ValidationErrors> for UserError {
    fn from(errors: validator::ValidationErrors) -> Self {
        UserError::Validation(axum_helpers::errors::field_errors(&errors))
    }
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        UserError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for UserError {
    fn from(err: std::io::Error) -> Self {
        UserError::Storage(err.to_string())
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AppError::NotFound(err.to_string()),
            UserError::DuplicateEmail(_) => AppError::Conflict(err.to_string()),
            UserError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            UserError::Validation(fields) => AppError::Validation(fields),
            UserError::PasswordHash(_)
            | UserError::Token(_)
            | UserError::Storage(_)
            | UserError::Internal(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: UserError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(UserError::NotFound(Uuid::new_v4())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(UserError::DuplicateEmail("a@x.com".into())), StatusCode::CONFLICT);
        assert_eq!(status_of(UserError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(UserError::Validation(vec![])), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(UserError::Storage("disk full".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(UserError::Token("bad key".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_credentials_message_is_uniform() {
        assert_eq!(UserError::InvalidCredentials.to_string(), "Invalid email or password");
    }
}
