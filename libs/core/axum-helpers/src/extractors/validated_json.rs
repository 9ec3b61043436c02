//! JSON extractor that runs `validator` rules before the handler sees the payload.

use crate::errors::{AppError, FieldError};
use axum::extract::{FromRequest, Json, Request, rejection::JsonRejection};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body that has passed its `Validate` rules.
///
/// Malformed JSON is rejected as [`AppError::JsonExtractorRejection`]. A field
/// of the wrong type, and every rule violation, becomes [`AppError::Validation`]
/// with one entry per failure.
///
/// ```ignore
/// async fn create_user(ValidatedJson(input): ValidatedJson<CreateUser>) -> impl IntoResponse {
///     // input.validate() already returned Ok
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                JsonRejection::JsonDataError(e) => {
                    AppError::Validation(vec![data_error_field(&e.body_text())])
                }
                other => AppError::JsonExtractorRejection(other),
            })?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Turns a deserialization failure into a field error.
///
/// The rejection text is `<prefix>: <path>: <error>`; the path is omitted when
/// the failure is at the top level, which is reported under `body`.
fn data_error_field(text: &str) -> FieldError {
    let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);

    match detail.split_once(": ") {
        Some((path, error)) if !path.is_empty() && !path.contains(' ') => {
            FieldError::new(path, "invalid_type", error)
        }
        _ => FieldError::new("body", "invalid_type", detail),
    }
}
