//! Login endpoint

use axum::{Json, Router, extract::State, routing::post};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::auth::AuthService;
use crate::error::UserResult;
use crate::models::{LoginRequest, TokenResponse};
use crate::repository::UserRepository;

#[derive(OpenApi)]
#[openapi(
    paths(login),
    components(schemas(LoginRequest, TokenResponse)),
    tags(
        (name = "Auth", description = "Token issuance")
    )
)]
pub struct AuthApiDoc;

pub fn router<R: UserRepository + 'static>(service: AuthService<R>) -> Router {
    Router::new()
        .route("/login", post(login::<R>))
        .with_state(Arc::new(service))
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<AuthService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<TokenResponse>> {
    Ok(Json(service.login(input).await?))
}
