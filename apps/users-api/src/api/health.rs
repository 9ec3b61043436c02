//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_users::{UserRepository, UserService};
use serde_json::Value;

/// 200 when the user store answers, 503 otherwise
async fn ready<R: UserRepository>(
    State(users): State<UserService<R>>,
) -> (StatusCode, Json<Value>) {
    let checks: Vec<(&str, HealthCheckFuture)> = vec![(
        "store",
        Box::pin(async { users.health_check().await.map_err(|e| e.to_string()) }),
    )];
    run_health_checks(checks).await
}

pub fn router<R: UserRepository + 'static>(users: UserService<R>) -> Router {
    Router::new()
        .route("/ready", get(ready::<R>))
        .with_state(users)
}
