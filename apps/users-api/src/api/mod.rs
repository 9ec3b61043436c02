//! API routes module

pub mod health;

use axum::Router;
use axum_helpers::JwtAuth;
use database::postgres::{connect_from_config_with_retry, run_migrations};
use domain_users::{
    AuthService, FileUserRepository, InMemoryUserRepository, PostgresUserRepository,
    UserRepository, UserService, auth_handlers, handlers,
};
use migration::Migrator;
use tracing::info;

use crate::config::{Config, StoreKind};

/// Routers built around one user store
pub struct Routes {
    /// Mounted under `/api`
    pub api: Router,
    /// Mounted at the root next to `/health`
    pub ready: Router,
}

/// Open the configured store and build the routers over it.
pub async fn routes(config: &Config) -> eyre::Result<Routes> {
    let jwt = JwtAuth::new(&config.jwt);

    match config.store {
        StoreKind::Memory => {
            info!("Using in-memory user store");
            Ok(mount(InMemoryUserRepository::new(), jwt))
        }
        StoreKind::File => {
            info!(path = %config.users_file.display(), "Using file user store");
            let repository = FileUserRepository::open(&config.users_file).await?;
            Ok(mount(repository, jwt))
        }
        StoreKind::Postgres => {
            let postgres = config
                .postgres
                .clone()
                .ok_or_else(|| eyre::eyre!("USER_STORE=postgres requires DATABASE_URL"))?;

            info!("Connecting to PostgreSQL");
            let db = connect_from_config_with_retry(postgres, None).await?;
            run_migrations::<Migrator>(&db, config.app.name).await?;

            Ok(mount(PostgresUserRepository::new(db), jwt))
        }
    }
}

/// Wire one repository into the users, login and readiness routers
pub fn mount<R: UserRepository + 'static>(repository: R, jwt: JwtAuth) -> Routes {
    let users = UserService::new(repository);
    let auth = AuthService::new(users.clone(), jwt.clone());

    let api = Router::new()
        .nest("/users", handlers::router(users.clone(), jwt))
        .merge(auth_handlers::router(auth));

    Routes {
        api,
        ready: health::router(users),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::openapi::ApiDoc;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum_helpers::{JwtConfig, create_router, health_router};
    use core_config::{app_info, server::ServerConfig};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use tower::ServiceExt;

    const SECRET: &str = "api-test-secret-that-is-at-least-32-bytes";

    fn config(store: StoreKind, users_file: PathBuf) -> Config {
        Config {
            app: app_info!(),
            server: ServerConfig::default(),
            environment: Environment::Development,
            store,
            users_file,
            postgres: None,
            jwt: JwtConfig::new(SECRET),
        }
    }

    fn app(routes: Routes) -> Router {
        create_router::<ApiDoc>(routes.api, &ServerConfig::default())
            .unwrap()
            .merge(health_router(app_info!()))
            .merge(routes.ready)
    }

    async fn json_body(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn grace() -> Value {
        json!({
            "name": "Grace Hopper",
            "email": "grace@example.com",
            "password": "C0bol!rules",
            "confPassword": "C0bol!rules",
            "contact": "12025550199",
            "module": "compilers"
        })
    }

    #[tokio::test]
    async fn test_register_login_and_list_through_api_prefix() {
        let app = app(mount(
            InMemoryUserRepository::new(),
            JwtAuth::new(&JwtConfig::new(SECRET)),
        ));

        let response = app.clone().oneshot(post("/api/users", grace())).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(post(
                "/api/login",
                json!({"email": "grace@example.com", "password": "C0bol!rules"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = json_body(response.into_body()).await["token"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let users = json_body(response.into_body()).await;
        assert_eq!(users.as_array().unwrap().len(), 1);

        let response = app.oneshot(get("/api/users")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_ready_and_fallback() {
        let app = app(mount(
            InMemoryUserRepository::new(),
            JwtAuth::new(&JwtConfig::new(SECRET)),
        ));

        let response = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response.into_body()).await["name"], "users_api");

        let response = app.clone().oneshot(get("/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response.into_body()).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["store"], "connected");

        let response = app.oneshot(get("/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = app(mount(
            InMemoryUserRepository::new(),
            JwtAuth::new(&JwtConfig::new(SECRET)),
        ));

        let response = app.oneshot(get("/api-docs/openapi.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc = json_body(response.into_body()).await;
        assert!(doc["paths"].get("/api/login").is_some());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(StoreKind::File, dir.path().join("data").join("users.json"));

        let first = app(routes(&config).await.unwrap());
        let response = first.oneshot(post("/api/users", grace())).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let second = app(routes(&config).await.unwrap());
        let response = second.oneshot(post("/api/users", grace())).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_corrupt_users_file_fails_start_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(routes(&config(StoreKind::File, path.clone())).await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }
}
