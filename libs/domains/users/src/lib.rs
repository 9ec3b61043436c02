//! Users Domain
//!
//! User accounts behind a JSON API: registration, listing, lookup, partial
//! update, deletion and password login issuing a bearer token.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, request validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Uniqueness rules, password hashing, login
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Storage (in-memory, JSON file, PostgreSQL)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//!
//! let jwt = JwtAuth::new(&JwtConfig::new("a-secret-that-is-at-least-32-bytes!"));
//! let service = UserService::new(InMemoryUserRepository::new());
//!
//! let router = handlers::router(service, jwt);
//! ```

pub mod auth;
pub mod auth_handlers;
pub mod entity;
pub mod error;
pub mod file_repository;
pub mod handlers;
pub mod models;
pub mod password;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod validation;

pub use auth::AuthService;
pub use error::{UserError, UserResult};
pub use file_repository::FileUserRepository;
pub use models::{CreateUser, LoginRequest, TokenResponse, UpdateUser, User, UserResponse};
pub use password::{Argon2Hashing, PasswordHashing};
pub use postgres::PostgresUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
