//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and service traits
//! - `application/` - Validation and use cases
//! - `infra/` - PostgreSQL and in-memory stores, Argon2id, token issuer
//! - `presentation/` - HTTP handlers, DTOs, extractors, router
//!
//! ## Endpoints
//! - `POST /register` - create an account, 5 attempts per IP per hour
//! - `POST /login` - verify credentials, 5 failures per email per minute
//! - `GET /user` - current user behind a bearer token
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (optional pepper, NFKC input)
//! - Unknown emails cost one decoy verification, same as a wrong password
//! - Personal access tokens stored as SHA-256 digests only

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{MemoryAuthRepository, PgAuthRepository, PgRateLimiter};
pub use presentation::{AuthAppState, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
