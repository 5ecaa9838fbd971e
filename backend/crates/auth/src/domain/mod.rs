//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the service
//! seams (password hashing, token issuing) the use cases depend on.

pub mod entity;
pub mod repository;
pub mod service;
pub mod value_object;

// Re-exports
pub use entity::{personal_access_token::PersonalAccessToken, user::User};
pub use repository::{PersonalAccessTokenRepository, UserRepository};
pub use service::{PasswordHasher, TokenIssuer};
