//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod argon2;
pub mod memory;
pub mod postgres;
pub mod token;

pub use argon2::Argon2PasswordHasher;
pub use memory::MemoryAuthRepository;
pub use postgres::{PgAuthRepository, PgRateLimiter};
pub use token::PersonalAccessTokenIssuer;
