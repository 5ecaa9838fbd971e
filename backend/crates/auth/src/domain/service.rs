//! Domain Services
//!
//! Seams for the CPU-bound and credential-minting work the use cases need.
//! Implementations live in `infra`.

use crate::domain::value_object::{
    plain_text_token::PlainTextToken, user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::AuthResult;

/// Password hashing service
#[trait_variant::make(PasswordHasher: Send)]
pub trait LocalPasswordHasher {
    async fn hash(&self, password: RawPassword) -> AuthResult<UserPassword>;

    /// Verify a password against a stored hash
    async fn verify(&self, password: RawPassword, hashed: UserPassword) -> AuthResult<bool>;

    /// Spend the same work as `verify` without a stored hash
    ///
    /// Used when the email is unknown so response timing doesn't reveal
    /// which accounts exist.
    async fn verify_dummy(&self, password: RawPassword) -> AuthResult<()>;
}

/// Bearer token issuing service
#[trait_variant::make(TokenIssuer: Send)]
pub trait LocalTokenIssuer {
    /// Mint and persist a new token for the user
    async fn issue(&self, user_id: &UserId) -> AuthResult<PlainTextToken>;

    /// Resolve a presented bearer value to its owner
    ///
    /// Returns `None` for unknown, mismatched or expired tokens.
    async fn authenticate(&self, bearer: &str) -> AuthResult<Option<UserId>>;
}
