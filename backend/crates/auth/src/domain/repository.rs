//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::{personal_access_token::PersonalAccessToken, user::User};
use crate::domain::value_object::{email::Email, token_id::TokenId, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    ///
    /// Fails with `AuthError::EmailTaken` when the email is already stored.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by normalized email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if email exists
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;
}

/// Personal access token repository trait
#[trait_variant::make(PersonalAccessTokenRepository: Send)]
pub trait LocalPersonalAccessTokenRepository {
    /// Persist a freshly issued token
    async fn store_token(&self, token: &PersonalAccessToken) -> AuthResult<()>;

    /// Find token by ID
    async fn find_token_by_id(&self, token_id: &TokenId)
    -> AuthResult<Option<PersonalAccessToken>>;

    /// Find token by secret hash
    async fn find_token_by_hash(&self, token_hash: &str)
    -> AuthResult<Option<PersonalAccessToken>>;

    /// Record a successful authentication
    async fn touch_token(&self, token_id: &TokenId, at: DateTime<Utc>) -> AuthResult<()>;

    /// Delete tokens whose expiry has passed
    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}
