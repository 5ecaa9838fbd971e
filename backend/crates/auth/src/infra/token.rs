//! Personal access token issuer
//!
//! Plaintext is `<token id>|<40 alphanumeric chars>`; only the SHA-256 hex
//! of the secret part is stored.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use platform::crypto::{constant_time_eq, random_alphanumeric, sha256_hex};

use crate::domain::entity::personal_access_token::PersonalAccessToken;
use crate::domain::repository::PersonalAccessTokenRepository;
use crate::domain::service::TokenIssuer;
use crate::domain::value_object::{
    plain_text_token::PlainTextToken, token_id::TokenId, user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

/// Length of the random secret
pub const TOKEN_SECRET_LENGTH: usize = 40;

pub struct PersonalAccessTokenIssuer<T> {
    tokens: Arc<T>,
    token_name: String,
    ttl: Option<Duration>,
}

impl<T> PersonalAccessTokenIssuer<T>
where
    T: PersonalAccessTokenRepository,
{
    pub fn new(tokens: Arc<T>, token_name: impl Into<String>, ttl: Option<Duration>) -> Self {
        Self {
            tokens,
            token_name: token_name.into(),
            ttl,
        }
    }

    async fn lookup(&self, bearer: &str) -> AuthResult<Option<PersonalAccessToken>> {
        let (id, secret) = PlainTextToken::split(bearer);
        let hash = sha256_hex(secret.as_bytes());

        let Some(id) = id else {
            return self.tokens.find_token_by_hash(&hash).await;
        };

        let Ok(token_id) = TokenId::parse_str(id) else {
            return Ok(None);
        };

        let token = self.tokens.find_token_by_id(&token_id).await?;
        Ok(token.filter(|t| constant_time_eq(t.token_hash.as_bytes(), hash.as_bytes())))
    }
}

impl<T> TokenIssuer for PersonalAccessTokenIssuer<T>
where
    T: PersonalAccessTokenRepository + Sync + Send,
{
    async fn issue(&self, user_id: &UserId) -> AuthResult<PlainTextToken> {
        let secret = random_alphanumeric(TOKEN_SECRET_LENGTH);

        let expires_at = match self.ttl {
            Some(ttl) => {
                let ttl = chrono::Duration::from_std(ttl)
                    .map_err(|e| AuthError::Internal(format!("Invalid token TTL: {}", e)))?;
                Some(Utc::now() + ttl)
            }
            None => None,
        };

        let token = PersonalAccessToken::new(
            *user_id,
            self.token_name.clone(),
            sha256_hex(secret.as_bytes()),
            expires_at,
        );
        self.tokens.store_token(&token).await?;

        tracing::debug!(token_id = %token.token_id, user_id = %user_id, "Issued access token");

        Ok(PlainTextToken::new(&token.token_id, &secret))
    }

    async fn authenticate(&self, bearer: &str) -> AuthResult<Option<UserId>> {
        let Some(token) = self.lookup(bearer).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if token.is_expired(now) {
            tracing::debug!(token_id = %token.token_id, "Rejected expired access token");
            return Ok(None);
        }

        self.tokens.touch_token(&token.token_id, now).await?;

        Ok(Some(token.user_id))
    }
}
