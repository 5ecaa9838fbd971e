//! In-memory repository
//!
//! Single-process store used when no database is configured, and by the
//! test suites. Clones share the same maps.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use crate::domain::entity::{personal_access_token::PersonalAccessToken, user::User};
use crate::domain::repository::{PersonalAccessTokenRepository, UserRepository};
use crate::domain::value_object::{email::Email, token_id::TokenId, user_id::UserId};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    /// Keyed by normalized email, which makes `create` race-safe
    users: Arc<DashMap<String, User>>,
    tokens: Arc<DashMap<Uuid, PersonalAccessToken>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        match self.users.entry(user.email.as_str().to_owned()) {
            Entry::Occupied(_) => Err(AuthError::EmailTaken),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().user_id == *user_id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self.users.get(email.as_str()).map(|entry| entry.value().clone()))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.users.contains_key(email.as_str()))
    }
}

impl PersonalAccessTokenRepository for MemoryAuthRepository {
    async fn store_token(&self, token: &PersonalAccessToken) -> AuthResult<()> {
        self.tokens.insert(*token.token_id.as_uuid(), token.clone());
        Ok(())
    }

    async fn find_token_by_id(
        &self,
        token_id: &TokenId,
    ) -> AuthResult<Option<PersonalAccessToken>> {
        Ok(self
            .tokens
            .get(token_id.as_uuid())
            .map(|entry| entry.value().clone()))
    }

    async fn find_token_by_hash(
        &self,
        token_hash: &str,
    ) -> AuthResult<Option<PersonalAccessToken>> {
        Ok(self
            .tokens
            .iter()
            .find(|entry| entry.value().token_hash == token_hash)
            .map(|entry| entry.value().clone()))
    }

    async fn touch_token(&self, token_id: &TokenId, at: DateTime<Utc>) -> AuthResult<()> {
        if let Some(mut token) = self.tokens.get_mut(token_id.as_uuid()) {
            token.last_used_at = Some(at);
            token.updated_at = at;
        }
        Ok(())
    }

    async fn delete_expired_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| !token.is_expired(now));
        Ok(before.saturating_sub(self.tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::UserPassword;

    const PHC: &str = "$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$Zm9vYmFyYmF6cXV4";

    fn user(email: &str) -> User {
        User::new(
            "John",
            Email::new(email).unwrap(),
            UserPassword::from_phc_string(PHC).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let repo = MemoryAuthRepository::new();
        repo.create(&user("john@x.com")).await.unwrap();

        let err = repo.create(&user("john@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_find_by_email_and_id() {
        let repo = MemoryAuthRepository::new();
        let created = user("john@x.com");
        repo.create(&created).await.unwrap();

        let by_email = repo
            .find_by_email(&Email::new("john@x.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.user_id, created.user_id);

        let by_id = repo.find_by_id(&created.user_id).await.unwrap().unwrap();
        assert_eq!(by_id.email.as_str(), "john@x.com");

        assert!(repo.find_by_id(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_tokens() {
        let repo = MemoryAuthRepository::new();
        let now = Utc::now();
        let owner = UserId::new();

        let live = PersonalAccessToken::new(owner, "auth_token", "a".repeat(64), None);
        let stale = PersonalAccessToken::new(
            owner,
            "auth_token",
            "b".repeat(64),
            Some(now - chrono::Duration::minutes(1)),
        );
        repo.store_token(&live).await.unwrap();
        repo.store_token(&stale).await.unwrap();

        assert_eq!(repo.delete_expired_tokens(now).await.unwrap(), 1);
        assert!(repo.find_token_by_id(&live.token_id).await.unwrap().is_some());
        assert!(repo.find_token_by_id(&stale.token_id).await.unwrap().is_none());
    }
}
