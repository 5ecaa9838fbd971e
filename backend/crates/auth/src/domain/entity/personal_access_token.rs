//! Personal Access Token Entity
//!
//! Bearer credential bound to one user. The secret half is stored as a
//! lowercase SHA-256 hex digest.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{token_id::TokenId, user_id::UserId};

/// Ability granted to every issued token
pub const WILDCARD_ABILITY: &str = "*";

#[derive(Debug, Clone)]
pub struct PersonalAccessToken {
    pub token_id: TokenId,
    pub user_id: UserId,
    /// Label, e.g. `auth_token`
    pub name: String,
    /// SHA-256 hex of the secret
    pub token_hash: String,
    pub abilities: Vec<String>,
    pub last_used_at: Option<DateTime<Utc>>,
    /// `None` means the token never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersonalAccessToken {
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        token_hash: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();

        Self {
            token_id: TokenId::new(),
            user_id,
            name: name.into(),
            token_hash,
            abilities: vec![WILDCARD_ABILITY.to_string()],
            last_used_at: None,
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: Option<DateTime<Utc>>) -> PersonalAccessToken {
        PersonalAccessToken::new(UserId::new(), "auth_token", "00".repeat(32), expires_at)
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        assert!(!token(None).is_expired(now));
        assert!(!token(Some(now + Duration::minutes(5))).is_expired(now));
        assert!(token(Some(now - Duration::seconds(1))).is_expired(now));
        assert!(token(Some(now)).is_expired(now));
    }

    #[test]
    fn test_wildcard_ability() {
        let t = token(None);
        assert_eq!(t.abilities, vec!["*"]);
    }
}
