//! User Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{email::Email, user_id::UserId, user_password::UserPassword};

/// User entity
///
/// The password hash travels with the record but is never serialized;
/// responses go through the presentation DTOs.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Display name, trimmed
    pub name: String,
    /// Normalized email (unique)
    pub email: Email,
    /// Argon2id hash
    pub password: UserPassword,
    /// Never set by this service
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(name: impl Into<String>, email: Email, password: UserPassword) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            name: name.into(),
            email,
            password,
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
