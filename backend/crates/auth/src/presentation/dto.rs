//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::entity::user::User;
use crate::domain::value_object::user_id::UserId;
use crate::presentation::extract::FromJsonFields;

// ============================================================================
// Requests
// ============================================================================

/// POST /register body. Absent fields surface as validation errors.
#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

/// POST /login body
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A field counts as present only when it holds a JSON string
fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_owned)
}

impl FromJsonFields for RegisterRequest {
    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            name: string_field(fields, "name"),
            email: string_field(fields, "email"),
            password: string_field(fields, "password"),
            password_confirmation: string_field(fields, "password_confirmation"),
        }
    }
}

impl FromJsonFields for LoginRequest {
    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            email: string_field(fields, "email"),
            password: string_field(fields, "password"),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Public profile fields returned after register/login
#[derive(Debug, Clone, Serialize)]
pub struct UserData {
    pub name: String,
    pub email: String,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.to_string(),
        }
    }
}

/// Successful register/login envelope
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub status: bool,
    pub message: &'static str,
    pub data: UserData,
    pub token: String,
}

impl AuthResponse {
    pub fn success(message: &'static str, user: &User, token: String) -> Self {
        Self {
            status: true,
            message,
            data: UserData::from(user),
            token,
        }
    }
}

/// `{"status": false, "message": ...}` envelope for workflow failures
#[derive(Debug, Clone, Serialize)]
pub struct StatusMessage {
    pub status: bool,
    pub message: String,
}

impl StatusMessage {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
        }
    }
}

/// GET /user body. Full record minus the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResource {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResource {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            name: user.name.clone(),
            email: user.email.to_string(),
            email_verified_at: user.email_verified_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_non_string_fields_are_absent() {
        let req = RegisterRequest::from_fields(&fields(json!({
            "name": 123,
            "email": ["john@x.com"],
            "password": "password123",
            "password_confirmation": null,
        })));

        assert!(req.name.is_none());
        assert!(req.email.is_none());
        assert_eq!(req.password.as_deref(), Some("password123"));
        assert!(req.password_confirmation.is_none());
    }

    #[test]
    fn test_login_ignores_unknown_fields() {
        let req = LoginRequest::from_fields(&fields(json!({
            "email": "john@x.com",
            "password": "secret",
            "remember": true,
        })));

        assert_eq!(req.email.as_deref(), Some("john@x.com"));
        assert_eq!(req.password.as_deref(), Some("secret"));
    }
}
