//! Email Value Object
//!
//! Represents a normalized email address: surrounding whitespace trimmed
//! and lowercased. The normalized form is the natural key for users and
//! for login throttling.

use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;
use std::str::FromStr;

/// Maximum email length in characters
pub const EMAIL_MAX_LENGTH: usize = 255;

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Email(String);

impl Email {
    /// Normalize and validate
    pub fn new(email: impl AsRef<str>) -> AppResult<Self> {
        let email = Self::normalize(email.as_ref());

        if email.is_empty() {
            return Err(AppError::bad_request("Email cannot be empty"));
        }

        if email.chars().count() > EMAIL_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Email must be at most {} characters",
                EMAIL_MAX_LENGTH
            )));
        }

        if !Self::is_valid_format(&email) {
            return Err(AppError::bad_request("Invalid email format"));
        }

        Ok(Self(email))
    }

    /// Trim and lowercase
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Basic email format validation
    pub fn is_valid_format(email: &str) -> bool {
        // Must contain exactly one @
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        if domain.contains('@') {
            return false;
        }

        // Local part checks
        if local.is_empty() || local.len() > 64 {
            return false;
        }
        if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
            return false;
        }
        if local.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return false;
        }

        // Domain checks
        if domain.is_empty() || !domain.contains('.') {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        // No empty labels, and labels don't start or end with a hyphen
        domain
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Email {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("user@example.com").is_ok());
        assert!(Email::new("user.name@example.co.jp").is_ok());
        assert!(Email::new("user+tag@example.com").is_ok());
        assert!(Email::new("john@x.com").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert!(Email::new("").is_err());
        assert!(Email::new("   ").is_err());
        assert!(Email::new("userexample.com").is_err());
        assert!(Email::new("user@").is_err());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("user@@example.com").is_err());
        assert!(Email::new("user@example").is_err());
        assert!(Email::new("user@example..com").is_err());
        assert!(Email::new("us er@example.com").is_err());
        assert!(Email::new("user@-example.com").is_err());
    }

    #[test]
    fn test_email_normalization() {
        let email = Email::new("  JOHN@X.COM ").unwrap();
        assert_eq!(email.as_str(), "john@x.com");
    }

    #[test]
    fn test_email_max_length() {
        let local = "a".repeat(64);
        let domain = format!("{}.com", "b".repeat(EMAIL_MAX_LENGTH - 64 - 1 - 4));
        let exact = format!("{local}@{domain}");
        assert_eq!(exact.len(), EMAIL_MAX_LENGTH);
        assert!(Email::new(&exact).is_ok());

        let over = format!("{local}@b{domain}");
        assert!(Email::new(&over).is_err());
    }
}
