//! User Password Value Object
//!
//! Domain wrappers around `platform::password`:
//! - [`RawPassword`]: what the client typed. Zeroized on drop.
//! - [`UserPassword`]: the stored Argon2id PHC string.
//!
//! Hashing itself goes through the `PasswordHasher` service so the cost
//! parameters and pepper live in one place.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Wrapper around `ClearTextPassword`. Memory is automatically zeroized
/// when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    pub fn new(raw: String) -> Self {
        Self(ClearTextPassword::new(raw))
    }

    /// Length in characters after normalization
    pub fn char_count(&self) -> usize {
        self.0.char_count()
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password for database storage
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Create from PHC string (from database)
    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc_string)
            .map_err(|e| AppError::internal("Invalid password hash in database").with_source(e))?;

        Ok(Self(hashed))
    }

    /// Get PHC string for database storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub(crate) fn inner(&self) -> &HashedPassword {
        &self.0
    }
}

impl From<HashedPassword> for UserPassword {
    fn from(hashed: HashedPassword) -> Self {
        Self(hashed)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

impl fmt::Display for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[HASHED_PASSWORD]")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_count_is_unicode_aware() {
        assert_eq!(RawPassword::new("password".to_string()).char_count(), 8);
        assert_eq!(RawPassword::new("パスワード安全".to_string()).char_count(), 7);
    }

    #[test]
    fn test_invalid_phc_from_database() {
        let err = UserPassword::from_phc_string("plaintext").unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword123!".to_string());
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("Secret"));
    }
}
