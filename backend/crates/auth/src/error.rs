//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Workflow outcomes (throttling, bad credentials, workflow failures)
//! render as `{"status": false, "message": ...}`. Everything else goes
//! through `AppError` and renders as `{"message": ...}`.

use std::time::Duration;

use axum::Json;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::validation::FieldErrors;
use platform::password::PasswordHashError;
use platform::rate_limit::RateLimitError;
use thiserror::Error;

use crate::presentation::dto::StatusMessage;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request fields failed validation
    #[error("{0}")]
    Validation(FieldErrors),

    /// Registration budget for this IP is spent
    #[error("Too many registration attempts from this IP. Please try again later")]
    RegistrationThrottled { retry_after: Duration },

    /// Login budget for this email is spent
    #[error("Too many login attempts. Please try again later.")]
    LoginThrottled { retry_after: Duration },

    /// Unknown email or wrong password
    #[error("Invalid credentials.")]
    InvalidCredentials,

    /// Registration could not be completed
    #[error("Registration failed. Please try again later.")]
    RegistrationFailed(#[source] Box<AuthError>),

    /// Login could not be completed for a reason other than credentials
    #[error("An error occurred during login. Please try again later.")]
    LoginFailed(#[source] Box<AuthError>),

    /// Missing, unknown, or expired bearer token
    #[error("Unauthenticated.")]
    Unauthenticated,

    /// Unique constraint on the email column fired
    #[error("Email already registered")]
    EmailTaken,

    /// Body could not be read, e.g. over the size limit
    #[error("Unreadable request body: {0}")]
    MalformedRequest(#[from] BytesRejection),

    /// Rate limiter backend error
    #[error("Rate limiter error: {0}")]
    RateLimit(#[from] RateLimitError),

    /// Password hashing error
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordHashError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MalformedRequest(rejection) => rejection.status(),
            _ => StatusCode::from_u16(self.kind().status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) | AuthError::EmailTaken => ErrorKind::UnprocessableEntity,
            AuthError::RegistrationThrottled { .. } | AuthError::LoginThrottled { .. } => {
                ErrorKind::TooManyRequests
            }
            AuthError::InvalidCredentials | AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::MalformedRequest(_) => ErrorKind::BadRequest,
            AuthError::RegistrationFailed(_)
            | AuthError::LoginFailed(_)
            | AuthError::RateLimit(_)
            | AuthError::PasswordHash(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Seconds until a throttled caller may retry
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            AuthError::RegistrationThrottled { retry_after }
            | AuthError::LoginThrottled { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::RateLimit(e) => {
                tracing::error!(error = %e, "Auth rate limiter error");
            }
            AuthError::PasswordHash(e) => {
                tracing::error!(error = %e, "Auth password hashing error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::RegistrationThrottled { .. } | AuthError::LoginThrottled { .. } => {
                tracing::warn!(error = %self, "Auth attempt throttled");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            // Already logged with request context where they were raised
            AuthError::RegistrationFailed(source) | AuthError::LoginFailed(source) => {
                tracing::debug!(error = %source, "Auth workflow failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();

        if let Some(retry_after) = self.retry_after() {
            let mut response =
                (status, Json(StatusMessage::failure(self.to_string()))).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs(retry_after)));
            return response;
        }

        match self {
            AuthError::Validation(errors) => AppError::validation(errors).into_response(),
            AuthError::Unauthenticated => AppError::unauthorized("Unauthenticated.").into_response(),
            AuthError::MalformedRequest(rejection) => AppError::from(rejection).into_response(),
            AuthError::InvalidCredentials
            | AuthError::RegistrationFailed(_)
            | AuthError::LoginFailed(_) => {
                (status, Json(StatusMessage::failure(self.to_string()))).into_response()
            }
            // Never leak internals
            _ => AppError::internal("Server Error").into_response(),
        }
    }
}

/// Whole seconds, rounded up, never below 1
fn retry_after_secs(remaining: Duration) -> u64 {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    secs.max(1)
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<FieldErrors> for AuthError {
    fn from(errors: FieldErrors) -> Self {
        AuthError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(Duration::from_millis(1)), 1);
        assert_eq!(retry_after_secs(Duration::from_millis(59_001)), 60);
        assert_eq!(retry_after_secs(Duration::from_secs(3600)), 3600);
        assert_eq!(retry_after_secs(Duration::ZERO), 1);
    }

    #[test]
    fn test_only_throttling_carries_retry_after() {
        let throttled = AuthError::LoginThrottled {
            retry_after: Duration::from_millis(41_500),
        };
        assert_eq!(throttled.retry_after(), Some(Duration::from_millis(41_500)));

        let response = throttled.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");

        assert!(AuthError::InvalidCredentials.retry_after().is_none());
        let response = AuthError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }
}
