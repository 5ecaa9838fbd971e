//! Request Validation
//!
//! Turns raw request bodies into typed forms, or an ordered set of field
//! errors. Runs before any use case, so a rejected request never touches
//! the rate limiter.
//!
//! Strings are trimmed and an empty result counts as missing. Password
//! fields are taken verbatim.

use kernel::validation::{FieldErrors, messages};

use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::{EMAIL_MAX_LENGTH, Email},
    user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{LoginRequest, RegisterRequest};

/// Maximum name length in characters
pub const NAME_MAX_LENGTH: usize = 255;

/// Minimum password length in characters
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Validated registration input
#[derive(Debug)]
pub struct RegistrationForm {
    pub name: String,
    pub email: Email,
    pub password: RawPassword,
}

/// Validated login input
#[derive(Debug)]
pub struct LoginForm {
    pub email: Email,
    pub password: RawPassword,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn present_secret(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Email rules shared by both endpoints: required, format, length
fn check_email(raw: Option<String>, errors: &mut FieldErrors) -> Option<Email> {
    let Some(raw) = present(raw) else {
        errors.add("email", messages::required("email"));
        return None;
    };

    let normalized = Email::normalize(&raw);
    let well_formed = Email::is_valid_format(&normalized);
    let within_limit = normalized.chars().count() <= EMAIL_MAX_LENGTH;

    if !well_formed {
        errors.add("email", messages::email("email"));
    }
    if !within_limit {
        errors.add("email", messages::max_chars("email", EMAIL_MAX_LENGTH));
    }

    Email::new(normalized).ok()
}

/// Validate a registration body
///
/// Rules in order: `name` required, max 255; `email` required, valid,
/// max 255, unique; `password` required, min 8, confirmed.
pub async fn validate_registration<U>(
    request: RegisterRequest,
    users: &U,
) -> AuthResult<RegistrationForm>
where
    U: UserRepository,
{
    let mut errors = FieldErrors::new();

    let name = match present(request.name) {
        None => {
            errors.add("name", messages::required("name"));
            None
        }
        Some(name) if name.chars().count() > NAME_MAX_LENGTH => {
            errors.add("name", messages::max_chars("name", NAME_MAX_LENGTH));
            None
        }
        Some(name) => Some(name),
    };

    let email = check_email(request.email, &mut errors);
    if let Some(email) = &email {
        let taken = users
            .exists_by_email(email)
            .await
            .map_err(|e| AuthError::RegistrationFailed(Box::new(e)))?;
        if taken {
            errors.add("email", messages::unique("email"));
        }
    }

    let password = match present_secret(request.password) {
        None => {
            errors.add("password", messages::required("password"));
            None
        }
        Some(password) => {
            if password.chars().count() < PASSWORD_MIN_LENGTH {
                errors.add(
                    "password",
                    messages::min_chars("password", PASSWORD_MIN_LENGTH),
                );
            }
            if request.password_confirmation.as_deref() != Some(password.as_str()) {
                errors.add("password", messages::confirmed("password"));
            }
            Some(password)
        }
    };

    match (name, email, password) {
        (Some(name), Some(email), Some(password)) if errors.is_empty() => Ok(RegistrationForm {
            name,
            email,
            password: RawPassword::new(password),
        }),
        _ => Err(AuthError::Validation(errors)),
    }
}

/// Validate a login body: `email` required and valid, `password` required
pub fn validate_login(request: LoginRequest) -> AuthResult<LoginForm> {
    let mut errors = FieldErrors::new();

    let email = check_email(request.email, &mut errors);

    let password = present_secret(request.password);
    if password.is_none() {
        errors.add("password", messages::required("password"));
    }

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(LoginForm {
            email,
            password: RawPassword::new(password),
        }),
        _ => Err(AuthError::Validation(errors)),
    }
}
