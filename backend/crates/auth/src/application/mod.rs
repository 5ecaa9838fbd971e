//! Application Layer
//!
//! Use cases and request validation.

pub mod config;
pub mod current_user;
pub mod login;
pub mod register;
pub mod validation;

// Re-exports
pub use config::AuthConfig;
pub use current_user::CurrentUserUseCase;
pub use login::{LoginOutput, LoginUseCase};
pub use register::{RegisterOutput, RegisterUseCase};
pub use validation::{LoginForm, RegistrationForm, validate_login, validate_registration};
