//! Login Use Case
//!
//! Verifies credentials under a per-email attempt budget and issues an
//! access token.

use std::sync::Arc;

use platform::rate_limit::RateLimiter;

use crate::application::config::AuthConfig;
use crate::application::validation::LoginForm;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::service::{PasswordHasher, TokenIssuer};
use crate::domain::value_object::{email::Email, plain_text_token::PlainTextToken};
use crate::error::{AuthError, AuthResult};

/// Limiter key for a normalized email
pub fn throttle_key(email: &Email) -> String {
    format!("login:{}", email)
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub token: PlainTextToken,
}

/// Login use case
pub struct LoginUseCase<U, L, H, I>
where
    U: UserRepository,
    L: RateLimiter,
    H: PasswordHasher,
    I: TokenIssuer,
{
    user_repo: Arc<U>,
    limiter: Arc<L>,
    hasher: Arc<H>,
    issuer: Arc<I>,
    config: Arc<AuthConfig>,
}

impl<U, L, H, I> LoginUseCase<U, L, H, I>
where
    U: UserRepository,
    L: RateLimiter,
    H: PasswordHasher,
    I: TokenIssuer,
{
    pub fn new(
        user_repo: Arc<U>,
        limiter: Arc<L>,
        hasher: Arc<H>,
        issuer: Arc<I>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            limiter,
            hasher,
            issuer,
            config,
        }
    }

    pub async fn execute(&self, form: LoginForm, client_ip: &str) -> AuthResult<LoginOutput> {
        let LoginForm { email, password } = form;
        let key = throttle_key(&email);
        let limit = self.config.login_limit;

        let blocked = self
            .limiter
            .too_many_attempts(&key, limit.max_attempts)
            .await
            .map_err(|e| self.failed(&email, client_ip, e.into()))?;

        if blocked {
            let retry_after = self.limiter.available_in(&key).await.unwrap_or(limit.decay);
            tracing::warn!(email = %email, client_ip = %client_ip, "Login throttled");
            return Err(AuthError::LoginThrottled { retry_after });
        }

        let user = self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(|e| self.failed(&email, client_ip, e))?;

        let matched = match user {
            Some(user) => {
                let valid = self
                    .hasher
                    .verify(password, user.password.clone())
                    .await
                    .map_err(|e| self.failed(&email, client_ip, e))?;
                valid.then_some(user)
            }
            None => {
                // Same work as a real verification
                self.hasher
                    .verify_dummy(password)
                    .await
                    .map_err(|e| self.failed(&email, client_ip, e))?;
                None
            }
        };

        let Some(user) = matched else {
            if let Err(e) = self.limiter.hit(&key, limit.decay).await {
                tracing::warn!(email = %email, error = %e, "Failed to record login attempt");
            }
            tracing::info!(email = %email, client_ip = %client_ip, "Invalid login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        if let Err(e) = self.limiter.clear(&key).await {
            tracing::warn!(email = %email, error = %e, "Failed to clear login attempts");
        }

        let token = self
            .issuer
            .issue(&user.user_id)
            .await
            .map_err(|e| self.failed(&email, client_ip, e))?;

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            "User logged in"
        );

        Ok(LoginOutput { user, token })
    }

    fn failed(&self, email: &Email, client_ip: &str, source: AuthError) -> AuthError {
        tracing::error!(
            email = %email,
            client_ip = %client_ip,
            error = %source,
            "Login failed"
        );
        AuthError::LoginFailed(Box::new(source))
    }
}
