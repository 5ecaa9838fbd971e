//! Register Use Case
//!
//! Creates a user account under a per-IP registration budget and issues
//! the first access token.

use std::sync::Arc;

use platform::rate_limit::RateLimiter;

use crate::application::config::AuthConfig;
use crate::application::validation::RegistrationForm;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::service::{PasswordHasher, TokenIssuer};
use crate::domain::value_object::{email::Email, plain_text_token::PlainTextToken};
use crate::error::{AuthError, AuthResult};

/// Limiter key for a client IP
pub fn throttle_key(client_ip: &str) -> String {
    format!("registration:ip:{}", client_ip)
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub user: User,
    pub token: PlainTextToken,
}

/// Register use case
pub struct RegisterUseCase<U, L, H, I>
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

impl<U, L, H, I> RegisterUseCase<U, L, H, I>
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

    pub async fn execute(
        &self,
        form: RegistrationForm,
        client_ip: &str,
    ) -> AuthResult<RegisterOutput> {
        let RegistrationForm {
            name,
            email,
            password,
        } = form;
        let key = throttle_key(client_ip);
        let limit = self.config.registration_limit;

        let blocked = self
            .limiter
            .too_many_attempts(&key, limit.max_attempts)
            .await
            .map_err(|e| self.failed(&email, client_ip, e.into()))?;

        if blocked {
            let retry_after = self.limiter.available_in(&key).await.unwrap_or(limit.decay);
            tracing::warn!(client_ip = %client_ip, "Registration throttled");
            return Err(AuthError::RegistrationThrottled { retry_after });
        }

        let created = match self.hasher.hash(password).await {
            Ok(password) => {
                let user = User::new(name, email.clone(), password);
                self.user_repo.create(&user).await.map(|()| user)
            }
            Err(e) => Err(e),
        };

        // Every completed attempt counts against the IP, success or not
        if let Err(e) = self.limiter.hit(&key, limit.decay).await {
            tracing::warn!(client_ip = %client_ip, error = %e, "Failed to record registration attempt");
        }

        let user = created.map_err(|e| self.failed(&email, client_ip, e))?;

        let token = self
            .issuer
            .issue(&user.user_id)
            .await
            .map_err(|e| self.failed(&email, client_ip, e))?;

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            "User registered"
        );

        Ok(RegisterOutput { user, token })
    }

    fn failed(&self, email: &Email, client_ip: &str, source: AuthError) -> AuthError {
        tracing::error!(
            email = %email,
            client_ip = %client_ip,
            error = %source,
            "Registration failed"
        );
        AuthError::RegistrationFailed(Box::new(source))
    }
}
