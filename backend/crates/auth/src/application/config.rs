//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::password::HashParams;
use platform::rate_limit::RateLimitConfig;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Registration budget per client IP (5 per hour)
    pub registration_limit: RateLimitConfig,
    /// Login budget per normalized email (5 per minute)
    pub login_limit: RateLimitConfig,
    /// Name stamped on issued personal access tokens
    pub token_name: String,
    /// Token lifetime. `None` means tokens never expire.
    pub token_ttl: Option<Duration>,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Argon2id cost parameters
    pub hash_params: HashParams,
    /// Take the client IP from `X-Forwarded-For` instead of the peer address
    pub trust_proxy_headers: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            registration_limit: RateLimitConfig::new(5, 3600),
            login_limit: RateLimitConfig::new(5, 60),
            token_name: "auth_token".to_string(),
            token_ttl: None,
            password_pepper: None,
            hash_params: HashParams::default(),
            trust_proxy_headers: false,
        }
    }
}

impl AuthConfig {
    /// Create config for development (cheap hashing, proxy headers trusted)
    pub fn development() -> Self {
        Self {
            hash_params: HashParams {
                memory_kib: 4096,
                iterations: 1,
                parallelism: 1,
            },
            trust_proxy_headers: true,
            ..Default::default()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
