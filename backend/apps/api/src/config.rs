//! Server configuration from environment variables

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::AuthConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Where rate limit counters live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStore {
    /// Per-process map; fine for a single instance
    Memory,
    /// `rate_limits` table, shared across instances
    Database,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `None` runs everything in memory
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub rate_limit_store: RateLimitStore,
    pub auth: AuthConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL");

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:31113")?;

        let frontend_origins: Vec<String> = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let rate_limit_store = match get("RATE_LIMIT_STORE").as_deref().map(str::trim) {
            None | Some("memory") => RateLimitStore::Memory,
            Some("database") => RateLimitStore::Database,
            Some(other) => bail!("RATE_LIMIT_STORE must be `memory` or `database`, got `{other}`"),
        };

        if rate_limit_store == RateLimitStore::Database && database_url.is_none() {
            bail!("RATE_LIMIT_STORE=database requires DATABASE_URL");
        }

        // Development trades hashing cost for speed and trusts proxy headers
        let base = match get("APP_ENV").as_deref().map(str::trim) {
            None | Some("production") => AuthConfig::default(),
            Some("development") => AuthConfig::development(),
            Some(other) => bail!("APP_ENV must be `development` or `production`, got `{other}`"),
        };

        let trust_proxy_headers = match get("TRUST_PROXY_HEADERS") {
            Some(v) => parse_bool(&v).context("TRUST_PROXY_HEADERS must be true or false")?,
            None => base.trust_proxy_headers,
        };

        let token_ttl = match get("TOKEN_TTL_MINUTES") {
            Some(v) => {
                let minutes: u64 = v
                    .trim()
                    .parse()
                    .context("TOKEN_TTL_MINUTES must be a whole number of minutes")?;
                Some(Duration::from_secs(minutes * 60))
            }
            None => None,
        };

        let auth = AuthConfig {
            password_pepper: get("PASSWORD_PEPPER").map(String::into_bytes),
            trust_proxy_headers,
            token_ttl,
            ..base
        };

        Ok(Self {
            database_url,
            database_max_connections,
            bind_addr,
            frontend_origins,
            rate_limit_store,
            auth,
        })
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: `{other}`"),
    }
}
