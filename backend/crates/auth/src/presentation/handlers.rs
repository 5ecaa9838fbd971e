//! HTTP Handlers

use std::sync::Arc;

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use platform::rate_limit::RateLimiter;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginUseCase, RegisterUseCase, validate_login, validate_registration,
};
use crate::domain::repository::{PersonalAccessTokenRepository, UserRepository};
use crate::error::AuthResult;
use crate::infra::{Argon2PasswordHasher, PersonalAccessTokenIssuer};
use crate::presentation::dto::{AuthResponse, UserResource};
use crate::presentation::dto::{LoginRequest, RegisterRequest};
use crate::presentation::extract::{ClientIp, LenientJson};
use crate::presentation::middleware::AuthenticatedUser;

/// Shared state for auth handlers
pub struct AuthAppState<R, L>
where
    R: UserRepository + PersonalAccessTokenRepository + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub limiter: Arc<L>,
    pub hasher: Arc<Argon2PasswordHasher>,
    pub issuer: Arc<PersonalAccessTokenIssuer<R>>,
    pub config: Arc<AuthConfig>,
}

impl<R, L> AuthAppState<R, L>
where
    R: UserRepository + PersonalAccessTokenRepository + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    /// Wire the hasher and token issuer from the config
    pub fn new(repo: R, limiter: L, config: AuthConfig) -> AuthResult<Self> {
        let repo = Arc::new(repo);
        let hasher = Argon2PasswordHasher::new(config.hash_params, config.password_pepper.clone())?;
        let issuer = PersonalAccessTokenIssuer::new(
            Arc::clone(&repo),
            config.token_name.clone(),
            config.token_ttl,
        );

        Ok(Self {
            repo,
            limiter: Arc::new(limiter),
            hasher: Arc::new(hasher),
            issuer: Arc::new(issuer),
            config: Arc::new(config),
        })
    }
}

// Manual impl: a derive would require `R: Clone` and `L: Clone`.
impl<R, L> Clone for AuthAppState<R, L>
where
    R: UserRepository + PersonalAccessTokenRepository + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            limiter: Arc::clone(&self.limiter),
            hasher: Arc::clone(&self.hasher),
            issuer: Arc::clone(&self.issuer),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R, L> FromRef<AuthAppState<R, L>> for Arc<AuthConfig>
where
    R: UserRepository + PersonalAccessTokenRepository + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    fn from_ref(state: &AuthAppState<R, L>) -> Self {
        Arc::clone(&state.config)
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<R, L>(
    State(state): State<AuthAppState<R, L>>,
    ClientIp(client_ip): ClientIp,
    LenientJson(req): LenientJson<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)>
where
    R: UserRepository + PersonalAccessTokenRepository + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    let form = validate_registration(req, state.repo.as_ref()).await?;

    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.limiter.clone(),
        state.hasher.clone(),
        state.issuer.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(form, &client_ip).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::success(
            "Registration completed successfully.",
            &output.user,
            output.token.into_string(),
        )),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /login
pub async fn login<R, L>(
    State(state): State<AuthAppState<R, L>>,
    ClientIp(client_ip): ClientIp,
    LenientJson(req): LenientJson<LoginRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    R: UserRepository + PersonalAccessTokenRepository + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    let form = validate_login(req)?;

    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.limiter.clone(),
        state.hasher.clone(),
        state.issuer.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(form, &client_ip).await?;

    Ok(Json(AuthResponse::success(
        "Login successful.",
        &output.user,
        output.token.into_string(),
    )))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /user (behind `require_bearer_token`)
pub async fn current_user(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Json<UserResource> {
    Json(UserResource::from(&user))
}
