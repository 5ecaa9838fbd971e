//! Auth Middleware
//!
//! Middleware for requiring a bearer token on protected routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use platform::client::extract_bearer_token;
use platform::rate_limit::RateLimiter;

use crate::application::CurrentUserUseCase;
use crate::domain::entity::user::User;
use crate::domain::repository::{PersonalAccessTokenRepository, UserRepository};
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Owner of the presented token, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Middleware that requires `Authorization: Bearer <token>`
///
/// Rejects with 401 `{"message": "Unauthenticated."}`.
pub async fn require_bearer_token<R, L>(
    State(state): State<AuthAppState<R, L>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + PersonalAccessTokenRepository + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    let bearer = extract_bearer_token(req.headers()).map(str::to_owned);

    let use_case = CurrentUserUseCase::new(state.repo.clone(), state.issuer.clone());
    let user = use_case.execute(bearer.as_deref()).await?;

    req.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(req).await)
}
