//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use platform::rate_limit::RateLimiter;

use crate::domain::repository::{PersonalAccessTokenRepository, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_bearer_token;

/// Create the Auth router for any repository and limiter implementation
///
/// - `POST /register`
/// - `POST /login`
/// - `GET /user` (bearer token)
pub fn auth_router<R, L>(state: AuthAppState<R, L>) -> Router
where
    R: UserRepository + PersonalAccessTokenRepository + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    Router::new()
        .route("/user", get(handlers::current_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer_token::<R, L>,
        ))
        .route("/register", post(handlers::register::<R, L>))
        .route("/login", post(handlers::login::<R, L>))
        .with_state(state)
}
