//! Current User Use Case
//!
//! Resolves a bearer token to the user that owns it.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::service::TokenIssuer;
use crate::error::{AuthError, AuthResult};

/// Current user use case
pub struct CurrentUserUseCase<U, I>
where
    U: UserRepository,
    I: TokenIssuer,
{
    user_repo: Arc<U>,
    issuer: Arc<I>,
}

impl<U, I> CurrentUserUseCase<U, I>
where
    U: UserRepository,
    I: TokenIssuer,
{
    pub fn new(user_repo: Arc<U>, issuer: Arc<I>) -> Self {
        Self { user_repo, issuer }
    }

    pub async fn execute(&self, bearer: Option<&str>) -> AuthResult<User> {
        let bearer = bearer.ok_or(AuthError::Unauthenticated)?;

        let user_id = self
            .issuer
            .authenticate(bearer)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        // Token outlived its user
        self.user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)
    }
}
