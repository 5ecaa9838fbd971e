//! Argon2id password hasher
//!
//! Runs `platform::password::Argon2Hasher` on tokio's blocking pool so a
//! hash never stalls the async workers.

use std::sync::Arc;

use platform::password::{Argon2Hasher, HashParams};

use crate::domain::service::PasswordHasher;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    inner: Arc<Argon2Hasher>,
}

impl Argon2PasswordHasher {
    pub fn new(params: HashParams, pepper: Option<Vec<u8>>) -> AuthResult<Self> {
        Ok(Self {
            inner: Arc::new(Argon2Hasher::new(params, pepper)?),
        })
    }

    async fn blocking<T, F>(&self, f: F) -> AuthResult<T>
    where
        F: FnOnce(&Argon2Hasher) -> T + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&inner))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: RawPassword) -> AuthResult<UserPassword> {
        let hashed = self
            .blocking(move |hasher| hasher.hash(password.inner()))
            .await??;

        Ok(UserPassword::from(hashed))
    }

    async fn verify(&self, password: RawPassword, hashed: UserPassword) -> AuthResult<bool> {
        self.blocking(move |hasher| hasher.verify(password.inner(), hashed.inner()))
            .await
    }

    async fn verify_dummy(&self, password: RawPassword) -> AuthResult<()> {
        self.blocking(move |hasher| hasher.verify_decoy(password.inner()))
            .await
    }
}
