//! Credential checks and session user resolution.

use std::sync::Arc;

use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    application::repos::{RepoError, UsersRepo},
    cache::{CacheClient, CacheError, CacheKey},
    domain::entities::UserRecord,
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("no logged-in user for this request")]
    PermissionDenied,
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersRepo>,
    cache: CacheClient,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>, cache: CacheClient) -> Self {
        Self { users, cache }
    }

    /// Check credentials against the backing store.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            debug!(target = "storefront::auth", "unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let matches: bool = user
            .password
            .as_bytes()
            .ct_eq(password.as_bytes())
            .into();
        if !matches {
            debug!(target = "storefront::auth", user_id = user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Resolve the session user from the cached `user_{id}` snapshot.
    pub async fn current_user(
        &self,
        session_user_id: Option<i64>,
    ) -> Result<Option<UserRecord>, AuthError> {
        match session_user_id {
            Some(id) => Ok(self.cache.get(&CacheKey::User(id)).await?),
            None => Ok(None),
        }
    }

    pub async fn require_user(&self, session_user_id: Option<i64>) -> Result<UserRecord, AuthError> {
        self.current_user(session_user_id)
            .await?
            .ok_or(AuthError::PermissionDenied)
    }
}
