//! Operator authentication.
//!
//! Operators are provisioned out-of-band (see `canhoto user add`). The web
//! surface only ever calls [`AuthService::authenticate`].

pub mod crypto;
pub mod errors;

pub use errors::AuthError;

use crate::store::{self, SqlxStore, StoreError};
use crate::{Error, Result};

/// Longest username accepted when provisioning.
pub const MAX_USERNAME_LEN: usize = 64;

/// Verifies credentials against the `users` table.
#[derive(Debug, Clone)]
pub struct AuthService {
    store: SqlxStore,
}

impl AuthService {
    pub fn new(store: SqlxStore) -> Self {
        Self { store }
    }

    /// Check a username/password pair.
    ///
    /// Returns `Ok(false)` for an unknown user or a wrong password; both are
    /// reported the same way. Store failures are returned as errors.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let Some(password_hash) = store::users::password_hash(&self.store, username).await? else {
            tracing::warn!(username, "Login rejected: unknown user");
            return Ok(false);
        };

        let verified = crypto::verify_password(password, &password_hash).inspect_err(|e| {
            tracing::error!(username, "Cannot verify login: {e}");
        })?;

        if verified {
            tracing::info!(username, "Login accepted");
        } else {
            tracing::warn!(username, "Login rejected: wrong password");
        }
        Ok(verified)
    }

    /// Provision a new operator.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<()> {
        validate_username(username)?;
        let password_hash = crypto::hash_password(password)?;

        match store::users::insert(&self.store, username, &password_hash).await {
            Ok(()) => {
                tracing::info!(username, "Created user");
                Ok(())
            }
            Err(Error::Store(StoreError::UniqueViolation { .. })) => {
                Err(AuthError::UsernameAlreadyExists {
                    username: username.to_string(),
                }
                .into())
            }
            Err(e) => Err(e),
        }
    }

    /// All provisioned usernames.
    pub async fn list_users(&self) -> Result<Vec<String>> {
        store::users::list_usernames(&self.store).await
    }

    /// Number of provisioned users.
    pub async fn user_count(&self) -> Result<u64> {
        let count = store::users::count(&self.store).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn validate_username(username: &str) -> std::result::Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::InvalidUsername {
            reason: "username is empty",
        });
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(AuthError::InvalidUsername {
            reason: "username is too long",
        });
    }
    if username.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AuthError::InvalidUsername {
            reason: "username must not contain whitespace",
        });
    }
    Ok(())
}
