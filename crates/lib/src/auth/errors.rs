//! Authentication error types.

use thiserror::Error as ThisError;

use crate::Error;

/// Errors that can occur during authentication and user provisioning.
#[non_exhaustive]
#[derive(Debug, ThisError)]
pub enum AuthError {
    /// A user with this name already exists.
    #[error("Username already exists: {username}")]
    UsernameAlreadyExists {
        /// The rejected username
        username: String,
    },

    /// The username is not acceptable.
    #[error("Invalid username: {reason}")]
    InvalidUsername {
        /// Why the username was rejected
        reason: &'static str,
    },

    /// Hashing a new password failed.
    #[error("Password hashing failed: {reason}")]
    PasswordHashingFailed {
        /// Description of the hashing failure
        reason: String,
    },

    /// A stored password hash could not be parsed.
    #[error("Stored password hash is malformed: {reason}")]
    MalformedPasswordHash {
        /// Description of the parse failure
        reason: String,
    },
}

impl AuthError {
    /// Check if this error indicates the user already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AuthError::UsernameAlreadyExists { .. })
    }

    /// Check if this error was caused by invalid input.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, AuthError::InvalidUsername { .. })
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
