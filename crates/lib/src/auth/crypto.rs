//! Password hashing for operator credentials
//!
//! Argon2id with a fresh random salt per password. Hashes are stored as PHC
//! strings, which carry the algorithm parameters and the salt alongside the
//! digest.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};

use super::errors::AuthError;

/// Hash a password using Argon2id
///
/// # Returns
/// The Argon2 hash string (PHC format), including its salt
pub fn hash_password(password: impl AsRef<str>) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_ref().as_bytes(), &salt)
        .map_err(|e| AuthError::PasswordHashingFailed {
            reason: e.to_string(),
        })?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its stored hash
///
/// # Returns
/// `Ok(true)` if the password matches, `Ok(false)` if it does not, and an
/// error when the stored hash cannot be parsed.
pub fn verify_password(
    password: impl AsRef<str>,
    password_hash: impl AsRef<str>,
) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(password_hash.as_ref()).map_err(|e| AuthError::MalformedPasswordHash {
            reason: e.to_string(),
        })?;

    Ok(Argon2::default()
        .verify_password(password.as_ref().as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "correct";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains(password));

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("correct").unwrap();
        let second = hash_password("correct").unwrap();
        assert_ne!(first, second);

        assert!(verify_password("correct", &first).unwrap());
        assert!(verify_password("correct", &second).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        // A bare SHA-256 hex digest, as a legacy credential table would hold.
        let legacy = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        let err = verify_password("abc", legacy).unwrap_err();
        assert!(matches!(err, AuthError::MalformedPasswordHash { .. }));
    }
}
