//! Password hashing for user records

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use tracing::{error, info};

use crate::error::PasswordError;
use crate::models::User;
use crate::validation::validate_password;

/// Hash a plaintext password with a fresh random salt
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Hash the password of a record about to be stored, if it changed
///
/// Calling this again without a new [`User::set_password`] leaves the
/// stored hash untouched. A plaintext that breaks the password rule is
/// rejected before it is hashed.
pub fn before_save(user: &mut User) -> Result<(), PasswordError> {
    if !user.password_modified {
        return Ok(());
    }

    validate_password(&user.password)?;

    info!("Hashing updated password for user: {}", user.username);
    user.password = hash_password(&user.password)?;
    user.password_modified = false;
    Ok(())
}

/// Check a plaintext password against the stored hash
pub fn is_password_correct(user: &User, plaintext: &str) -> bool {
    let parsed_hash = match PasswordHash::new(&user.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to parse password hash for user {}: {}", user.id, e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed_hash)
        .is_ok()
}
