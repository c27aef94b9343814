//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`), which carry their
//! own salt and parameters.

use std::sync::OnceLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::SaltString,
};
use rand::RngCore;

use crate::error::TodoError;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, TodoError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| TodoError::Hash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TodoError::Hash(e.to_string()))
}

/// Check `password` against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only an unparseable hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, TodoError> {
    #[cfg(test)]
    VERIFY_CALLS.with(|calls| calls.set(calls.get() + 1));

    let parsed = PasswordHash::new(hash).map_err(|e| TodoError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Run a full verification against a throwaway hash and discard the result.
///
/// Login paths that have no stored hash call this so they cost the same as a
/// wrong password.
pub fn verify_against_dummy(password: &str) -> Result<(), TodoError> {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();

    let hash = match DUMMY_HASH.get() {
        Some(hash) => hash,
        None => {
            let hash = hash_password("dummy password for absent accounts")?;
            DUMMY_HASH.get_or_init(|| hash)
        }
    };
    verify_password(password, hash)?;
    Ok(())
}

#[cfg(test)]
thread_local! {
    pub(crate) static VERIFY_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}
