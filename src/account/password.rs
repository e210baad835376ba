/// Password hashing with Argon2id
///
/// Cost parameters come from configuration so they can be tuned without code
/// changes. Hashing and verification run on a blocking thread to keep the
/// async executor responsive; comparison inside the argon2 crate is
/// constant-time.
use crate::config::PasswordConfig;
use crate::error::{AuthError, AuthResult};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// Hash a password with a fresh random salt
pub async fn hash_password(password: &str, config: &PasswordConfig) -> AuthResult<String> {
    let password = password.to_string();
    let config = config.clone();

    tokio::task::spawn_blocking(move || {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AuthError::Internal(format!("Invalid Argon2 params: {}", e)))?;
        let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        argon
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    })
    .await
    .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
}

/// Verify a password against a stored PHC-format hash
///
/// Cost parameters are read from the hash itself, so previously-issued hashes
/// keep verifying after a cost change.
pub async fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();

    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| AuthError::Internal(format!("Stored password hash malformed: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))?
}
