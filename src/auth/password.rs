use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use crate::config::AuthConfig;
use crate::errors::AuthError;

fn hasher(cfg: &AuthConfig) -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(
        cfg.hash_memory_kib,
        cfg.hash_iterations,
        cfg.hash_parallelism,
        None,
    )
    .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext password into a PHC string with a per-call random
/// salt and the configured work factor.
pub fn hash_password(cfg: &AuthConfig, plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(cfg)?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Checks a plaintext against a stored digest. A mismatch is `Ok(false)`,
/// never an error; only a digest that fails to parse errors. Cost
/// parameters live inside the digest, so old hashes keep verifying after a
/// config change.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AuthError::MalformedDigest(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
