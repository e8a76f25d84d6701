use crate::config::HashingConfig;
use crate::error::{AppError, Result};
use argon2::{
    Argon2, ParamsBuilder,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroize;

/// The salt size in bytes.
const SALT_SIZE: usize = 16;

fn argon2(config: &HashingConfig) -> Result<Argon2<'static>> {
    let params = ParamsBuilder::new()
        .m_cost(config.memory_kib)
        .t_cost(config.iterations)
        .p_cost(config.parallelism)
        .build()
        .map_err(|e| AppError::Hashing(format!("Argon2 params: {}", e)))?;

    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hashes a password using Argon2id with a fresh random salt.
///
/// # Returns
///
/// The PHC-formatted hash, which embeds the algorithm, parameters and salt.
pub fn hash_password(password: &str, config: &HashingConfig) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; SALT_SIZE];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .map_err(|e| AppError::Internal(format!("Failed to generate salt: {}", e)))?;

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Hashing(format!("Salt encoding error: {}", e)))?;

    let password_hash = argon2(config)?
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Hashing(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

/// Verifies a password against a PHC hash.
///
/// Parameters are read from the hash itself, so hashes made with older cost
/// settings keep verifying.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Hashing(format!("Hash parse error: {}", e)))?;
    let result = Argon2::default()
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    tracing::debug!("Password verification completed");
    Ok(result)
}

/// Builds the hash verified for unknown usernames, using the same cost
/// parameters as real password hashes.
pub fn dummy_hash(config: &HashingConfig) -> Result<String> {
    hash_password("dummy-password-for-timing", config)
}

/// Burns one verification against `dummy_hash`. The outcome is discarded.
pub fn verify_dummy(dummy_hash: &str, password: &str) {
    let _ = verify_password(password, dummy_hash);
}
