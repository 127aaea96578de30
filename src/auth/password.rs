//! Password hashing and verification using Argon2id

use crate::{config::AppConfig, error::AppError};
use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};

/// Plaintext behind the hash that unknown-account logins are checked against
const DUMMY_PASSWORD: &str = "board-api-dummy-password";

pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash with the live cost parameters, so a miss costs as much as a mismatch
    dummy_hash: String,
}

impl PasswordHasher {
    /// Hasher with explicit cost parameters (memory in KiB)
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, DUMMY_PASSWORD)?;

        Ok(Self { argon2, dummy_hash })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let security = &config.security;
        Self::new(
            security.password_hash_memory_kib,
            security.password_hash_iterations,
            security.password_hash_parallelism,
        )
    }

    /// Hash a password into a PHC string
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash_with(&self.argon2, password)
    }

    /// Whether `password` matches the stored PHC hash; an unparsable hash never matches
    pub fn matches(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!("Stored password hash is unreadable: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Burn one verification for a login whose account does not exist
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.matches(password, &self.dummy_hash);
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!("Failed to hash password: {:?}", e);
            AppError::Internal(format!("Failed to hash password: {}", e))
        })?
        .to_string();

    Ok(password_hash)
}
