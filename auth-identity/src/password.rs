//! Argon2id password hashing.
//!
//! Hashing and verification are CPU-bound and run on the blocking pool.

use crate::config::PasswordConfig;
use crate::error::{IdentityError, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

#[derive(Clone)]
pub struct PasswordManager {
    argon2: Argon2<'static>,
    min_length: usize,
}

impl PasswordManager {
    pub fn new(config: &PasswordConfig) -> Result<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(32),
        )
        .map_err(|e| IdentityError::HashingError(format!("invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            min_length: config.min_length,
        })
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let argon2 = self.argon2.clone();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| IdentityError::HashingError(e.to_string()))
        })
        .await
        .map_err(|e| IdentityError::HashingError(format!("hashing task failed: {}", e)))?
    }

    /// `Ok(false)` for a wrong password; `Err` only for malformed hashes
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        let argon2 = self.argon2.clone();

        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)
                .map_err(|e| IdentityError::HashingError(format!("stored hash unreadable: {}", e)))?;

            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(IdentityError::HashingError(e.to_string())),
            }
        })
        .await
        .map_err(|e| IdentityError::HashingError(format!("verification task failed: {}", e)))?
    }
}
