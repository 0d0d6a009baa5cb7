use credential_registry::DomainAllowList;
use serde::{Deserialize, Serialize};

use crate::error::{IdentityError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub access_secret: String,
    /// Must differ from `access_secret`
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub issuer: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_secret: "dev-access-secret-change-me".to_string(),
            refresh_secret: "dev-refresh-secret-change-me".to_string(),
            access_ttl_secs: 900,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
            issuer: "medgate".to_string(),
        }
    }
}

impl TokenConfig {
    pub fn validate(&self) -> Result<()> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(IdentityError::TokenError("token secrets must not be empty".to_string()));
        }
        if self.access_secret == self.refresh_secret {
            return Err(IdentityError::TokenError(
                "access and refresh tokens must use distinct secrets".to_string(),
            ));
        }
        if self.access_ttl_secs <= 0 || self.refresh_ttl_secs <= 0 {
            return Err(IdentityError::TokenError("token lifetimes must be positive".to_string()));
        }
        Ok(())
    }
}

/// Password policy and Argon2id cost parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub min_length: usize,
    /// Memory cost in KiB
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 6,
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordConfig {
    /// Cheap parameters for tests
    pub fn fast() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// Check doctor and staff claims against the credential registry
    #[default]
    Registry,
    /// Only check the email domain against per-role allow-lists
    Domain,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub mode: VerificationMode,
    pub allowed_domains: DomainAllowList,
}
