//! Server configuration
//!
//! Values are layered: serde defaults, then an optional YAML/TOML file, then
//! `MEDGATE__SECTION__KEY` environment variables.

use auth_identity::{ExternalAuthConfig, PasswordConfig, TokenConfig, VerificationConfig};
use config::{Config, Environment, File};
use database_layer::DatabaseConfig;
use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "MEDGATE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseConfig,
    pub tokens: TokenConfig,
    pub password: PasswordConfig,
    pub verification: VerificationConfig,
    pub registry: RegistrySettings,
    pub uploads: UploadSettings,
    pub external: ExternalAuthConfig,
    pub logging: LoggerConfig,
    /// Administrator created at start-up when absent
    pub admin: Option<AdminBootstrap>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Seed file loaded into the in-memory registry at start-up
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub directory: PathBuf,
    pub max_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("uploads"),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub full_name: String,
}

fn default_admin_name() -> String {
    "MedGate Administrator".to_string()
}

impl AppConfig {
    /// Load configuration from `path` (if it exists) and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("verification.allowed_domains.doctor")
                    .with_list_parse_key("verification.allowed_domains.staff"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.tokens
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;

        if self.server.request_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "server.request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.uploads.max_bytes == 0 {
            return Err(config::ConfigError::Message(
                "uploads.max_bytes must be positive".to_string(),
            ));
        }
        if let Some(admin) = &self.admin {
            if admin.email.trim().is_empty() || admin.password.is_empty() {
                return Err(config::ConfigError::Message(
                    "admin.email and admin.password are required together".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// External bearer tokens are only accepted when a key is configured
    pub fn external_enabled(&self) -> bool {
        self.external.rs256_public_key_pem.is_some()
            || self
                .external
                .hs256_secret
                .as_deref()
                .is_some_and(|secret| !secret.is_empty())
    }
}
