//! Accounts, sessions and credential-gated signup for MedGate
//!
//! - [`AuthService`]: password signup, login, refresh/logout and the admin
//!   verification review
//! - [`IdentityBridge`]: links principals from an external identity provider
//!   to local accounts
//! - [`IdentityStore`]: persistence, with in-memory and PostgreSQL backends
//!
//! Doctor and staff signups pass through a [`CredentialGate`] that consults
//! the credential registry (or a domain allow-list) before anything is
//! written.
//!
//! # Example
//!
//! ```rust,no_run
//! use auth_identity::*;
//! use credential_registry::{InMemoryCredentialRegistry, VerificationEngine};
//! use std::sync::Arc;
//!
//! # async fn run() -> auth_identity::Result<()> {
//! let engine = VerificationEngine::new(Arc::new(InMemoryCredentialRegistry::new()));
//! let service = AuthService::new(
//!     Arc::new(InMemoryIdentityStore::new()),
//!     CredentialGate::new(engine, &VerificationConfig::default()),
//!     PasswordManager::new(&PasswordConfig::default())?,
//!     TokenService::new(TokenConfig::default())?,
//! );
//!
//! let session = service.login("jane@example.com", "secret123").await?;
//! let claims = service.authenticate(&session.access_token)?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod external;
pub mod gate;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod tokens;
pub mod validation;

pub use bridge::*;
pub use config::*;
pub use error::*;
pub use external::*;
pub use gate::*;
pub use models::*;
pub use password::*;
pub use repository::*;
pub use service::*;
pub use tokens::*;
