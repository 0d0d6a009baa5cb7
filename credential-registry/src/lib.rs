//! Credential registry and verification engine
//!
//! The registry holds pre-approved professional identities: doctors as
//! published by medical councils, and organizations with their employee
//! rosters and the email domains their staff use. It is seeded out of band
//! ([`seed`]) and read by the [`VerificationEngine`] when a doctor or staff
//! member signs up.
//!
//! # Example
//!
//! ```rust
//! use credential_registry::{InMemoryCredentialRegistry, RegistrySeed, VerificationEngine};
//! use std::sync::Arc;
//!
//! # async fn run() -> credential_registry::Result<()> {
//! let registry = Arc::new(InMemoryCredentialRegistry::new());
//! RegistrySeed::from_yaml_str("doctors: []")?.apply(registry.as_ref()).await?;
//!
//! let engine = VerificationEngine::new(registry);
//! let verified = engine
//!     .verify_doctor("MH12345", "Dr. John Smith", "Medical Council of India")
//!     .await?;
//! assert!(!verified);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod models;
pub mod repository;
pub mod seed;
pub mod verification;

pub use error::*;
pub use models::*;
pub use repository::*;
pub use seed::*;
pub use verification::*;
