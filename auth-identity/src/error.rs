use crate::models::Role;
use credential_registry::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// Per-field validation messages, serialized as `{"field": ["message", ..]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(IdentityError::Validation(self))
        }
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Deliberately identical for unknown email and wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is suspended. Contact support to restore access")]
    AccountSuspended,

    #[error("Account pending verification. Upload your verification document and wait for admin approval")]
    AccountPendingVerification,

    #[error("Account not found")]
    NotFound,

    #[error("Email already registered")]
    EmailAlreadyInUse,

    #[error("External identity already linked to an account")]
    ExternalUidAlreadyLinked,

    #[error("{message}")]
    VerificationFailed { role: Role, message: String },

    #[error("Credential verification is temporarily unavailable")]
    VerificationUnavailable(#[source] RegistryError),

    #[error("External UID does not match the authenticated principal")]
    UidMismatch,

    #[error("{0}")]
    Forbidden(String),

    #[error("Profile does not match account {account_id} with role {role}")]
    ProfileMismatch { account_id: Uuid, role: Role },

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Session is invalid or has expired")]
    InvalidSession,

    #[error("Identity store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl IdentityError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        IdentityError::Validation(FieldErrors::single(field, message))
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;
