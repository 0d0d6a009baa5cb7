use thiserror::Error;

/// Process-level error for binaries and start-up plumbing
#[derive(Error, Debug)]
pub enum MedGateError {
    /// Network communication errors (bind, accept)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// HTTP server runtime errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Database connection or migration errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Credential registry seeding errors
    #[error("Registry error: {0}")]
    RegistryError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MedGateError {
    /// Stable error code for this error
    pub fn code(&self) -> &'static str {
        use crate::codes;
        match self {
            MedGateError::NetworkError(_) | MedGateError::ServerError(_) => {
                codes::system::SERVER_FAILURE
            }
            MedGateError::DatabaseError(_) => codes::dependency::STORE_UNAVAILABLE,
            MedGateError::ConfigError(_) => codes::system::CONFIGURATION,
            MedGateError::RegistryError(_) => codes::dependency::REGISTRY_UNAVAILABLE,
            MedGateError::InternalError(_) | MedGateError::Other(_) => codes::system::INTERNAL,
        }
    }
}

/// Result type alias for MedGate process-level operations
pub type Result<T> = std::result::Result<T, MedGateError>;

/// Log an error with its code before it is returned from `main`
pub fn log_error(context: &str, error: &MedGateError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error = %error,
        "MedGate error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_category() {
        assert_eq!(
            MedGateError::DatabaseError("down".into()).code(),
            crate::codes::dependency::STORE_UNAVAILABLE
        );
        assert_eq!(
            MedGateError::ConfigError("missing secret".into()).code(),
            crate::codes::system::CONFIGURATION
        );
        let wrapped: MedGateError = anyhow::anyhow!("boom").into();
        assert_eq!(wrapped.code(), crate::codes::system::INTERNAL);
    }
}
