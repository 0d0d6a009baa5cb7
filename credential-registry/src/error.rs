use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Credential registry unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid registry record: {0}")]
    InvalidRecord(String),

    #[error("Invalid seed file: {0}")]
    InvalidSeed(String),

    #[error("Storage error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Whether the failure came from the backing store rather than the input
    pub fn is_unavailable(&self) -> bool {
        matches!(self, RegistryError::Unavailable(_) | RegistryError::Database(_))
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
