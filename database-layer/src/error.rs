use thiserror::Error;

/// Postgres SQLSTATE for `unique_violation`
pub const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// True when the error is a unique-constraint violation.
///
/// Repositories use this to turn a lost insert race into a domain conflict.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    violated_constraint(error).is_some()
}

/// Name of the unique constraint that rejected the write, if any
pub fn violated_constraint(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(db_error) if db_error.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Some(db_error.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}
