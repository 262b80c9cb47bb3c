use thiserror::Error;

/// Core error type for cirrus operations.
#[derive(Error, Debug)]
pub enum CirrusError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Model/schema mismatch:\n{0}")]
    SyncMismatch(String),
}

/// Result type alias using CirrusError.
pub type Result<T> = std::result::Result<T, CirrusError>;
