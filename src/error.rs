use thiserror::Error;

/// Main error type for Intrograph
#[derive(Error, Debug)]
pub enum IntrographError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding of stored payloads
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A schema migration could not be loaded or applied
    #[error("Migration error: {0}")]
    Migration(String),

    /// Entity not found
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Secondary (mirror) graph store errors
    #[error("Mirror store error: {0}")]
    Mirror(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A blocking store task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

/// Convenient Result type using IntrographError
pub type Result<T> = std::result::Result<T, IntrographError>;
