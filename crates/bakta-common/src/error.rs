//! Error types shared by the Bakta tools

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, BaktaError>;

/// Errors raised by the shared database and configuration helpers
#[derive(Error, Debug)]
pub enum BaktaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}. Check DATABASE_URL and the connection flags.")]
    Config(String),

    #[error("Timed out after {timeout:?} connecting to {target}")]
    ConnectTimeout {
        target: String,
        timeout: std::time::Duration,
    },
}

impl BaktaError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
