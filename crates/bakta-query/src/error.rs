//! Error types for the question-answering tool
//!
//! Messages are user-facing: they say what went wrong and, where there is
//! one, what to change.

use bakta_common::BaktaError;
use thiserror::Error;

/// Result type alias for query operations
pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    /// The chat-completions endpoint answered with a non-success status
    #[error("OpenAI API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model answered, but not in the expected shape
    #[error("Unexpected model response: {0}")]
    InvalidResponse(String),

    /// Generated SQL that is not a single read-only statement
    #[error("Refusing to run SQL: {0}")]
    UnsafeSql(String),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your internet connection and OPENAI_BASE_URL.")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Interactive prompt failed or was cancelled
    #[error("Prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error(transparent)]
    Common(#[from] BaktaError),
}

impl QueryError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn unsafe_sql(msg: impl Into<String>) -> Self {
        Self::UnsafeSql(msg.into())
    }
}
