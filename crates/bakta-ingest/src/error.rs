//! Error types for Bakta TSV ingestion

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A numeric column held something that is not an integer
    #[error("{path}:{line}: invalid {column} '{value}': {source}")]
    InvalidPosition {
        path: PathBuf,
        line: usize,
        column: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Common(#[from] bakta_common::BaktaError),

    /// The initial connection could not be established
    #[error("Error connecting to database: {0}")]
    Connect(#[source] bakta_common::BaktaError),

    #[error("No files found in {folder} matching pattern {pattern}")]
    NoFilesFound { folder: PathBuf, pattern: String },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to list '{path}': {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("SQL file '{0}' not found")]
    SqlFileNotFound(PathBuf),
}

impl IngestError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from the data itself rather than the database
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::InvalidPosition { .. })
    }
}
