//! Bakta Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities for the Bakta annotation database tools.
//!
//! # Overview
//!
//! - **Error Handling**: [`BaktaError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber setup shared by every binary
//! - **Database**: PostgreSQL connection parameters and connect helpers
//!
//! # Example
//!
//! ```no_run
//! use bakta_common::db::{connect, DbConfig};
//!
//! #[tokio::main]
//! async fn main() -> bakta_common::Result<()> {
//!     let config = DbConfig::default().with_password("secret");
//!     let _conn = connect(&config).await?;
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{BaktaError, Result};
