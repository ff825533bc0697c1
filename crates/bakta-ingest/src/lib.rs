//! Bakta Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads Bakta genome-annotation TSV files into PostgreSQL.
//!
//! Each file becomes one `genomes` row (run metadata from the `#` header) plus
//! one `annotations` row per feature line, written in a single transaction.
//!
//! # Example
//!
//! ```no_run
//! use bakta_common::db::{connect, DbConfig};
//! use bakta_ingest::driver::{find_input_files, import_files};
//! use bakta_ingest::files::FilePattern;
//! use bakta_ingest::storage::PgAnnotationStore;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let conn = connect(&DbConfig::default()).await?;
//!     let mut store = PgAnnotationStore::new(conn);
//!
//!     let files = find_input_files(Path::new("./bakta"), &FilePattern::new("*.tsv")?)?;
//!     let summary = import_files(&mut store, &files).await;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod driver;
pub mod error;
pub mod files;
pub mod header;
pub mod models;
pub mod parser;
pub mod sql_runner;
pub mod storage;

pub use error::{IngestError, Result};
pub use models::{Annotation, GenomeMetadata, ImportSummary, ParsedFile};
pub use storage::{AnnotationStore, PgAnnotationStore};
