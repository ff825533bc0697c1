//! `bakta-import` command line
//!
//! The run fails before importing anything (exit status 1) when the database
//! cannot be reached or no file matches. Once files are being imported, a
//! failing file only shows up in the summary and the exit status stays 0.

use bakta_common::db::{
    self, DbConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DB_HOST, DEFAULT_DB_NAME, DEFAULT_DB_PORT,
    DEFAULT_DB_USER,
};
use clap::Parser;
use sqlx::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::driver::{find_input_files, import_files};
use crate::error::{IngestError, Result};
use crate::files::{FilePattern, DEFAULT_PATTERN};
use crate::models::ImportSummary;
use crate::storage::{AnnotationStore, PgAnnotationStore, DEFAULT_BATCH_SIZE};

#[derive(Parser, Debug, Clone)]
#[command(name = "bakta-import")]
#[command(author, version, about = "Import Bakta annotation TSV files into a PostgreSQL database")]
pub struct ImportArgs {
    /// Folder containing Bakta TSV files
    #[arg(long)]
    pub folder: PathBuf,

    /// File pattern to match TSV files
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// PostgreSQL database name
    #[arg(long, env = "PGDATABASE", default_value = DEFAULT_DB_NAME)]
    pub db_name: String,

    /// PostgreSQL username
    #[arg(long, env = "PGUSER", default_value = DEFAULT_DB_USER)]
    pub db_user: String,

    /// PostgreSQL password
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// PostgreSQL host
    #[arg(long, env = "PGHOST", default_value = DEFAULT_DB_HOST)]
    pub db_host: String,

    /// PostgreSQL port
    #[arg(long, env = "PGPORT", default_value_t = DEFAULT_DB_PORT)]
    pub db_port: u16,

    /// Seconds to wait for the database connection
    #[arg(long, env = "PGCONNECT_TIMEOUT", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout: u64,

    /// Apply the schema migrations before importing
    #[arg(long)]
    pub migrate: bool,

    /// Annotation rows per INSERT statement
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, hide = true)]
    pub batch_size: usize,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl ImportArgs {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            name: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            host: self.db_host.clone(),
            port: self.db_port,
            url: None,
            connect_timeout: Duration::from_secs(self.connect_timeout),
        }
    }
}

/// Connect, discover and import everything `args` describes
pub async fn run_import(args: &ImportArgs) -> Result<ImportSummary> {
    let pattern = FilePattern::new(&args.pattern)?;

    let conn = db::connect(&args.db_config()).await.map_err(IngestError::Connect)?;
    let mut store = PgAnnotationStore::new(conn).with_batch_size(args.batch_size);

    if args.migrate {
        store.run_migrations().await?;
    }

    let summary = import_folder(&mut store, &args.folder, &pattern).await;

    // Errors on close do not change the outcome
    let _ = store.into_connection().close().await;

    summary
}

/// Import every matching file in `folder` into `store`
pub async fn import_folder<S: AnnotationStore + ?Sized>(
    store: &mut S,
    folder: &Path,
    pattern: &FilePattern,
) -> Result<ImportSummary> {
    let files = find_input_files(folder, pattern)?;
    println!("Found {} TSV files to import", files.len());

    let summary = import_files(store, &files).await;
    for failure in &summary.failures {
        eprintln!("  Error processing {}: {}", failure.path.display(), failure.error);
    }

    Ok(summary)
}

/// Process exit status for a finished run
pub fn exit_code(result: &Result<ImportSummary>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
