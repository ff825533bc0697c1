//! Execute a SQL script file against the annotation database
//!
//! Used for schema setup and maintenance scripts. The whole script runs in
//! one transaction, so a failing statement leaves the database unchanged.

use bakta_common::db::{connect, DbConfig};
use sqlx::{Connection, PgConnection};
use std::path::Path;
use tracing::{error, info};

use crate::error::{IngestError, Result};

/// What a script run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlRunReport {
    pub rows_affected: u64,
}

/// Read `sql_file` and run it against the database at `connection_string`
pub async fn run_sql_file(connection_string: &str, sql_file: &Path) -> Result<SqlRunReport> {
    if !sql_file.exists() {
        return Err(IngestError::SqlFileNotFound(sql_file.to_path_buf()));
    }

    let script = tokio::fs::read_to_string(sql_file)
        .await
        .map_err(|e| IngestError::read(sql_file, e))?;

    info!("Connecting to database...");
    let mut conn = connect(&DbConfig::from_url(connection_string)).await?;

    info!(file = %sql_file.display(), "Executing SQL from file");
    let report = run_script(&mut conn, &script).await;

    // Errors on close are not interesting once the script has run
    let _ = conn.close().await;

    report
}

/// Run a (possibly multi-statement) script inside a transaction
pub async fn run_script(conn: &mut PgConnection, script: &str) -> Result<SqlRunReport> {
    let mut tx = conn.begin().await?;

    match sqlx::raw_sql(script).execute(&mut *tx).await {
        Ok(result) => {
            tx.commit().await?;
            info!(rows_affected = result.rows_affected(), "SQL script executed successfully");
            Ok(SqlRunReport {
                rows_affected: result.rows_affected(),
            })
        },
        Err(e) => {
            error!(error = %e, "SQL script failed, rolling back");
            tx.rollback().await?;
            Err(e.into())
        },
    }
}
