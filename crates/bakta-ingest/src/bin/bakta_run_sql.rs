//! bakta-run-sql - execute a SQL script file against PostgreSQL

use bakta_common::logging::{init_logging, LogConfig, LogLevel};
use bakta_ingest::sql_runner::run_sql_file;
use bakta_ingest::IngestError;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "bakta-run-sql")]
#[command(author, version, about = "Execute SQL commands from a file on a PostgreSQL database")]
struct Cli {
    /// PostgreSQL connection string, e.g. postgresql://postgres@localhost/bakta_annotations
    connection_string: String,

    /// Path to the SQL file to execute
    sql_file: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Usage errors exit with 1 like every other failure of this tool
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        },
    };

    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info })
        .log_file_prefix("bakta-run-sql")
        .filter_directives("sqlx=warn")
        .build();
    let log_config = log_config.clone().with_env_overrides().unwrap_or(log_config);
    let _ = init_logging(&log_config);

    match run_sql_file(&cli.connection_string, &cli.sql_file).await {
        Ok(report) => {
            println!(
                "SQL script executed successfully! ({} rows affected)",
                report.rows_affected
            );
        },
        Err(e) => {
            error!(error = %e, "SQL script run failed");
            match e {
                IngestError::SqlFileNotFound(path) => {
                    eprintln!("Error: SQL file '{}' not found.", path.display());
                },
                IngestError::Database(db_err) => eprintln!("Database error: {}", db_err),
                other => eprintln!("Error: {}", other),
            }
            process::exit(1);
        },
    }
}
