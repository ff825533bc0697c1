//! bakta-import - load Bakta annotation TSV files into PostgreSQL

use bakta_common::logging::{init_logging, LogConfig, LogLevel};
use bakta_ingest::cli::{exit_code, run_import, ImportArgs};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = ImportArgs::parse();

    let log_level = if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("bakta-import")
        .filter_directives("sqlx=warn")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().with_env_overrides().unwrap_or(log_config);

    // The importer works without logging, so a failed init is not fatal
    let _ = init_logging(&log_config);

    let result = run_import(&args).await;
    match result {
        Ok(ref summary) => println!("{}", summary),
        Err(ref e) => {
            error!(error = %e, "Import failed");
            eprintln!("Error: {}", e);
        },
    }

    process::exit(exit_code(&result));
}
