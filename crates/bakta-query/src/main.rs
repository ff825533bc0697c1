//! bakta-ask - natural-language questions over the annotation database

use bakta_common::db::{self, DbConfig};
use bakta_common::logging::{init_logging, LogConfig, LogLevel};
use bakta_query::{Cli, LlmConfig, OpenAiClient, PgSqlDatabase, QueryPipeline, StepUpdate};
use clap::Parser;
use colored::Colorize;
use sqlx::Connection;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Keep the console for step output unless asked for more
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("bakta-ask")
        .filter_directives("sqlx=warn,hyper=warn,reqwest=warn")
        .build();
    let log_config = log_config.clone().with_env_overrides().unwrap_or(log_config);
    let _ = init_logging(&log_config);

    if let Err(e) = run(&cli).await {
        error!(error = %e, "Query failed");
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = LlmConfig::from_env()?;
    if let Some(ref model) = cli.model {
        config = config.with_model(model);
    }
    if let Some(top_k) = cli.top_k {
        config = config.with_top_k(top_k.max(1));
    }

    let db_config = match cli.database_url {
        Some(ref url) => DbConfig::from_url(url),
        None => DbConfig::default(),
    };
    let conn = db::connect(&db_config).await?;

    let mut pipeline = QueryPipeline::new(OpenAiClient::new(&config)?, PgSqlDatabase::new(conn), config.top_k);

    let json = cli.json;
    let result = pipeline
        .run(&cli.question_text(), |update| print_update(update, json))
        .await;

    let _ = pipeline.into_database().into_connection().close().await;

    result?;
    Ok(())
}

fn print_update(update: &StepUpdate, json: bool) {
    if json {
        println!("{}", update);
        return;
    }

    match update {
        StepUpdate::WriteQuery { query } => {
            println!("{}", "SQL query:".cyan().bold());
            println!("{}\n", query);
        },
        StepUpdate::ExecuteQuery { result } => {
            println!("{}", "Result:".cyan().bold());
            if result.starts_with("Error:") {
                println!("{}\n", result.yellow());
            } else {
                println!("{}\n", result);
            }
        },
        StepUpdate::GenerateAnswer { answer } => {
            println!("{}", "Answer:".green().bold());
            println!("{}", answer);
        },
    }
}
