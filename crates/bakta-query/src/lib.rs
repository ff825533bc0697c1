//! Bakta Query Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Answers natural-language questions about imported Bakta annotations: a
//! chat model writes PostgreSQL for the question, the query runs read-only
//! against the `genomes` / `annotations` tables, and the model answers from
//! the result.
//!
//! # Example
//!
//! ```no_run
//! use bakta_common::db::{connect, DbConfig};
//! use bakta_query::{LlmConfig, OpenAiClient, PgSqlDatabase, QueryPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = LlmConfig::from_env()?;
//!     let db = PgSqlDatabase::new(connect(&DbConfig::from_env()?).await?);
//!
//!     let mut pipeline = QueryPipeline::new(OpenAiClient::new(&config)?, db, config.top_k);
//!     let state = pipeline
//!         .run("Which genomes carry COG0593?", |update| println!("{}", update))
//!         .await?;
//!     println!("{}", state.answer);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod schema;
pub mod sql;

pub use config::LlmConfig;
pub use error::{QueryError, Result};
pub use llm::{ChatMessage, ChatModel, OpenAiClient, Role};
pub use pipeline::{QueryPipeline, State, StepUpdate};
pub use sql::{PgSqlDatabase, SqlDatabase};

use clap::Parser;

/// bakta-ask - ask questions about imported Bakta annotations
#[derive(Parser, Debug)]
#[command(name = "bakta-ask")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The question, e.g. "How many tRNA genes does each genome have?"
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,

    /// PostgreSQL connection string (defaults to the local bakta_annotations database)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Chat model to use (overrides OPENAI_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Row limit suggested to the model (overrides BAKTA_TOP_K)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Print each step update as a JSON line
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The question words joined by spaces
    pub fn question_text(&self) -> String {
        self.question.join(" ")
    }
}
