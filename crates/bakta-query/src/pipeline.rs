//! Question → SQL → result → answer
//!
//! Three steps run in order over a shared [`State`]:
//!
//! 1. `write_query`: the model writes SQL for the question
//! 2. `execute_query`: the SQL runs against the database
//! 3. `generate_answer`: the model answers from the question, SQL and result
//!
//! Each step reports what it changed as a [`StepUpdate`].

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::error::{QueryError, Result};
use crate::llm::ChatModel;
use crate::prompt;
use crate::sql::SqlDatabase;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub question: String,
    pub query: String,
    pub result: String,
    pub answer: String,
}

/// What one step wrote into the state
///
/// Displays as `{"<step>":{"<field>":"<value>"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepUpdate {
    WriteQuery { query: String },
    ExecuteQuery { result: String },
    GenerateAnswer { answer: String },
}

impl StepUpdate {
    pub fn step_name(&self) -> &'static str {
        match self {
            StepUpdate::WriteQuery { .. } => "write_query",
            StepUpdate::ExecuteQuery { .. } => "execute_query",
            StepUpdate::GenerateAnswer { .. } => "generate_answer",
        }
    }

    fn apply(&self, state: &mut State) {
        match self {
            StepUpdate::WriteQuery { query } => state.query = query.clone(),
            StepUpdate::ExecuteQuery { result } => state.result = result.clone(),
            StepUpdate::GenerateAnswer { answer } => state.answer = answer.clone(),
        }
    }
}

impl fmt::Display for StepUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

#[derive(Deserialize)]
struct QueryOutput {
    query: String,
}

pub struct QueryPipeline<M, D> {
    model: M,
    db: D,
    top_k: usize,
}

impl<M: ChatModel, D: SqlDatabase> QueryPipeline<M, D> {
    pub fn new(model: M, db: D, top_k: usize) -> Self {
        Self { model, db, top_k }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_database(self) -> D {
        self.db
    }

    /// Run all three steps, calling `on_update` after each one
    pub async fn run<F>(&mut self, question: &str, mut on_update: F) -> Result<State>
    where
        F: FnMut(&StepUpdate),
    {
        let mut state = State {
            question: question.to_string(),
            ..State::default()
        };

        let update = StepUpdate::WriteQuery {
            query: self.write_query(&state.question).await?,
        };
        update.apply(&mut state);
        on_update(&update);

        let update = StepUpdate::ExecuteQuery {
            result: self.execute_query(&state.query).await,
        };
        update.apply(&mut state);
        on_update(&update);

        let update = StepUpdate::GenerateAnswer {
            answer: self.generate_answer(&state).await?,
        };
        update.apply(&mut state);
        on_update(&update);

        Ok(state)
    }

    /// Ask the model for SQL answering `question`
    pub async fn write_query(&mut self, question: &str) -> Result<String> {
        let table_info = self.db.table_info().await?;
        let messages = prompt::query_messages(self.db.dialect(), self.top_k, &table_info, question);

        let raw = self
            .model
            .complete(&messages, Some(&prompt::query_output_format()))
            .await?;
        let output: QueryOutput = serde_json::from_str(&raw)?;

        let query = output.query.trim().to_string();
        if query.is_empty() {
            return Err(QueryError::invalid_response("model returned an empty query"));
        }

        info!(query = %query, "Generated SQL");
        Ok(query)
    }

    /// Run the query; failures come back as `Error: ...` text for the model
    pub async fn execute_query(&mut self, query: &str) -> String {
        match self.db.run(query).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Query failed");
                format!("Error: {}", e)
            },
        }
    }

    /// Ask the model to answer from the query result
    pub async fn generate_answer(&self, state: &State) -> Result<String> {
        let messages = prompt::answer_messages(&state.question, &state.query, &state.result);
        self.model.complete(&messages, None).await
    }
}
