//! End-to-end pipeline tests against a mocked chat-completions API

use async_trait::async_trait;
use bakta_query::{LlmConfig, OpenAiClient, QueryError, QueryPipeline, SqlDatabase, StepUpdate};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TABLE_INFO: &str = "CREATE TABLE genomes (\n\tid bigint NOT NULL,\n\tsample_id text NOT NULL\n)";

/// Database fake that records the SQL it was asked to run
struct FakeDatabase {
    result: Result<String, String>,
    executed: Vec<String>,
}

impl FakeDatabase {
    fn returning(result: &str) -> Self {
        Self {
            result: Ok(result.to_string()),
            executed: Vec::new(),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            executed: Vec::new(),
        }
    }
}

#[async_trait]
impl SqlDatabase for FakeDatabase {
    fn dialect(&self) -> &str {
        "PostgreSQL"
    }

    async fn table_info(&mut self) -> bakta_query::Result<String> {
        Ok(TABLE_INFO.to_string())
    }

    async fn run(&mut self, sql: &str) -> bakta_query::Result<String> {
        self.executed.push(sql.to_string());
        self.result.clone().map_err(QueryError::unsafe_sql)
    }
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

fn client_for(server: &MockServer) -> OpenAiClient {
    let config = LlmConfig::new("sk-test").with_base_url(format!("{}/v1", server.uri()));
    OpenAiClient::new(&config).unwrap()
}

async fn mock_query_step(server: &MockServer, sql: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4.1",
            "response_format": {"type": "json_schema"}
        })))
        .and(body_string_contains("at most 10 results"))
        .and(body_string_contains("Question: How many genomes are there?"))
        .respond_with(completion(&json!({ "query": sql }).to_string()))
        .with_priority(1)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pipeline_runs_all_steps() {
    let server = MockServer::start().await;
    mock_query_step(&server, "SELECT COUNT(*) FROM genomes").await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("SQL Query: SELECT COUNT(*) FROM genomes"))
        .and(body_string_contains("SQL Result: [(3,)]"))
        .respond_with(completion("There are 3 genomes in the database."))
        .expect(1)
        .mount(&server)
        .await;

    let mut pipeline = QueryPipeline::new(client_for(&server), FakeDatabase::returning("[(3,)]"), 10);

    let mut updates = Vec::new();
    let state = pipeline
        .run("How many genomes are there?", |update| updates.push(update.clone()))
        .await
        .unwrap();

    assert_eq!(state.question, "How many genomes are there?");
    assert_eq!(state.query, "SELECT COUNT(*) FROM genomes");
    assert_eq!(state.result, "[(3,)]");
    assert_eq!(state.answer, "There are 3 genomes in the database.");

    let steps: Vec<_> = updates.iter().map(StepUpdate::step_name).collect();
    assert_eq!(steps, vec!["write_query", "execute_query", "generate_answer"]);

    let db = pipeline.into_database();
    assert_eq!(db.executed, vec!["SELECT COUNT(*) FROM genomes"]);
}

#[tokio::test]
async fn test_query_error_is_passed_to_answer_step() {
    let server = MockServer::start().await;
    mock_query_step(&server, "SELECT COUNT(*) FROM genomes").await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("SQL Result: Error: "))
        .respond_with(completion("The query failed, so the count is unknown."))
        .expect(1)
        .mount(&server)
        .await;

    let mut pipeline = QueryPipeline::new(
        client_for(&server),
        FakeDatabase::failing("relation \"genomes\" does not exist"),
        10,
    );

    let state = pipeline.run("How many genomes are there?", |_| {}).await.unwrap();

    assert!(state.result.starts_with("Error: "));
    assert!(state.result.contains("does not exist"));
    assert_eq!(state.answer, "The query failed, so the count is unknown.");
}

#[tokio::test]
async fn test_api_error_stops_pipeline() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let mut pipeline = QueryPipeline::new(client_for(&server), FakeDatabase::returning("[]"), 10);

    let mut updates = 0;
    let err = pipeline
        .run("How many genomes are there?", |_| updates += 1)
        .await
        .unwrap_err();

    match err {
        QueryError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        },
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(updates, 0);
    assert!(pipeline.into_database().executed.is_empty());
}

#[tokio::test]
async fn test_non_json_query_output_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion("SELECT COUNT(*) FROM genomes"))
        .mount(&server)
        .await;

    let mut pipeline = QueryPipeline::new(client_for(&server), FakeDatabase::returning("[]"), 10);
    let err = pipeline.write_query("How many genomes are there?").await.unwrap_err();

    assert!(matches!(err, QueryError::Json(_)));
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(r#"{"query": "   "}"#))
        .mount(&server)
        .await;

    let mut pipeline = QueryPipeline::new(client_for(&server), FakeDatabase::returning("[]"), 10);
    let err = pipeline.write_query("anything").await.unwrap_err();

    assert!(matches!(err, QueryError::InvalidResponse(_)));
}
