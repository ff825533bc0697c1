//! Prompt templates

use serde_json::{json, Value};

use crate::llm::ChatMessage;

const QUERY_SYSTEM_TEMPLATE: &str = "\
Given an input question, create a syntactically correct {dialect} query to run to help find the answer. \
Unless the user specifies in their question a specific number of examples they wish to obtain, always limit \
your query to at most {top_k} results. You can order the results by a relevant column to return the most \
interesting examples in the database.

When the question can be related to COG IDs, query the related COG IDs against the dbxrefs column in the \
annotations table instead of querying the product column.

Never query for all the columns from a specific table, only ask for the few relevant columns given the question.

Pay attention to use only the column names that you can see in the schema description. Be careful to not \
query for columns that do not exist. Also, pay attention to which column is in which table.

Only use the following tables:
{table_info}
";

/// Messages asking the model to write SQL for `question`
pub fn query_messages(dialect: &str, top_k: usize, table_info: &str, question: &str) -> Vec<ChatMessage> {
    let system = QUERY_SYSTEM_TEMPLATE
        .replace("{dialect}", dialect)
        .replace("{top_k}", &top_k.to_string())
        .replace("{table_info}", table_info);

    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("Question: {}", question)),
    ]
}

/// Structured-output format for the query step: `{"query": "<sql>"}`
pub fn query_output_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "query_output",
            "description": "Generated SQL query.",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Syntactically valid SQL query."
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }
        }
    })
}

/// Message asking the model to answer from the query result
pub fn answer_messages(question: &str, query: &str, result: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "Given the following user question, corresponding SQL query, and SQL result, answer the user question.\n\n\
         Question: {}\n\
         SQL Query: {}\n\
         SQL Result: {}",
        question, query, result
    ))]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_query_messages_fill_placeholders() {
        let messages = query_messages("PostgreSQL", 7, "CREATE TABLE genomes (id bigint)", "How many genomes?");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        let system = &messages[0].content;
        assert!(system.contains("syntactically correct PostgreSQL query"));
        assert!(system.contains("at most 7 results"));
        assert!(system.contains("dbxrefs column"));
        assert!(system.ends_with("CREATE TABLE genomes (id bigint)\n"));
        assert!(!system.contains('{'));

        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Question: How many genomes?");
    }

    #[test]
    fn test_answer_message() {
        let messages = answer_messages("How many?", "SELECT COUNT(*) FROM genomes", "[(3,)]");
        assert_eq!(messages.len(), 1);
        assert!(messages[0]
            .content
            .ends_with("Question: How many?\nSQL Query: SELECT COUNT(*) FROM genomes\nSQL Result: [(3,)]"));
    }

    #[test]
    fn test_output_format_requires_query() {
        let format = query_output_format();
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["schema"]["required"][0], "query");
    }
}
