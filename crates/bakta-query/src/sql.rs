//! Running model-written SQL
//!
//! Only a single `SELECT` (or `EXPLAIN` of one) is accepted, and it runs
//! inside a read-only transaction. Results are rendered as a list of tuples,
//! the format the answer prompt expects:
//!
//! ```text
//! [('GCF_000005845', 4321), ('GCF_000006945', 4710)]
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use sqlx::postgres::PgRow;
use sqlx::types::BigDecimal;
use sqlx::{Column, Connection, PgConnection, Row, TypeInfo};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{QueryError, Result};
use crate::schema::{self, ColumnInfo, ForeignKey, TableDescription};

/// A database the pipeline can describe and query
#[async_trait]
pub trait SqlDatabase: Send {
    /// SQL dialect name used in the prompt
    fn dialect(&self) -> &str;

    /// Schema and sample rows of the queryable tables
    async fn table_info(&mut self) -> Result<String>;

    /// Run a read-only query and render its rows
    async fn run(&mut self, sql: &str) -> Result<String>;
}

// ============================================================================
// Validation
// ============================================================================

/// Accept exactly one read-only statement
pub fn validate_read_only(sql: &str) -> Result<()> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| QueryError::unsafe_sql(format!("invalid SQL syntax: {}", e)))?;

    match statements.as_slice() {
        [] => Err(QueryError::unsafe_sql("empty SQL query")),
        [statement] => check_statement(statement),
        _ => Err(QueryError::unsafe_sql(format!(
            "expected a single statement, got {}",
            statements.len()
        ))),
    }
}

fn check_statement(statement: &Statement) -> Result<()> {
    match statement {
        Statement::Query(_) => Ok(()),
        Statement::Explain { statement, .. } => check_statement(statement),
        other => {
            let keyword = other
                .to_string()
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_uppercase();
            Err(QueryError::unsafe_sql(format!(
                "only SELECT queries are allowed, got {}",
                keyword
            )))
        },
    }
}

// ============================================================================
// Values
// ============================================================================

/// A decoded result cell
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Exact numerics and other values rendered verbatim
    Number(String),
    Text(String),
    Array(Vec<SqlValue>),
}

impl SqlValue {
    /// Rendering without quotes around top-level text, for sample rows
    pub fn plain(&self) -> String {
        match self {
            SqlValue::Text(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "None"),
            SqlValue::Bool(true) => write!(f, "True"),
            SqlValue::Bool(false) => write!(f, "False"),
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Float(x) => write!(f, "{:?}", x),
            SqlValue::Number(n) => write!(f, "{}", n),
            SqlValue::Text(text) => write!(f, "{}", quote(text)),
            SqlValue::Array(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            },
        }
    }
}

/// Single-quote a string, switching to double quotes when that avoids escaping
fn quote(text: &str) -> String {
    if text.contains('\'') && !text.contains('"') {
        return format!("\"{}\"", text.replace('\\', "\\\\"));
    }
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Render result rows as a list of tuples
pub fn render_rows(rows: &[Vec<SqlValue>]) -> String {
    let rows: Vec<String> = rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            if cells.len() == 1 {
                format!("({},)", cells[0])
            } else {
                format!("({})", cells.join(", "))
            }
        })
        .collect();
    format!("[{}]", rows.join(", "))
}

fn decode_row(row: &PgRow) -> Vec<SqlValue> {
    (0..row.columns().len()).map(|idx| decode_value(row, idx)).collect()
}

fn decode_value(row: &PgRow, idx: usize) -> SqlValue {
    type Decoded = std::result::Result<SqlValue, sqlx::Error>;

    fn opt<T>(value: std::result::Result<Option<T>, sqlx::Error>, f: impl FnOnce(T) -> SqlValue) -> Decoded {
        value.map(|v| v.map(f).unwrap_or(SqlValue::Null))
    }

    fn text_array(values: Vec<String>) -> SqlValue {
        SqlValue::Array(values.into_iter().map(SqlValue::Text).collect())
    }

    let type_name = row.column(idx).type_info().name().to_string();

    let decoded = match type_name.as_str() {
        "BOOL" => opt(row.try_get::<Option<bool>, _>(idx), SqlValue::Bool),
        "INT2" => opt(row.try_get::<Option<i16>, _>(idx), |v| SqlValue::Int(v.into())),
        "INT4" => opt(row.try_get::<Option<i32>, _>(idx), |v| SqlValue::Int(v.into())),
        "INT8" => opt(row.try_get::<Option<i64>, _>(idx), SqlValue::Int),
        "FLOAT4" => opt(row.try_get::<Option<f32>, _>(idx), |v| SqlValue::Float(v.into())),
        "FLOAT8" => opt(row.try_get::<Option<f64>, _>(idx), SqlValue::Float),
        "NUMERIC" => opt(row.try_get::<Option<BigDecimal>, _>(idx), |v| SqlValue::Number(v.to_string())),
        "TIMESTAMPTZ" => opt(row.try_get::<Option<DateTime<Utc>>, _>(idx), |v| SqlValue::Text(v.to_rfc3339())),
        "TIMESTAMP" => opt(row.try_get::<Option<NaiveDateTime>, _>(idx), |v| SqlValue::Text(v.to_string())),
        "DATE" => opt(row.try_get::<Option<NaiveDate>, _>(idx), |v| SqlValue::Text(v.to_string())),
        "JSON" | "JSONB" => opt(row.try_get::<Option<serde_json::Value>, _>(idx), |v| SqlValue::Text(v.to_string())),
        "TEXT[]" | "VARCHAR[]" | "NAME[]" => opt(row.try_get::<Option<Vec<String>>, _>(idx), text_array),
        "INT8[]" => opt(row.try_get::<Option<Vec<i64>>, _>(idx), |v| {
            SqlValue::Array(v.into_iter().map(SqlValue::Int).collect())
        }),
        "INT4[]" => opt(row.try_get::<Option<Vec<i32>>, _>(idx), |v| {
            SqlValue::Array(v.into_iter().map(|n| SqlValue::Int(n.into())).collect())
        }),
        _ => opt(row.try_get::<Option<String>, _>(idx), SqlValue::Text),
    };

    decoded.unwrap_or_else(|e| {
        debug!(column = idx, type_name = %type_name, error = %e, "Undecodable column");
        SqlValue::Number(format!("<{}>", type_name))
    })
}

// ============================================================================
// PostgreSQL
// ============================================================================

/// The annotation database over a single connection
pub struct PgSqlDatabase {
    conn: PgConnection,
    tables: Vec<String>,
    sample_rows: usize,
}

impl PgSqlDatabase {
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn,
            tables: schema::DEFAULT_TABLES.iter().map(|t| t.to_string()).collect(),
            sample_rows: schema::SAMPLE_ROWS,
        }
    }

    /// Limit which tables the model is told about
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn into_connection(self) -> PgConnection {
        self.conn
    }

    async fn describe_table(&mut self, table: &str) -> Result<Option<TableDescription>> {
        let columns: Vec<(String, String, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT column_name::text, data_type::text, is_nullable::text, column_default::text
            FROM information_schema.columns
            WHERE table_schema = current_schema() AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&mut self.conn)
        .await?;

        if columns.is_empty() {
            return Ok(None);
        }

        let columns: Vec<ColumnInfo> = columns
            .into_iter()
            .map(|(name, data_type, is_nullable, default)| ColumnInfo {
                name,
                data_type,
                nullable: is_nullable == "YES",
                default,
            })
            .collect();

        let primary_key: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT kcu.column_name::text
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = current_schema() AND tc.table_name = $1
            ORDER BY kcu.ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&mut self.conn)
        .await?;

        let foreign_keys: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT kcu.column_name::text, ccu.table_name::text, ccu.column_name::text
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema
            JOIN information_schema.constraint_column_usage ccu
              ON ccu.constraint_name = tc.constraint_name AND ccu.table_schema = tc.table_schema
            WHERE tc.constraint_type = 'FOREIGN KEY'
              AND tc.table_schema = current_schema() AND tc.table_name = $1
            "#,
        )
        .bind(table)
        .fetch_all(&mut self.conn)
        .await?;

        let sample_sql = format!(
            "SELECT * FROM \"{}\" LIMIT {}",
            table.replace('"', "\"\""),
            self.sample_rows
        );
        let sample_rows = sqlx::query(&sample_sql)
            .fetch_all(&mut self.conn)
            .await?
            .iter()
            .map(decode_row)
            .collect();

        Ok(Some(TableDescription {
            name: table.to_string(),
            columns,
            primary_key,
            foreign_keys: foreign_keys
                .into_iter()
                .map(|(column, foreign_table, foreign_column)| ForeignKey {
                    column,
                    foreign_table,
                    foreign_column,
                })
                .collect(),
            sample_rows,
        }))
    }
}

#[async_trait]
impl SqlDatabase for PgSqlDatabase {
    fn dialect(&self) -> &str {
        "PostgreSQL"
    }

    async fn table_info(&mut self) -> Result<String> {
        let mut described = Vec::with_capacity(self.tables.len());

        for table in self.tables.clone() {
            match self.describe_table(&table).await? {
                Some(description) => described.push(description),
                None => warn!(table = %table, "Table not found, leaving it out of the prompt"),
            }
        }

        if described.is_empty() {
            return Err(QueryError::config(
                "none of the annotation tables exist; import some Bakta files first",
            ));
        }

        Ok(schema::render_table_info(&described))
    }

    async fn run(&mut self, sql: &str) -> Result<String> {
        validate_read_only(sql)?;

        let mut tx = self.conn.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY").execute(&mut *tx).await?;

        let rows = sqlx::query(sql).fetch_all(&mut *tx).await;
        // Nothing to keep from a read-only transaction
        tx.rollback().await?;

        let rows: Vec<Vec<SqlValue>> = rows?.iter().map(decode_row).collect();
        debug!(rows = rows.len(), "Query returned");

        Ok(render_rows(&rows))
    }
}
