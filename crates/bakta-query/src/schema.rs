//! Table descriptions handed to the model
//!
//! Each table is rendered as a `CREATE TABLE` statement followed by a few
//! sample rows in a comment block:
//!
//! ```text
//! CREATE TABLE genomes (
//!     id bigint NOT NULL DEFAULT nextval('genomes_id_seq'::regclass),
//!     sample_id text NOT NULL,
//!     ...
//! )
//!
//! /*
//! 3 rows from genomes table:
//! id  sample_id   ...
//! 1   GCF_000005845   ...
//! */
//! ```

use crate::sql::SqlValue;

/// Tables the model may query
pub const DEFAULT_TABLES: &[&str] = &["genomes", "annotations"];

/// Sample rows shown per table
pub const SAMPLE_ROWS: usize = 3;

/// Longest sample cell before truncation
const MAX_CELL_CHARS: usize = 100;

/// One column as reported by `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

/// Everything the model sees about one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescription {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub sample_rows: Vec<Vec<SqlValue>>,
}

impl TableDescription {
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let mut line = format!("\t{} {}", column.name, column.data_type);
                if !column.nullable {
                    line.push_str(" NOT NULL");
                }
                if let Some(ref default) = column.default {
                    line.push_str(" DEFAULT ");
                    line.push_str(default);
                }
                line
            })
            .collect();

        if !self.primary_key.is_empty() {
            lines.push(format!("\tPRIMARY KEY ({})", self.primary_key.join(", ")));
        }
        for fk in &self.foreign_keys {
            lines.push(format!(
                "\tFOREIGN KEY({}) REFERENCES {} ({})",
                fk.column, fk.foreign_table, fk.foreign_column
            ));
        }

        let mut out = format!("CREATE TABLE {} (\n{}\n)", self.name, lines.join(",\n"));

        out.push_str(&format!(
            "\n\n/*\n{} rows from {} table:\n",
            self.sample_rows.len(),
            self.name
        ));
        let header: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        out.push_str(&header.join("\t"));
        for row in &self.sample_rows {
            out.push('\n');
            let cells: Vec<String> = row.iter().map(sample_cell).collect();
            out.push_str(&cells.join("\t"));
        }
        out.push_str("\n*/");

        out
    }
}

/// Join several table descriptions into one prompt section
pub fn render_table_info(tables: &[TableDescription]) -> String {
    tables
        .iter()
        .map(TableDescription::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn sample_cell(value: &SqlValue) -> String {
    let text = value.plain();
    if text.chars().count() > MAX_CELL_CHARS {
        let truncated: String = text.chars().take(MAX_CELL_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str, nullable: bool) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable,
            default: None,
        }
    }

    #[test]
    fn test_render_table() {
        let table = TableDescription {
            name: "annotations".to_string(),
            columns: vec![
                ColumnInfo {
                    default: Some("nextval('annotations_id_seq'::regclass)".to_string()),
                    ..column("id", "bigint", false)
                },
                column("genome_id", "bigint", true),
                column("gene", "text", true),
                column("dbxrefs", "ARRAY", true),
            ],
            primary_key: vec!["id".to_string()],
            foreign_keys: vec![ForeignKey {
                column: "genome_id".to_string(),
                foreign_table: "genomes".to_string(),
                foreign_column: "id".to_string(),
            }],
            sample_rows: vec![vec![
                SqlValue::Int(1),
                SqlValue::Int(1),
                SqlValue::Null,
                SqlValue::Array(vec![SqlValue::Text("COG:COG0593".to_string())]),
            ]],
        };

        let expected = "CREATE TABLE annotations (\n\
            \tid bigint NOT NULL DEFAULT nextval('annotations_id_seq'::regclass),\n\
            \tgenome_id bigint,\n\
            \tgene text,\n\
            \tdbxrefs ARRAY,\n\
            \tPRIMARY KEY (id),\n\
            \tFOREIGN KEY(genome_id) REFERENCES genomes (id)\n\
            )\n\
            \n\
            /*\n\
            1 rows from annotations table:\n\
            id\tgenome_id\tgene\tdbxrefs\n\
            1\t1\tNone\t['COG:COG0593']\n\
            */";

        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_long_cells_are_truncated() {
        let long = "x".repeat(150);
        let cell = sample_cell(&SqlValue::Text(long));
        assert_eq!(cell.len(), MAX_CELL_CHARS + 3);
        assert!(cell.ends_with("..."));
    }

    #[test]
    fn test_tables_joined_by_blank_line() {
        let table = |name: &str| TableDescription {
            name: name.to_string(),
            columns: vec![column("id", "bigint", false)],
            primary_key: vec![],
            foreign_keys: vec![],
            sample_rows: vec![],
        };

        let info = render_table_info(&[table("genomes"), table("annotations")]);
        assert!(info.starts_with("CREATE TABLE genomes (\n\tid bigint NOT NULL\n)"));
        assert!(info.contains("*/\n\nCREATE TABLE annotations"));
        assert!(info.contains("0 rows from annotations table:"));
    }
}
