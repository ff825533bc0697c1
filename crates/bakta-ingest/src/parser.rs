// Bakta TSV parser
//
// Splits a file into `#` comment lines (run metadata) and tab-separated feature
// lines. Feature columns:
//
//   1 Sequence Id | 2 Type | 3 Start | 4 Stop | 5 Strand | 6 Locus Tag
//   7 Gene | 8 Product | 9 DbXrefs (optional, ", "-separated)

use crate::error::{IngestError, Result};
use crate::header::parse_metadata;
use crate::models::{Annotation, ParsedFile};
use std::path::Path;
use tracing::{debug, warn};

/// Feature lines with fewer columns than this are dropped
pub const MIN_FIELDS: usize = 8;

/// Separator between cross-references in the DbXrefs column
pub const DBXREF_SEPARATOR: &str = ", ";

/// Read and parse one TSV file
pub fn parse_tsv_file(path: &Path) -> Result<ParsedFile> {
    let content = std::fs::read_to_string(path).map_err(|e| IngestError::read(path, e))?;
    parse_tsv_str(&content, path)
}

/// Parse TSV content that was read from `path`
///
/// `path` only feeds `sample_id`, `file_path` and error messages.
pub fn parse_tsv_str(content: &str, path: &Path) -> Result<ParsedFile> {
    let (header_lines, data_lines): (Vec<(usize, &str)>, Vec<(usize, &str)>) = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .partition(|(_, line)| line.starts_with('#'));

    let mut metadata = parse_metadata(header_lines.iter().map(|(_, line)| *line));
    metadata.sample_id = sample_id_for(path);
    metadata.file_path = path.display().to_string();

    let mut annotations = Vec::with_capacity(data_lines.len());
    let mut skipped_rows = 0;

    for (line_no, line) in data_lines {
        if line.trim().is_empty() {
            continue;
        }

        match parse_annotation_line(line, line_no, path)? {
            Some(annotation) => annotations.push(annotation),
            None => skipped_rows += 1,
        }
    }

    if skipped_rows > 0 {
        warn!(
            file = %path.display(),
            skipped_rows,
            "Dropped feature lines with fewer than {} columns",
            MIN_FIELDS
        );
    }

    Ok(ParsedFile {
        metadata,
        annotations,
        skipped_rows,
    })
}

/// Parse a single feature line
///
/// Surrounding whitespace (tabs included) is removed before the line is
/// split, so empty trailing columns do not count towards [`MIN_FIELDS`].
///
/// Returns `Ok(None)` for lines with too few columns and an error when a
/// position column is not an integer.
pub fn parse_annotation_line(line: &str, line_no: usize, path: &Path) -> Result<Option<Annotation>> {
    let fields: Vec<&str> = line.trim().split('\t').collect();

    if fields.len() < MIN_FIELDS {
        debug!(
            file = %path.display(),
            line = line_no,
            fields = fields.len(),
            "Skipping short feature line"
        );
        return Ok(None);
    }

    let start_position = parse_position(fields[2], "start position", line_no, path)?;
    let stop_position = parse_position(fields[3], "stop position", line_no, path)?;

    let dbxrefs = match fields.get(8) {
        Some(raw) if !raw.is_empty() => raw.split(DBXREF_SEPARATOR).map(str::to_string).collect(),
        _ => Vec::new(),
    };

    Ok(Some(Annotation {
        sequence_id: fields[0].to_string(),
        feature_type: fields[1].to_string(),
        start_position,
        stop_position,
        strand: fields[4].to_string(),
        locus_tag: non_empty(fields[5]),
        gene: non_empty(fields[6]),
        product: non_empty(fields[7]),
        dbxrefs,
    }))
}

fn parse_position(value: &str, column: &'static str, line_no: usize, path: &Path) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|source| IngestError::InvalidPosition {
            path: path.to_path_buf(),
            line: line_no,
            column,
            value: value.to_string(),
            source,
        })
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// File name without its last extension
fn sample_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
