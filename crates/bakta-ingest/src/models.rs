// Data models for Bakta annotation TSV files

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Run metadata for one annotation file, stored as a `genomes` row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeMetadata {
    /// File name without its last extension
    pub sample_id: String,
    pub software_version: String,
    pub database_version: String,
    pub database_type: String,
    pub doi: String,
    pub url: String,
    pub file_path: String,
}

/// One feature line, stored as an `annotations` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub sequence_id: String,
    pub feature_type: String, // "cds", "tRNA", "rRNA", "ncRNA", ...
    pub start_position: i64,
    pub stop_position: i64,
    pub strand: String, // "+", "-" or "?"
    pub locus_tag: Option<String>,
    pub gene: Option<String>,
    pub product: Option<String>,
    pub dbxrefs: Vec<String>, // e.g. "COG:COG0001", "UniRef:UniRef90_P0A7B8"
}

impl Annotation {
    /// Value for the `dbxrefs` column; an empty list is stored as NULL
    pub fn dbxrefs_column(&self) -> Option<Vec<String>> {
        if self.dbxrefs.is_empty() {
            None
        } else {
            Some(self.dbxrefs.clone())
        }
    }
}

/// Result of parsing a single TSV file
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub metadata: GenomeMetadata,
    pub annotations: Vec<Annotation>,
    /// Data lines dropped for having fewer than the required columns
    pub skipped_rows: usize,
}

/// A file that made it into the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportedFile {
    pub genome_id: i64,
    pub annotations: usize,
    pub skipped_rows: usize,
}

/// A file that did not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Tally of a whole import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub annotations: usize,
    pub skipped_rows: usize,
    pub failures: Vec<FileFailure>,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Import completed. Successfully processed {} files. Failed: {} files.",
            self.succeeded, self.failed
        )
    }
}
