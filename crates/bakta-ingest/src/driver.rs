//! Import driver
//!
//! Runs each file through parse → store, one at a time. A failing file is
//! logged and counted; it never stops the run.

use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, Instrument};

use crate::error::{IngestError, Result};
use crate::files::{discover_files, FilePattern};
use crate::models::{FileFailure, ImportSummary, ImportedFile};
use crate::parser::parse_tsv_file;
use crate::storage::AnnotationStore;

/// Find the files to import, failing when there are none
pub fn find_input_files(folder: &Path, pattern: &FilePattern) -> Result<Vec<PathBuf>> {
    let files = discover_files(folder, pattern)?;

    if files.is_empty() {
        return Err(IngestError::NoFilesFound {
            folder: std::path::absolute(folder).unwrap_or_else(|_| folder.to_path_buf()),
            pattern: pattern.as_str().to_string(),
        });
    }

    info!(count = files.len(), "Found TSV files to import");
    Ok(files)
}

/// Parse and store one file
pub async fn import_file<S: AnnotationStore + ?Sized>(
    store: &mut S,
    path: &Path,
) -> Result<ImportedFile> {
    let parsed = parse_tsv_file(path)?;
    let genome_id = store
        .import_genome(&parsed.metadata, &parsed.annotations)
        .await?;

    info!(
        genome_id,
        sample_id = %parsed.metadata.sample_id,
        annotations = parsed.annotations.len(),
        skipped_rows = parsed.skipped_rows,
        "Imported {} annotations",
        parsed.annotations.len()
    );

    Ok(ImportedFile {
        genome_id,
        annotations: parsed.annotations.len(),
        skipped_rows: parsed.skipped_rows,
    })
}

/// Import every file in order and tally the outcome
pub async fn import_files<S: AnnotationStore + ?Sized>(
    store: &mut S,
    files: &[PathBuf],
) -> ImportSummary {
    let mut summary = ImportSummary::default();
    let total = files.len();

    for (idx, path) in files.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        info!("[{}/{}] Processing {}", idx + 1, total, name);

        let span = info_span!("import_file", file = %name);
        match import_file(store, path).instrument(span).await {
            Ok(imported) => {
                summary.succeeded += 1;
                summary.annotations += imported.annotations;
                summary.skipped_rows += imported.skipped_rows;
            },
            Err(e) => {
                error!(file = %path.display(), error = %e, "Error processing file");
                summary.failed += 1;
                summary.failures.push(FileFailure {
                    path: path.clone(),
                    error: e.to_string(),
                });
            },
        }
    }

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        annotations = summary.annotations,
        "Import run finished"
    );

    summary
}
