// Storage layer for Bakta annotations
//
// One file = one transaction: the genome row and every annotation row commit
// together or not at all. Annotations go in as multi-row INSERTs of
// `DEFAULT_BATCH_SIZE` rows (10 binds per row, well under PostgreSQL's 65,535
// parameter limit).

use async_trait::async_trait;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder, Transaction};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::models::{Annotation, GenomeMetadata};

/// Rows per multi-row annotation INSERT
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Bind parameters per annotation row
const BINDS_PER_ROW: usize = 10;

/// Largest batch that stays within PostgreSQL's bind parameter limit
pub const MAX_BATCH_SIZE: usize = u16::MAX as usize / BINDS_PER_ROW;

/// Destination for parsed annotation files
///
/// Implementations must be atomic per call: on error nothing from that call
/// may persist.
#[async_trait]
pub trait AnnotationStore: Send {
    /// Store one genome and its annotations, returning the new genome id
    async fn import_genome(
        &mut self,
        metadata: &GenomeMetadata,
        annotations: &[Annotation],
    ) -> Result<i64>;
}

/// PostgreSQL-backed store over a single connection
pub struct PgAnnotationStore {
    conn: PgConnection,
    batch_size: usize,
}

impl PgAnnotationStore {
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the rows-per-INSERT batch size, clamped to `1..=MAX_BATCH_SIZE`
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = clamp_batch_size(batch_size);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Apply the `genomes` / `annotations` schema migrations
    pub async fn run_migrations(&mut self) -> Result<()> {
        info!("Running database migrations...");
        sqlx::migrate!("../../migrations").run(&mut self.conn).await?;
        info!("Migrations completed");
        Ok(())
    }

    /// Number of annotation rows stored for a genome
    pub async fn count_annotations(&mut self, genome_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM annotations WHERE genome_id = $1")
            .bind(genome_id)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(count)
    }

    /// Hand the connection back, e.g. to close it explicitly
    pub fn into_connection(self) -> PgConnection {
        self.conn
    }
}

#[async_trait]
impl AnnotationStore for PgAnnotationStore {
    async fn import_genome(
        &mut self,
        metadata: &GenomeMetadata,
        annotations: &[Annotation],
    ) -> Result<i64> {
        let batch_size = self.batch_size;
        let mut tx = self.conn.begin().await?;

        match write_genome(&mut tx, metadata, annotations, batch_size).await {
            Ok(genome_id) => {
                tx.commit().await?;
                debug!(genome_id, sample_id = %metadata.sample_id, "Committed genome");
                Ok(genome_id)
            },
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                error!(
                    error = %e,
                    file = %metadata.file_path,
                    "Error during database import, transaction rolled back"
                );
                Err(e)
            },
        }
    }
}

async fn write_genome(
    tx: &mut Transaction<'_, Postgres>,
    metadata: &GenomeMetadata,
    annotations: &[Annotation],
    batch_size: usize,
) -> Result<i64> {
    let genome_id = insert_genome(tx, metadata).await?;

    let total_batches = annotations.len().div_ceil(batch_size);
    for (batch_idx, batch) in annotations.chunks(batch_size).enumerate() {
        debug!(
            genome_id,
            batch = batch_idx + 1,
            total_batches,
            rows = batch.len(),
            "Inserting annotation batch"
        );
        insert_annotation_batch(tx, genome_id, batch).await?;
    }

    Ok(genome_id)
}

async fn insert_genome(
    tx: &mut Transaction<'_, Postgres>,
    metadata: &GenomeMetadata,
) -> Result<i64> {
    let genome_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO genomes (
            sample_id,
            software_version,
            database_version,
            database_type,
            doi,
            url,
            file_path
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&metadata.sample_id)
    .bind(&metadata.software_version)
    .bind(&metadata.database_version)
    .bind(&metadata.database_type)
    .bind(&metadata.doi)
    .bind(&metadata.url)
    .bind(&metadata.file_path)
    .fetch_one(&mut **tx)
    .await?;

    Ok(genome_id)
}

async fn insert_annotation_batch(
    tx: &mut Transaction<'_, Postgres>,
    genome_id: i64,
    batch: &[Annotation],
) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
        r#"
        INSERT INTO annotations (
            genome_id,
            sequence_id,
            feature_type,
            start_position,
            stop_position,
            strand,
            locus_tag,
            gene,
            product,
            dbxrefs
        )
        "#,
    );

    query_builder.push_values(batch, |mut b, annotation| {
        b.push_bind(genome_id)
            .push_bind(&annotation.sequence_id)
            .push_bind(&annotation.feature_type)
            .push_bind(annotation.start_position)
            .push_bind(annotation.stop_position)
            .push_bind(&annotation.strand)
            .push_bind(&annotation.locus_tag)
            .push_bind(&annotation.gene)
            .push_bind(&annotation.product)
            .push_bind(annotation.dbxrefs_column());
    });

    query_builder.build().execute(&mut **tx).await?;

    Ok(())
}

fn clamp_batch_size(batch_size: usize) -> usize {
    let clamped = batch_size.clamp(1, MAX_BATCH_SIZE);
    if clamped != batch_size {
        warn!(requested = batch_size, used = clamped, "Batch size out of range");
    }
    clamped
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_size_stays_within_bind_limit() {
        assert_eq!(MAX_BATCH_SIZE, 6553);
        assert!(MAX_BATCH_SIZE * BINDS_PER_ROW <= 65_535);

        assert_eq!(clamp_batch_size(0), 1);
        assert_eq!(clamp_batch_size(DEFAULT_BATCH_SIZE), DEFAULT_BATCH_SIZE);
        assert_eq!(clamp_batch_size(6553), 6553);
        assert_eq!(clamp_batch_size(6554), MAX_BATCH_SIZE);
        assert_eq!(clamp_batch_size(usize::MAX), MAX_BATCH_SIZE);
    }
}
