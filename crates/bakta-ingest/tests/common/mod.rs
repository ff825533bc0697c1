//! Shared helpers for bakta-ingest integration tests
//!
//! - `TestPostgres`: PostgreSQL testcontainer with the schema migrations
//!   applied (requires Docker)
//! - `MemoryStore`: in-process `AnnotationStore` for driver tests
//! - fixture writers for Bakta TSV files

#![allow(dead_code)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use bakta_common::db::{connect, DbConfig};
use bakta_ingest::{Annotation, AnnotationStore, GenomeMetadata, IngestError, PgAnnotationStore};
use sqlx::PgConnection;
use std::path::{Path, PathBuf};
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tracing::info;

pub const HEADER: &str = "\
# Annotated with Bakta
# Software: v1.9.4
# Database: v5.1, full
# DOI: 10.1099/mgen.0.000685
# URL: github.com/oschwengers/bakta
#Sequence Id\tType\tStart\tStop\tStrand\tLocus Tag\tGene\tProduct\tDbXrefs
";

/// Initialize tracing for tests (safe to call more than once)
pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bakta_ingest=debug,sqlx=warn")),
        )
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Fixtures
// ============================================================================

/// A feature line with `n` baked into ids and positions
pub fn feature_line(n: usize) -> String {
    format!(
        "contig_1\tcds\t{}\t{}\t+\tLT_{:05}\tgene{}\tproduct {}\tCOG:COG{:04}, UniRef:UniRef90_{}\n",
        n * 1000 + 1,
        n * 1000 + 900,
        n,
        n,
        n,
        n % 10_000,
        n
    )
}

/// Bakta TSV content with the standard header and `features` feature lines
pub fn tsv_content(features: usize) -> String {
    let mut content = HEADER.to_string();
    for n in 0..features {
        content.push_str(&feature_line(n));
    }
    content
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    pub genomes: Vec<(i64, GenomeMetadata, Vec<Annotation>)>,
    /// Sample ids whose import should fail as a database error would
    pub fail_samples: Vec<String>,
}

#[async_trait]
impl AnnotationStore for MemoryStore {
    async fn import_genome(
        &mut self,
        metadata: &GenomeMetadata,
        annotations: &[Annotation],
    ) -> bakta_ingest::Result<i64> {
        if self.fail_samples.contains(&metadata.sample_id) {
            return Err(IngestError::Database(sqlx::Error::Protocol(format!(
                "simulated failure for {}",
                metadata.sample_id
            ))));
        }

        let id = self.genomes.len() as i64 + 1;
        self.genomes
            .push((id, metadata.clone(), annotations.to_vec()));
        Ok(id)
    }
}

// ============================================================================
// PostgreSQL Test Container
// ============================================================================

/// PostgreSQL container with the workspace migrations applied
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    connection_string: String,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        info!("Starting PostgreSQL test container...");

        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let connection_string = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        let mut store = PgAnnotationStore::new(
            connect(&DbConfig::from_url(&connection_string))
                .await
                .context("Failed to connect to PostgreSQL")?,
        );
        store
            .run_migrations()
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            _container: container,
            connection_string,
        })
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// A fresh connection to the container
    pub async fn connection(&self) -> Result<PgConnection> {
        connect(&DbConfig::from_url(&self.connection_string))
            .await
            .context("Failed to connect to PostgreSQL")
    }

    pub async fn store(&self) -> Result<PgAnnotationStore> {
        Ok(PgAnnotationStore::new(self.connection().await?))
    }
}
