//! Persistence of completed workflow results.
//!
//! Best-effort from the pipeline's point of view: the stream adapter logs a
//! failed save and still reports the run as completed.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::workflow::WorkflowResultRow;
use crate::pipeline::orchestrator::FinalRecord;

const CREATE_WORKFLOW_RESULTS: &str = r#"
CREATE TABLE IF NOT EXISTS workflow_results (
    id UUID PRIMARY KEY,
    job_description TEXT NOT NULL,
    resume_filename TEXT,
    job_analysis JSONB NOT NULL,
    tailored_resume JSONB NOT NULL,
    cover_letter JSONB NOT NULL,
    processing_time_seconds DOUBLE PRECISION NOT NULL,
    status TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the results table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(CREATE_WORKFLOW_RESULTS).execute(pool).await?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence is disabled")]
    Disabled,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A completed run ready to be saved.
#[derive(Debug, Clone, Copy)]
pub struct NewWorkflowResult<'a> {
    pub job_description: &'a str,
    pub resume_filename: Option<&'a str>,
    pub record: &'a FinalRecord,
    pub processing_time_seconds: f64,
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;

    async fn save(&self, result: &NewWorkflowResult<'_>) -> Result<Uuid, StoreError>;

    async fn fetch(&self, id: Uuid) -> Result<Option<WorkflowResultRow>, StoreError>;
}

pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn save(&self, result: &NewWorkflowResult<'_>) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO workflow_results
                (id, job_description, resume_filename, job_analysis, tailored_resume,
                 cover_letter, processing_time_seconds, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'completed')
            "#,
        )
        .bind(id)
        .bind(result.job_description)
        .bind(result.resume_filename)
        .bind(Json(&result.record.job_analysis))
        .bind(Json(&result.record.tailored_resume))
        .bind(Json(&result.record.cover_letter))
        .bind(result.processing_time_seconds)
        .execute(&self.pool)
        .await?;

        info!("Saved workflow result {id}");
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<WorkflowResultRow>, StoreError> {
        let row = sqlx::query_as::<_, WorkflowResultRow>(
            "SELECT * FROM workflow_results WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

/// Used when no database is configured. Every call fails softly.
pub struct DisabledStore;

#[async_trait]
impl ResultStore for DisabledStore {
    fn backend(&self) -> &'static str {
        "disabled"
    }

    async fn save(&self, _result: &NewWorkflowResult<'_>) -> Result<Uuid, StoreError> {
        Err(StoreError::Disabled)
    }

    async fn fetch(&self, _id: Uuid) -> Result<Option<WorkflowResultRow>, StoreError> {
        Err(StoreError::Disabled)
    }
}
