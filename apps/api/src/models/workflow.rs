use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowResultRow {
    pub id: Uuid,
    pub job_description: String,
    pub resume_filename: Option<String>,
    pub job_analysis: Value,
    pub tailored_resume: Value,
    pub cover_letter: Value,
    pub processing_time_seconds: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
