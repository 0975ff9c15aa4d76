//! Test doubles and fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::{NewWorkflowResult, ResultStore, StoreError};
use crate::llm_client::{GenerationRequest, LlmError, TextGenerator};
use crate::models::workflow::WorkflowResultRow;

pub const JOB_DESCRIPTION: &str = "We are hiring a Data Engineer to build batch pipelines in \
Python and SQL. You will work with analysts, mentor junior engineers and communicate \
clearly with stakeholders.";

pub const RESUME_TEXT: &str = "Jane Doe
jane@example.com

EXPERIENCE
Backend Developer, Acme Corp (2020-2024)
Built ETL jobs in Python processing 2M events per day.
Presented weekly updates with strong communication to product teams.

EDUCATION
BSc Computer Science, State University (2016-2020)
";

pub fn job_analysis_json() -> Value {
    json!({
        "role_title": "Data Engineer",
        "company_name": null,
        "hard_skills": ["Python", "SQL"],
        "soft_skills": ["Communication", "Mentoring"],
        "responsibilities": ["Build batch pipelines", "Mentor junior engineers"],
        "experience_level": "Mid",
        "required_education": "Bachelor's degree",
        "location": null,
        "employment_type": "Full-time",
        "industry": "Technology"
    })
}

pub fn tailored_resume_json() -> Value {
    json!({
        "sections": [
            {
                "title": "EXPERIENCE",
                "content": "Backend Developer, Acme Corp (2020-2024)\nBuilt Python ETL jobs processing 2M events per day."
            },
            {
                "title": "EDUCATION",
                "content": "BSc Computer Science, State University (2016-2020)"
            }
        ],
        "highlighted_skills": ["Python", "SQL"],
        "match_score": 72.5,
        "tailoring_notes": ["Added SQL (learning) to the skills section"]
    })
}

pub fn cover_letter_json() -> Value {
    json!({
        "opening_paragraph": "I am excited to apply for the Data Engineer position.",
        "body_paragraphs": [
            "At Acme Corp I built Python ETL jobs that processed two million events per day.",
            "I am currently learning SQL and enjoy explaining technical work to product teams."
        ],
        "closing_paragraph": "Thank you for considering my application.",
        "key_skills_highlighted": ["Python", "Communication"],
        "tone": "professional",
        "word_count": 0
    })
}

enum Scripted {
    Text(String),
    Failure(String),
}

/// A `TextGenerator` that replays a fixed script, one entry per call, and
/// records every request it receives.
#[derive(Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerationRequest>>,
    delay: Option<Duration>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, text: impl Into<String>) -> Self {
        self.push(Scripted::Text(text.into()))
    }

    pub fn respond_json(self, value: Value) -> Self {
        self.respond(value.to_string())
    }

    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Failure(message.into()))
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(self, entry: Scripted) -> Self {
        self.script.lock().unwrap().push_back(entry);
        self
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Failure(message)) => Err(LlmError::Api {
                status: 500,
                message,
            }),
            None => Err(LlmError::Api {
                status: 500,
                message: "script exhausted".to_string(),
            }),
        }
    }
}

/// In-memory `ResultStore`.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<WorkflowResultRow>>,
}

impl MemoryStore {
    pub fn saved(&self) -> Vec<WorkflowResultRow> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn save(&self, result: &NewWorkflowResult<'_>) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let row = WorkflowResultRow {
            id,
            job_description: result.job_description.to_string(),
            resume_filename: result.resume_filename.map(str::to_string),
            job_analysis: serde_json::to_value(&result.record.job_analysis).unwrap(),
            tailored_resume: serde_json::to_value(&result.record.tailored_resume).unwrap(),
            cover_letter: serde_json::to_value(&result.record.cover_letter).unwrap(),
            processing_time_seconds: result.processing_time_seconds,
            status: "completed".to_string(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row);
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<WorkflowResultRow>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }
}

/// A `ResultStore` whose database is always unreachable.
pub struct FailingStore;

#[async_trait]
impl ResultStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn save(&self, _result: &NewWorkflowResult<'_>) -> Result<Uuid, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn fetch(&self, _id: Uuid) -> Result<Option<WorkflowResultRow>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}
