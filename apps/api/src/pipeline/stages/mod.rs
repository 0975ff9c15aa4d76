//! Stage executors. Each wraps exactly one generation call:
//! prompt → generate → parse → validate. No partial result ever escapes a stage.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, GenerationRequest, LlmError};
use crate::pipeline::schema::ValidationError;

pub mod cover_letter;
pub mod jd_analyzer;
pub mod resume_tailor;

/// Identifier of a stage as it appears on the wire (`agent` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    JdAnalyzer,
    ResumeTailor,
    CoverLetterGenerator,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::JdAnalyzer => "jd_analyzer",
            StageName::ResumeTailor => "resume_tailor",
            StageName::CoverLetterGenerator => "cover_letter_generator",
        }
    }

    /// Human-readable stage label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            StageName::JdAnalyzer => "Job description analysis",
            StageName::ResumeTailor => "Resume tailoring",
            StageName::CoverLetterGenerator => "Cover letter generation",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error("{stage} failed: {reason}")]
    Precondition { stage: StageName, reason: String },

    #[error("{stage} failed: generation service error: {source}")]
    Generation {
        stage: StageName,
        #[source]
        source: LlmError,
    },

    #[error("{stage} failed: output was not valid JSON: {source}")]
    Parse {
        stage: StageName,
        #[source]
        source: serde_json::Error,
    },

    #[error("{stage} failed: {source}")]
    Validation {
        stage: StageName,
        #[source]
        source: ValidationError,
    },

    #[error("{stage} failed: could not build prompt: {source}")]
    Prompt {
        stage: StageName,
        #[source]
        source: serde_json::Error,
    },
}

impl StageError {
    pub fn stage(&self) -> StageName {
        match self {
            StageError::Precondition { stage, .. }
            | StageError::Generation { stage, .. }
            | StageError::Parse { stage, .. }
            | StageError::Validation { stage, .. }
            | StageError::Prompt { stage, .. } => *stage,
        }
    }

    pub(crate) fn precondition(stage: StageName, reason: impl Into<String>) -> Self {
        StageError::Precondition {
            stage,
            reason: reason.into(),
        }
    }
}

/// Appends the shared JSON-only rules to a stage system prompt.
pub(crate) fn build_request(system: &str, prompt: String, temperature: f32) -> GenerationRequest {
    GenerationRequest {
        system: format!("{system}\n\n{JSON_ONLY_SYSTEM}"),
        prompt,
        temperature,
    }
}

/// Parses raw model text (optionally fenced) into JSON.
pub(crate) fn parse_output(stage: StageName, text: &str) -> Result<Value, StageError> {
    serde_json::from_str(strip_json_fences(text)).map_err(|source| StageError::Parse { stage, source })
}

pub(crate) fn to_pretty_json<T: Serialize>(stage: StageName, value: &T) -> Result<String, StageError> {
    serde_json::to_string_pretty(value).map_err(|source| StageError::Prompt { stage, source })
}
