//! Schema Validator: checks raw generation output against one of the three
//! structured shapes and fills documented defaults.
//!
//! Pure: no I/O, no logging. Numeric ranges are not clamped here.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_EXPERIENCE_LEVEL: &str = "Not specified";
pub const DEFAULT_TONE: &str = "professional";

// ────────────────────────────────────────────────────────────────────────────
// Shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    JobAnalysis,
    TailoredResume,
    CoverLetter,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::JobAnalysis => "job analysis",
            Shape::TailoredResume => "tailored resume",
            Shape::CoverLetter => "cover letter",
        };
        f.write_str(name)
    }
}

/// Structured requirements extracted from a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    pub role_title: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hard_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub soft_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
    #[serde(
        default = "default_experience_level",
        deserialize_with = "experience_level_or_default"
    )]
    pub experience_level: String,
    #[serde(default)]
    pub required_education: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl JobAnalysis {
    /// Hard skills followed by soft skills, in extraction order.
    pub fn required_skills(&self) -> Vec<String> {
        self.hard_skills
            .iter()
            .chain(self.soft_skills.iter())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredResume {
    /// Ordered as the sections appear in the resume.
    pub sections: Vec<ResumeSection>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlighted_skills: Vec<String>,
    /// Advisory range 0–100; not clamped.
    #[serde(default, deserialize_with = "null_as_default")]
    pub match_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tailoring_notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverLetter {
    pub opening_paragraph: String,
    pub body_paragraphs: Vec<String>,
    pub closing_paragraph: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_skills_highlighted: Vec<String>,
    #[serde(default = "default_tone", deserialize_with = "tone_or_default")]
    pub tone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub word_count: u32,
}

/// A validated record of any of the three shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StructuredOutput {
    JobAnalysis(JobAnalysis),
    TailoredResume(TailoredResume),
    CoverLetter(CoverLetter),
}

impl StructuredOutput {
    pub fn shape(&self) -> Shape {
        match self {
            StructuredOutput::JobAnalysis(_) => Shape::JobAnalysis,
            StructuredOutput::TailoredResume(_) => Shape::TailoredResume,
            StructuredOutput::CoverLetter(_) => Shape::CoverLetter,
        }
    }
}

/// Ties a record type to its shape so stages can validate straight into it.
pub trait SchemaShape: DeserializeOwned + Serialize + Sized {
    const SHAPE: Shape;

    /// Unwraps the matching variant; `None` for any other shape.
    fn from_output(output: StructuredOutput) -> Option<Self>;
}

impl SchemaShape for JobAnalysis {
    const SHAPE: Shape = Shape::JobAnalysis;

    fn from_output(output: StructuredOutput) -> Option<Self> {
        match output {
            StructuredOutput::JobAnalysis(analysis) => Some(analysis),
            _ => None,
        }
    }
}

impl SchemaShape for TailoredResume {
    const SHAPE: Shape = Shape::TailoredResume;

    fn from_output(output: StructuredOutput) -> Option<Self> {
        match output {
            StructuredOutput::TailoredResume(resume) => Some(resume),
            _ => None,
        }
    }
}

impl SchemaShape for CoverLetter {
    const SHAPE: Shape = Shape::CoverLetter;

    fn from_output(output: StructuredOutput) -> Option<Self> {
        match output {
            StructuredOutput::CoverLetter(letter) => Some(letter),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{shape} output must be a JSON object, got {found}")]
    NotAnObject { shape: Shape, found: &'static str },

    #[error("{shape} output is invalid: {source}")]
    Invalid {
        shape: Shape,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected {expected} output, got {found}")]
    WrongShape { expected: Shape, found: Shape },
}

/// Validates `raw` against `shape`, returning the normalized record.
pub fn validate(raw: &Value, shape: Shape) -> Result<StructuredOutput, ValidationError> {
    Ok(match shape {
        Shape::JobAnalysis => StructuredOutput::JobAnalysis(validate_as(raw)?),
        Shape::TailoredResume => StructuredOutput::TailoredResume(validate_as(raw)?),
        Shape::CoverLetter => StructuredOutput::CoverLetter(validate_as(raw)?),
    })
}

/// Typed form of [`validate`].
pub fn validate_as<T: SchemaShape>(raw: &Value) -> Result<T, ValidationError> {
    if !raw.is_object() {
        return Err(ValidationError::NotAnObject {
            shape: T::SHAPE,
            found: json_kind(raw),
        });
    }
    T::deserialize(raw).map_err(|source| ValidationError::Invalid {
        shape: T::SHAPE,
        source,
    })
}

/// Serializes an already-typed record and validates it again against its shape.
pub fn revalidate<T: SchemaShape>(record: &T) -> Result<T, ValidationError> {
    let raw = serde_json::to_value(record).map_err(|source| ValidationError::Invalid {
        shape: T::SHAPE,
        source,
    })?;
    let output = validate(&raw, T::SHAPE)?;
    let found = output.shape();
    T::from_output(output).ok_or(ValidationError::WrongShape {
        expected: T::SHAPE,
        found,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn default_experience_level() -> String {
    DEFAULT_EXPERIENCE_LEVEL.to_string()
}

fn default_tone() -> String {
    DEFAULT_TONE.to_string()
}

// Models often emit `null` for fields they have nothing to say about.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn experience_level_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_experience_level))
}

fn tone_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_tone))
}
