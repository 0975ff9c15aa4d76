//! Cover Letter stage: drafts a letter consistent with the tailored resume
//! and the job analysis.
//!
//! `word_count` is always recomputed from the letter text; whatever the model
//! reports is overwritten before validation.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::llm_client::prompts::AUTHENTICITY_INSTRUCTION;
use crate::llm_client::TextGenerator;
use crate::pipeline::context::PipelineState;
use crate::pipeline::prompts::{
    COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM, COVER_LETTER_TEMPERATURE,
};
use crate::pipeline::schema::{validate_as, CoverLetter, JobAnalysis, TailoredResume};
use crate::pipeline::stages::{build_request, parse_output, to_pretty_json, StageError, StageName};

const STAGE: StageName = StageName::CoverLetterGenerator;

/// Soft target from the prompt guidance. Logged, never enforced.
const TARGET_WORDS: std::ops::RangeInclusive<u32> = 250..=400;

/// Résumé content bucketed by section kind, for the prompt only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateContext {
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub projects: Vec<String>,
    pub skills: Vec<String>,
}

impl CandidateContext {
    pub fn from_resume(resume: &TailoredResume) -> Self {
        let mut context = CandidateContext {
            skills: resume.highlighted_skills.clone(),
            ..Default::default()
        };

        for section in &resume.sections {
            let title = section.title.to_lowercase();
            let bucket = if title.contains("experience") {
                &mut context.experience
            } else if title.contains("education") {
                &mut context.education
            } else if title.contains("project") {
                &mut context.projects
            } else {
                continue;
            };
            bucket.push(section.content.clone());
        }

        context
    }
}

/// Highlighted skills split by whether a tailoring note marks them as being learned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillSplit {
    pub established: Vec<String>,
    pub learning: Vec<String>,
}

impl SkillSplit {
    pub fn from_resume(resume: &TailoredResume) -> Self {
        let notes: Vec<String> = resume
            .tailoring_notes
            .iter()
            .map(|n| n.to_lowercase())
            .filter(|n| n.contains("learning"))
            .collect();

        let (learning, established): (Vec<String>, Vec<String>) = resume
            .highlighted_skills
            .iter()
            .cloned()
            .partition(|skill| {
                let skill = skill.to_lowercase();
                notes.iter().any(|note| note.contains(&skill))
            });

        SkillSplit {
            established,
            learning,
        }
    }
}

/// Whitespace-token count across the given text parts.
pub fn count_words<'a>(parts: impl IntoIterator<Item = &'a str>) -> u32 {
    parts
        .into_iter()
        .map(|p| p.split_whitespace().count() as u32)
        .sum()
}

pub async fn run(
    state: &PipelineState,
    generator: &dyn TextGenerator,
) -> Result<CoverLetter, StageError> {
    state.progress().status(STAGE, "Generating cover letter");

    let tailored_resume = match state.tailored_resume() {
        Some(resume) if !state.has_failed() => resume,
        _ => {
            return Err(StageError::precondition(
                STAGE,
                "Tailored resume required for cover letter generation",
            ))
        }
    };
    let job_analysis = state.job_analysis().ok_or_else(|| {
        StageError::precondition(STAGE, "Job analysis required for cover letter generation")
    })?;

    let prompt = build_prompt(tailored_resume, job_analysis)?;
    let request = build_request(
        &format!("{COVER_LETTER_SYSTEM}\n\n{AUTHENTICITY_INSTRUCTION}"),
        prompt,
        COVER_LETTER_TEMPERATURE,
    );

    let text = generator
        .generate(&request)
        .await
        .map_err(|source| StageError::Generation {
            stage: STAGE,
            source,
        })?;

    let mut raw = parse_output(STAGE, &text)?;
    if let Some(fields) = raw.as_object_mut() {
        let words = word_count_of(fields);
        fields.insert("word_count".to_string(), Value::from(words));
    }

    let letter: CoverLetter = validate_as(&raw).map_err(|source| StageError::Validation {
        stage: STAGE,
        source,
    })?;

    if !TARGET_WORDS.contains(&letter.word_count) {
        debug!(
            "Cover letter has {} words, outside the {:?} guidance",
            letter.word_count, TARGET_WORDS
        );
    }

    info!(
        "Cover letter generated: paragraphs={}, words={}",
        letter.body_paragraphs.len() + 2,
        letter.word_count
    );
    Ok(letter)
}

fn str_field<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a str {
    fields.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn word_count_of(fields: &Map<String, Value>) -> u32 {
    let body = fields
        .get("body_paragraphs")
        .and_then(Value::as_array)
        .map(|paragraphs| paragraphs.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();

    count_words(
        std::iter::once(str_field(fields, "opening_paragraph"))
            .chain(body)
            .chain(std::iter::once(str_field(fields, "closing_paragraph"))),
    )
}

fn build_prompt(
    tailored_resume: &TailoredResume,
    job_analysis: &JobAnalysis,
) -> Result<String, StageError> {
    let candidate = CandidateContext::from_resume(tailored_resume);
    let split = SkillSplit::from_resume(tailored_resume);

    Ok(COVER_LETTER_PROMPT_TEMPLATE
        .replace("{tailored_resume}", &to_pretty_json(STAGE, tailored_resume)?)
        .replace("{job_analysis}", &to_pretty_json(STAGE, job_analysis)?)
        .replace("{candidate_context}", &to_pretty_json(STAGE, &candidate)?)
        .replace("{established_skills}", &split.established.join(", "))
        .replace("{learning_skills}", &split.learning.join(", "))
        .replace("{soft_skills}", &job_analysis.soft_skills.join(", "))
        .replace("{match_score}", &tailored_resume.match_score.to_string()))
}
