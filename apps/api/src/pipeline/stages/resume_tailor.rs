//! Resume Tailoring stage: rewrites the resume against the job analysis.
//!
//! Before prompting, derives two deterministic artifacts from the inputs:
//! section segmentation and skill coverage. Both go into the prompt as
//! scaffolding next to the raw resume and the analysis.

use tracing::{info, warn};

use crate::llm_client::prompts::AUTHENTICITY_INSTRUCTION;
use crate::llm_client::TextGenerator;
use crate::pipeline::context::PipelineState;
use crate::pipeline::prompts::{
    RESUME_TAILOR_PROMPT_TEMPLATE, RESUME_TAILOR_SYSTEM, RESUME_TAILOR_TEMPERATURE,
};
use crate::pipeline::schema::{validate_as, JobAnalysis, TailoredResume};
use crate::pipeline::sections::{extract_sections, SectionHeaders};
use crate::pipeline::skills::analyze_skills;
use crate::pipeline::stages::{build_request, parse_output, to_pretty_json, StageError, StageName};

const STAGE: StageName = StageName::ResumeTailor;

pub async fn run(
    state: &PipelineState,
    generator: &dyn TextGenerator,
    headers: &SectionHeaders,
) -> Result<TailoredResume, StageError> {
    state.progress().status(STAGE, "Tailoring resume");

    let job_analysis = match state.job_analysis() {
        Some(analysis) if !state.has_failed() => analysis,
        _ => {
            return Err(StageError::precondition(
                STAGE,
                "Job analysis required for resume tailoring",
            ))
        }
    };

    let resume = state.original_resume();
    if resume.trim().is_empty() {
        return Err(StageError::precondition(
            STAGE,
            "Original resume required for tailoring",
        ));
    }

    let prompt = build_prompt(resume, job_analysis, headers)?;
    let request = build_request(
        &format!("{RESUME_TAILOR_SYSTEM}\n\n{AUTHENTICITY_INSTRUCTION}"),
        prompt,
        RESUME_TAILOR_TEMPERATURE,
    );

    let text = generator
        .generate(&request)
        .await
        .map_err(|source| StageError::Generation {
            stage: STAGE,
            source,
        })?;

    let raw = parse_output(STAGE, &text)?;
    let tailored: TailoredResume = validate_as(&raw).map_err(|source| StageError::Validation {
        stage: STAGE,
        source,
    })?;

    if !(0.0..=100.0).contains(&tailored.match_score) {
        warn!(
            "Tailored resume match_score {} is outside 0-100; keeping as reported",
            tailored.match_score
        );
    }

    info!(
        "Resume tailored: sections={}, match_score={}",
        tailored.sections.len(),
        tailored.match_score
    );
    Ok(tailored)
}

fn build_prompt(
    resume: &str,
    job_analysis: &JobAnalysis,
    headers: &SectionHeaders,
) -> Result<String, StageError> {
    let sections = extract_sections(resume, headers);
    let coverage = analyze_skills(resume, &job_analysis.required_skills());

    Ok(RESUME_TAILOR_PROMPT_TEMPLATE
        .replace("{resume}", resume)
        .replace("{job_analysis}", &to_pretty_json(STAGE, job_analysis)?)
        .replace("{skill_analysis}", &to_pretty_json(STAGE, &coverage)?)
        .replace("{sections}", &to_pretty_json(STAGE, &sections)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::progress::progress_channel;
    use crate::testing::{
        job_analysis_json, tailored_resume_json, ScriptedGenerator, JOB_DESCRIPTION, RESUME_TEXT,
    };

    fn state_with_analysis(resume: &str) -> PipelineState {
        let (tx, _rx) = progress_channel();
        let mut state = PipelineState::new(JOB_DESCRIPTION, resume, tx);
        state.set_job_analysis(validate_as(&job_analysis_json()).unwrap());
        state
    }

    #[tokio::test]
    async fn test_prompt_carries_sections_and_skill_coverage() {
        let state = state_with_analysis(RESUME_TEXT);
        let generator = ScriptedGenerator::new().respond_json(tailored_resume_json());

        let tailored = run(&state, &generator, &SectionHeaders::default())
            .await
            .unwrap();
        assert_eq!(tailored.sections.len(), 2);

        let prompt = &generator.requests()[0].prompt;
        assert!(prompt.contains("\"matched_skills\""));
        assert!(prompt.contains("\"match_percentage\": 50.0"));
        assert!(prompt.contains("\"title\": \"EXPERIENCE\""));
        assert!(prompt.contains(RESUME_TEXT));
    }

    #[tokio::test]
    async fn test_missing_job_analysis_skips_generation() {
        let (tx, _rx) = progress_channel();
        let state = PipelineState::new(JOB_DESCRIPTION, RESUME_TEXT, tx);
        let generator = ScriptedGenerator::new().respond_json(tailored_resume_json());

        let err = run(&state, &generator, &SectionHeaders::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Job analysis required"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_errored_state_skips_generation() {
        let mut state = state_with_analysis(RESUME_TEXT);
        state.fail("earlier failure");
        let generator = ScriptedGenerator::new().respond_json(tailored_resume_json());

        assert!(run(&state, &generator, &SectionHeaders::default())
            .await
            .is_err());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_resume_skips_generation() {
        let state = state_with_analysis("  \n ");
        let generator = ScriptedGenerator::new().respond_json(tailored_resume_json());

        let err = run(&state, &generator, &SectionHeaders::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Original resume required"));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_sections_is_validation_error() {
        let state = state_with_analysis(RESUME_TEXT);
        let generator = ScriptedGenerator::new()
            .respond_json(serde_json::json!({ "highlighted_skills": ["SQL"] }));

        let err = run(&state, &generator, &SectionHeaders::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Validation { .. }));
    }
}
