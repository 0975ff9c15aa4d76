//! JD Analysis stage: extracts a `JobAnalysis` from the raw job description.

use tracing::info;

use crate::llm_client::TextGenerator;
use crate::pipeline::context::PipelineState;
use crate::pipeline::prompts::{
    JD_ANALYSIS_PROMPT_TEMPLATE, JD_ANALYSIS_SYSTEM, JD_ANALYSIS_TEMPERATURE,
};
use crate::pipeline::schema::{validate_as, JobAnalysis};
use crate::pipeline::stages::{build_request, parse_output, StageError, StageName};

const STAGE: StageName = StageName::JdAnalyzer;

pub async fn run(
    state: &PipelineState,
    generator: &dyn TextGenerator,
) -> Result<JobAnalysis, StageError> {
    state.progress().status(STAGE, "Analyzing job description");

    let job_description = state.job_description().trim();
    if job_description.is_empty() {
        return Err(StageError::precondition(STAGE, "No job description provided"));
    }

    let request = build_request(
        JD_ANALYSIS_SYSTEM,
        JD_ANALYSIS_PROMPT_TEMPLATE.replace("{job_description}", job_description),
        JD_ANALYSIS_TEMPERATURE,
    );

    let text = generator
        .generate(&request)
        .await
        .map_err(|source| StageError::Generation {
            stage: STAGE,
            source,
        })?;

    let raw = parse_output(STAGE, &text)?;
    let analysis: JobAnalysis = validate_as(&raw).map_err(|source| StageError::Validation {
        stage: STAGE,
        source,
    })?;

    info!(
        "JD analyzed: role={:?}, hard_skills={}, soft_skills={}",
        analysis.role_title,
        analysis.hard_skills.len(),
        analysis.soft_skills.len()
    );
    Ok(analysis)
}
