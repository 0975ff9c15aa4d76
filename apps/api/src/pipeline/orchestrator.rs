//! Pipeline Orchestrator: runs the three stages in order, stops at the first
//! failure, bounds the whole run by one deadline, and pushes exactly one
//! terminal event onto the progress channel.
//!
//! Phases: Analyzing → Tailoring → Drafting → Done, with Failed absorbing.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PipelineSettings;
use crate::llm_client::TextGenerator;
use crate::pipeline::context::PipelineState;
use crate::pipeline::progress::ProgressEvent;
use crate::pipeline::schema::{
    revalidate, CoverLetter, JobAnalysis, Shape, StructuredOutput, TailoredResume, ValidationError,
};
use crate::pipeline::stages::{cover_letter, jd_analyzer, resume_tailor, StageError};

pub const TIMEOUT_MESSAGE: &str = "Processing timeout - operation took too long";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Analyzing,
    Tailoring,
    Drafting,
    Done,
    Failed,
}

impl PipelinePhase {
    /// Next phase after the current stage reported success or failure.
    /// `Done` and `Failed` never move.
    pub fn advance(self, stage_succeeded: bool) -> Self {
        use PipelinePhase::*;
        match (self, stage_succeeded) {
            (Analyzing, true) => Tailoring,
            (Tailoring, true) => Drafting,
            (Drafting, true) => Done,
            (Analyzing | Tailoring | Drafting, false) => Failed,
            (terminal, _) => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelinePhase::Done | PipelinePhase::Failed)
    }
}

/// The assembled output of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalRecord {
    pub job_analysis: JobAnalysis,
    pub tailored_resume: TailoredResume,
    pub cover_letter: CoverLetter,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Stage(#[from] StageError),

    #[error("Processing timeout - operation took too long")]
    Timeout,

    #[error("Output validation failed: {0}")]
    Assembly(#[from] ValidationError),

    #[error("Output validation failed: {0} is missing")]
    Incomplete(Shape),
}

#[derive(Clone)]
pub struct Orchestrator {
    generator: Arc<dyn TextGenerator>,
    settings: PipelineSettings,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: PipelineSettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs all stages without a deadline. Prefer [`Orchestrator::spawn`].
    pub async fn run(&self, mut state: PipelineState) -> Result<FinalRecord, PipelineError> {
        let generator = self.generator.as_ref();
        let mut phase = PipelinePhase::Analyzing;
        let mut failure: Option<StageError> = None;

        while !phase.is_terminal() {
            let started = Instant::now();
            let outcome = match phase {
                PipelinePhase::Analyzing => jd_analyzer::run(&state, generator)
                    .await
                    .map(StructuredOutput::JobAnalysis),
                PipelinePhase::Tailoring => {
                    resume_tailor::run(&state, generator, &self.settings.section_headers)
                        .await
                        .map(StructuredOutput::TailoredResume)
                }
                PipelinePhase::Drafting => cover_letter::run(&state, generator)
                    .await
                    .map(StructuredOutput::CoverLetter),
                PipelinePhase::Done | PipelinePhase::Failed => break,
            };

            let next = phase.advance(outcome.is_ok());
            match outcome {
                Ok(output) => record(&mut state, output),
                Err(err) => {
                    state.fail(err.to_string());
                    warn!("Pipeline stopped: {}", state.error().unwrap_or_default());
                    failure = Some(err);
                }
            }
            info!(
                "Pipeline {:?} -> {:?} after {}ms",
                phase,
                next,
                started.elapsed().as_millis()
            );
            phase = next;
        }

        match failure {
            Some(err) => Err(PipelineError::Stage(err)),
            None => assemble(&state),
        }
    }

    /// Runs the pipeline against an absolute deadline. Exceeding it abandons
    /// the in-flight stage and yields [`PipelineError::Timeout`].
    pub async fn run_until(
        &self,
        state: PipelineState,
        deadline: tokio::time::Instant,
    ) -> Result<FinalRecord, PipelineError> {
        tokio::time::timeout_at(deadline, self.run(state))
            .await
            .unwrap_or(Err(PipelineError::Timeout))
    }

    /// Starts the run as a background task. When it ends, exactly one terminal
    /// event (`Result` or `Error`) is pushed to the state's progress channel.
    pub fn spawn(&self, state: PipelineState, deadline: tokio::time::Instant) -> JoinHandle<()> {
        let orchestrator = self.clone();
        let progress = state.progress().clone();

        tokio::spawn(async move {
            let event = match orchestrator.run_until(state, deadline).await {
                Ok(record) => ProgressEvent::Result(Box::new(record)),
                Err(err) => {
                    warn!("Pipeline run failed: {err}");
                    ProgressEvent::Error {
                        message: err.to_string(),
                    }
                }
            };
            progress.send(event);
        })
    }
}

fn record(state: &mut PipelineState, output: StructuredOutput) {
    debug!("Recording {}", output.shape());
    match output {
        StructuredOutput::JobAnalysis(analysis) => state.set_job_analysis(analysis),
        StructuredOutput::TailoredResume(resume) => state.set_tailored_resume(resume),
        StructuredOutput::CoverLetter(letter) => state.set_cover_letter(letter),
    }
}

/// Collects the three artifacts and validates each against its shape again.
/// A failure here means stages reported success on inconsistent output.
pub fn assemble(state: &PipelineState) -> Result<FinalRecord, PipelineError> {
    let job_analysis = state
        .job_analysis()
        .ok_or(PipelineError::Incomplete(Shape::JobAnalysis))?;
    let tailored_resume = state
        .tailored_resume()
        .ok_or(PipelineError::Incomplete(Shape::TailoredResume))?;
    let cover_letter = state
        .cover_letter()
        .ok_or(PipelineError::Incomplete(Shape::CoverLetter))?;

    Ok(FinalRecord {
        job_analysis: revalidate(job_analysis)?,
        tailored_resume: revalidate(tailored_resume)?,
        cover_letter: revalidate(cover_letter)?,
    })
}
