use tracing::warn;

use crate::pipeline::progress::ProgressSender;
use crate::pipeline::schema::{CoverLetter, JobAnalysis, TailoredResume};

/// Mutable context threaded through one pipeline run.
///
/// Artifact slots are write-once: a second write to a filled slot is ignored
/// and logged. Once `error` is set it is never cleared.
#[derive(Debug)]
pub struct PipelineState {
    job_description: String,
    original_resume: String,
    job_analysis: Option<JobAnalysis>,
    tailored_resume: Option<TailoredResume>,
    cover_letter: Option<CoverLetter>,
    error: Option<String>,
    progress: ProgressSender,
}

impl PipelineState {
    pub fn new(
        job_description: impl Into<String>,
        original_resume: impl Into<String>,
        progress: ProgressSender,
    ) -> Self {
        Self {
            job_description: job_description.into(),
            original_resume: original_resume.into(),
            job_analysis: None,
            tailored_resume: None,
            cover_letter: None,
            error: None,
            progress,
        }
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn original_resume(&self) -> &str {
        &self.original_resume
    }

    pub fn job_analysis(&self) -> Option<&JobAnalysis> {
        self.job_analysis.as_ref()
    }

    pub fn tailored_resume(&self) -> Option<&TailoredResume> {
        self.tailored_resume.as_ref()
    }

    pub fn cover_letter(&self) -> Option<&CoverLetter> {
        self.cover_letter.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn progress(&self) -> &ProgressSender {
        &self.progress
    }

    pub fn set_job_analysis(&mut self, analysis: JobAnalysis) {
        write_once(&mut self.job_analysis, analysis, "job_analysis");
    }

    pub fn set_tailored_resume(&mut self, resume: TailoredResume) {
        write_once(&mut self.tailored_resume, resume, "tailored_resume");
    }

    pub fn set_cover_letter(&mut self, letter: CoverLetter) {
        write_once(&mut self.cover_letter, letter, "cover_letter");
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        write_once(&mut self.error, message.into(), "error");
    }
}

fn write_once<T>(slot: &mut Option<T>, value: T, field: &str) {
    if slot.is_some() {
        warn!("Pipeline state field '{field}' already written; keeping first value");
        return;
    }
    *slot = Some(value);
}
