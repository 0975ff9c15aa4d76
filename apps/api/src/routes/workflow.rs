use std::convert::Infallible;
use std::time::Instant;

use axum::{
    extract::{Multipart, Path, State},
    response::sse::{Event, Sse},
    Json,
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::input::{ensure_pdf, extract_resume_text, validate_job_description, InputError};
use crate::models::workflow::WorkflowResultRow;
use crate::pipeline::context::PipelineState;
use crate::pipeline::progress::progress_channel;
use crate::pipeline::stream::{event_stream, RunContext, StreamEvent, StreamFrame};
use crate::state::AppState;

struct ResumeForm {
    filename: String,
    data: Bytes,
    job_description: String,
}

async fn read_form(multipart: &mut Multipart) -> Result<ResumeForm, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume_file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                resume = Some((filename, data));
            }
            "job_description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let (filename, data) = resume.ok_or(InputError::MissingField("resume_file"))?;
    let job_description = job_description.ok_or(InputError::MissingField("job_description"))?;
    Ok(ResumeForm {
        filename,
        data,
        job_description,
    })
}

fn to_sse_event(frame: StreamFrame) -> Event {
    match frame {
        StreamFrame::Heartbeat => Event::default().comment("heartbeat"),
        StreamFrame::Event(event) => match serde_json::to_string(&event) {
            Ok(json) => Event::default().data(json),
            Err(e) => {
                error!("Failed to serialize stream event: {e}");
                let fallback = StreamEvent::Error {
                    message: format!("Failed to serialize result: {e}"),
                };
                Event::default().data(serde_json::to_string(&fallback).unwrap_or_default())
            }
        },
    }
}

/// POST /process-resume
/// Validates the upload, then streams pipeline progress as server-sent events.
pub async fn handle_process_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let accepted_at = Instant::now();
    let form = read_form(&mut multipart).await?;

    ensure_pdf(&form.filename)?;
    let job_description =
        validate_job_description(&form.job_description, state.config.min_job_description_chars)?;
    let resume_text = extract_resume_text(&form.filename, form.data).await?;

    info!(
        "Accepted {} ({} chars) against a {}-char job description",
        form.filename,
        resume_text.len(),
        job_description.len()
    );

    // The deadline runs from request acceptance, so upload parsing counts against it.
    let settings = state.orchestrator.settings();
    let deadline = tokio::time::Instant::from_std(accepted_at) + settings.timeout;
    let heartbeat = settings.heartbeat;

    let (tx, rx) = progress_channel();
    let pipeline_state = PipelineState::new(job_description.clone(), resume_text, tx);
    let task = state.orchestrator.spawn(pipeline_state, deadline);

    let run = RunContext {
        job_description,
        resume_filename: Some(form.filename),
        accepted_at,
    };
    let frames = event_stream(rx, task, state.store.clone(), run, heartbeat)
        .map(|frame| Ok::<_, Infallible>(to_sse_event(frame)));

    Ok(Sse::new(frames))
}

/// GET /api/v1/results/:id
pub async fn handle_get_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkflowResultRow>, AppError> {
    let row = state
        .store
        .fetch(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Workflow result {id} not found")))?;
    Ok(Json(row))
}
