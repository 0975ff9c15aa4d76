//! Stream Adapter: turns the progress channel into the client-facing event
//! sequence: `started` first, `processing` per stage, then exactly one
//! `completed` or `error`. Idle periods yield heartbeats.
//!
//! Kept free of axum types; the HTTP handler maps frames onto SSE.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::db::{NewWorkflowResult, ResultStore};
use crate::pipeline::orchestrator::FinalRecord;
use crate::pipeline::progress::{Poll, ProgressEvent, ProgressReceiver};
use crate::pipeline::stages::StageName;

/// Wire event. Serialized as a JSON object tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreamEvent {
    Started {
        message: String,
    },
    Processing {
        agent: StageName,
        message: String,
    },
    Completed {
        message: String,
        data: CompletedData,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedData {
    #[serde(flatten)]
    pub record: FinalRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    Event(StreamEvent),
    Heartbeat,
}

/// Request facts the adapter needs to persist a completed run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub job_description: String,
    pub resume_filename: Option<String>,
    pub accepted_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdapterPhase {
    Starting,
    Streaming,
    Finished,
}

struct Adapter {
    rx: ProgressReceiver,
    store: Arc<dyn ResultStore>,
    run: RunContext,
    heartbeat: Duration,
    phase: AdapterPhase,
    task: Option<JoinHandle<()>>,
}

impl Drop for Adapter {
    // Stream dropped mid-run (client disconnected): abort the pipeline task.
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Adapter {
    async fn next_frame(&mut self) -> Option<StreamFrame> {
        match self.phase {
            AdapterPhase::Finished => None,
            AdapterPhase::Starting => {
                self.phase = AdapterPhase::Streaming;
                Some(StreamFrame::Event(StreamEvent::Started {
                    message: "Processing started".to_string(),
                }))
            }
            AdapterPhase::Streaming => {
                let terminal = match self.rx.poll(self.heartbeat).await {
                    Poll::Idle => return Some(StreamFrame::Heartbeat),
                    Poll::Event(ProgressEvent::Status { agent, message }) => {
                        debug!("Stage {} in progress", agent.as_str());
                        return Some(StreamFrame::Event(StreamEvent::Processing {
                            agent,
                            message,
                        }))
                    }
                    Poll::Event(ProgressEvent::Result(record)) => self.complete(*record).await,
                    Poll::Event(ProgressEvent::Error { message }) => StreamEvent::Error { message },
                    Poll::Closed => StreamEvent::Error {
                        message: "Processing ended without a result".to_string(),
                    },
                };
                self.phase = AdapterPhase::Finished;
                Some(StreamFrame::Event(terminal))
            }
        }
    }

    async fn complete(&self, record: FinalRecord) -> StreamEvent {
        let processing_time_seconds = self.run.accepted_at.elapsed().as_secs_f64();
        let new_result = NewWorkflowResult {
            job_description: &self.run.job_description,
            resume_filename: self.run.resume_filename.as_deref(),
            record: &record,
            processing_time_seconds,
        };

        let database_id = match self.store.save(&new_result).await {
            Ok(id) => Some(id.to_string()),
            Err(e) => {
                error!(
                    "Failed to persist workflow result ({} backend): {e}",
                    self.store.backend()
                );
                None
            }
        };

        info!("Pipeline completed in {processing_time_seconds:.1}s");
        StreamEvent::Completed {
            message: "Processing completed".to_string(),
            data: CompletedData {
                record,
                database_id,
            },
        }
    }
}

/// Drains `rx` into the outward frame sequence. Owns `task` so that dropping
/// the stream aborts the background run.
pub fn event_stream(
    rx: ProgressReceiver,
    task: JoinHandle<()>,
    store: Arc<dyn ResultStore>,
    run: RunContext,
    heartbeat: Duration,
) -> impl Stream<Item = StreamFrame> {
    let adapter = Adapter {
        rx,
        store,
        run,
        heartbeat,
        phase: AdapterPhase::Starting,
        task: Some(task),
    };

    futures::stream::unfold(adapter, |mut adapter| async move {
        let frame = adapter.next_frame().await?;
        Some((frame, adapter))
    })
}
