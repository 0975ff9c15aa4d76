//! Progress Channel: ordered, unbounded queue between the background pipeline
//! task (producer) and the stream adapter (sole consumer).

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::pipeline::orchestrator::FinalRecord;
use crate::pipeline::stages::StageName;

/// Events emitted by a pipeline run. `Result` and `Error` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Status { agent: StageName, message: String },
    Result(Box<FinalRecord>),
    Error { message: String },
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressEvent::Status { .. })
    }
}

/// Producer handle. Cloned into the pipeline state; stages write, never read.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    pub fn status(&self, agent: StageName, message: impl Into<String>) {
        self.send(ProgressEvent::Status {
            agent,
            message: message.into(),
        });
    }

    pub fn send(&self, event: ProgressEvent) {
        if event.is_terminal() {
            debug!("Pipeline run finished; sending terminal event");
        }
        // The consumer hanging up (client disconnected) is not an error for the run.
        if self.tx.send(event).is_err() {
            debug!("Progress consumer dropped; discarding event");
        }
    }
}

/// Outcome of a single bounded poll.
#[derive(Debug, PartialEq)]
pub enum Poll {
    Event(ProgressEvent),
    /// Nothing arrived within the poll window.
    Idle,
    /// Every sender is gone and the queue is drained.
    Closed,
}

#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Waits up to `window` for the next event. Cancel-safe.
    pub async fn poll(&mut self, window: Duration) -> Poll {
        match tokio::time::timeout(window, self.rx.recv()).await {
            Ok(Some(event)) => Poll::Event(event),
            Ok(None) => Poll::Closed,
            Err(_) => Poll::Idle,
        }
    }
}

pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, ProgressReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_emission_order() {
        let (tx, mut rx) = progress_channel();
        tx.status(StageName::JdAnalyzer, "one");
        tx.status(StageName::ResumeTailor, "two");
        tx.send(ProgressEvent::Error {
            message: "three".to_string(),
        });
        drop(tx);

        let window = Duration::from_millis(10);
        let mut seen = Vec::new();
        while let Poll::Event(event) = rx.poll(window).await {
            seen.push(event);
        }
        assert_eq!(seen.len(), 3);
        assert!(!seen[0].is_terminal());
        assert!(matches!(&seen[1], ProgressEvent::Status { agent: StageName::ResumeTailor, .. }));
        assert!(seen[2].is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_reports_idle_then_closed() {
        let (tx, mut rx) = progress_channel();
        assert_eq!(rx.poll(Duration::from_millis(100)).await, Poll::Idle);
        drop(tx);
        assert_eq!(rx.poll(Duration::from_millis(100)).await, Poll::Closed);
    }

    #[test]
    fn test_send_after_consumer_dropped_does_not_panic() {
        let (tx, rx) = progress_channel();
        drop(rx);
        tx.status(StageName::CoverLetterGenerator, "nobody listening");
    }
}
