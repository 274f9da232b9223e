//! Job submission queue.
//!
//! Submission is fire-and-forget: the handler enqueues, the worker loop
//! consumes. There is no cancellation; a submitted job always runs.

use kiln_training::TrainingRequest;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// A unit of work for the worker: one accepted training request.
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub request: TrainingRequest,
}

pub type JobReceiver = mpsc::UnboundedReceiver<QueuedJob>;

#[derive(Debug, Error)]
#[error("job queue is closed")]
pub struct QueueClosed;

/// Sending half of the job queue, held by the submission handler.
#[derive(Debug, Clone)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<QueuedJob>,
}

impl JobQueue {
    /// Creates the queue; the receiver goes to `spawn_worker`.
    #[must_use]
    pub fn unbounded() -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn submit(&self, request: TrainingRequest) -> Result<(), QueueClosed> {
        debug!(model_id = %request.model_id, "Enqueueing training job");
        self.sender.send(QueuedJob { request }).map_err(|_| QueueClosed)
    }
}
