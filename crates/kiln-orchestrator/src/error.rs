use kiln_models::HubError;
use kiln_training::TrainingError;
use thiserror::Error;

/// Failure of a job pipeline run.
///
/// Each variant names the phase family that failed; the worker converts any
/// of them into the job's terminal `failed` status, so nothing here escapes
/// to HTTP callers.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("model preparation error: {0}")]
    ModelPreparation(String),

    #[error("training failure: {0}")]
    Training(#[from] TrainingError),

    #[error("publish error: {0}")]
    Publish(String),
}

impl From<HubError> for PipelineError {
    fn from(err: HubError) -> Self {
        Self::Publish(err.to_string())
    }
}
