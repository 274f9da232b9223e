use crate::dataset::LabeledExample;
use crate::error::TrainingResult;
use crate::progress::ProgressSink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Base architecture used for the from-scratch path when no base model is
/// given.
pub const DEFAULT_ARCHITECTURE: &str = "distilbert-base-uncased";

/// Resolved tokenizer/model pair for a job.
///
/// `base_architecture` is the provenance reference recorded in the published
/// config; the backend decides how much of it is actually loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub base_architecture: String,
    pub num_labels: u32,
    /// Feature-hashing dimensionality for bag-of-words backends.
    pub max_features: usize,
}

impl ModelConfig {
    /// Config for the fine-tune path: start from the caller's base model.
    #[must_use]
    pub fn fine_tune(base_model: impl Into<String>) -> Self {
        Self { base_architecture: base_model.into(), num_labels: 2, max_features: 4096 }
    }

    /// Config for the from-scratch path: the fixed default architecture.
    #[must_use]
    pub fn from_scratch() -> Self {
        Self::fine_tune(DEFAULT_ARCHITECTURE)
    }
}

/// Where a trainer publishes its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    /// Account-qualified repository id, e.g. `user/sentiment-demo-17123`.
    pub repo_id: String,
}

/// Evaluation results merged into the job metrics under `final`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EvalReport {
    pub eval_loss: f64,
    pub eval_accuracy: f64,
    pub eval_examples: usize,
}

/// The delegate trainer: an opaque capability that performs the actual
/// optimization loop, evaluation, and artifact publication.
#[async_trait]
pub trait Trainer: Send + Sync {
    fn id(&self) -> &'static str;

    /// Resolves the tokenizer/model pair. Failures here are model
    /// preparation errors, distinct from training failures.
    async fn prepare(&self, config: &ModelConfig) -> TrainingResult<()>;

    /// Runs the optimization loop, reporting one `EpochCompleted` event per
    /// epoch through `sink`.
    async fn train(
        &self,
        dataset: &[LabeledExample],
        sink: &dyn ProgressSink,
    ) -> TrainingResult<()>;

    /// Evaluates the trained model on a held-out dataset.
    async fn evaluate(&self, dataset: &[LabeledExample]) -> TrainingResult<EvalReport>;

    /// Publishes trained artifacts to `target` and returns the result URL.
    async fn publish(&self, target: &PublishTarget) -> TrainingResult<String>;
}
