use crate::phase::JobPhase;
use crate::progress::EpochMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Mutable status record for one training job.
///
/// Written only by the job's orchestrator run; read by arbitrarily many
/// status queries. Progress is monotonically non-decreasing and the log list
/// never shrinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub model_id: String,
    pub status: JobPhase,
    pub progress: f64,
    pub current_epoch: u32,
    pub total_epochs: u32,
    pub metrics: HashMap<String, serde_json::Value>,
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    #[must_use]
    pub fn new(model_id: impl Into<String>, total_epochs: u32) -> Self {
        Self {
            model_id: model_id.into(),
            status: JobPhase::Initializing,
            progress: 0.0,
            current_epoch: 0,
            total_epochs,
            metrics: HashMap::new(),
            logs: Vec::new(),
            ai_analysis: None,
            hub_url: None,
            error: None,
        }
    }

    /// Moves the record to `phase` if the transition is forward; invalid
    /// transitions are dropped with a warning rather than corrupting the
    /// record.
    pub fn advance(&mut self, phase: JobPhase) {
        if self.status.can_advance_to(phase) {
            debug!(model_id = %self.model_id, from = %self.status, to = %phase, "Phase transition");
            self.status = phase;
        } else {
            warn!(
                model_id = %self.model_id,
                from = %self.status,
                to = %phase,
                "Dropping invalid phase transition"
            );
        }
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }

    /// Raises progress to `value` (clamped to [0, 100]); lower values are
    /// ignored so progress never moves backward.
    pub fn set_progress(&mut self, value: f64) {
        let clamped = value.clamp(0.0, 100.0);
        if clamped > self.progress {
            self.progress = clamped;
        }
    }

    /// Records a completed epoch: counter, derived progress percentage, and
    /// the latest metric snapshot.
    pub fn record_epoch(&mut self, epoch: u32, metrics: EpochMetrics) {
        self.current_epoch = epoch;
        if self.total_epochs > 0 {
            self.set_progress(f64::from(epoch) / f64::from(self.total_epochs) * 100.0);
        }
        self.metrics.insert("loss".to_string(), serde_json::json!(metrics.loss));
        self.metrics.insert("accuracy".to_string(), serde_json::json!(metrics.accuracy));
        self.log(format!("Epoch {epoch}/{} - Loss: {:.4}", self.total_epochs, metrics.loss));
    }

    /// Terminal success: progress 100 and the result URL.
    pub fn complete(&mut self, hub_url: impl Into<String>) {
        let url = hub_url.into();
        self.advance(JobPhase::Completed);
        self.progress = 100.0;
        self.log(format!("Training completed! Model available at: {url}"));
        self.hub_url = Some(url);
    }

    /// Terminal failure: error recorded, progress left at its last value.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.advance(JobPhase::Failed);
        self.log(format!("Error: {message}"));
        self.error = Some(message);
    }
}

/// Process-wide mapping from job id to status record.
///
/// Cloning shares the underlying map. Lifetime is the process lifetime;
/// records are never evicted.
#[derive(Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
}

impl fmt::Debug for JobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobStore")
            .field("job_count", &self.jobs.try_read().map(|jobs| jobs.len()).unwrap_or(0))
            .finish_non_exhaustive()
    }
}

impl JobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates (or overwrites) the record for `model_id`. Overwriting is
    /// acceptable: the orchestrator creates exactly once per submission.
    pub async fn create(&self, model_id: &str, total_epochs: u32) {
        let mut jobs = self.jobs.write().await;
        if jobs.insert(model_id.to_string(), JobStatus::new(model_id, total_epochs)).is_some() {
            warn!(model_id = %model_id, "Replacing existing job record");
        }
    }

    /// Applies `mutate` to the record under the write lock, so readers never
    /// observe a partially updated record. Unknown ids are a logged no-op.
    pub async fn update<F>(&self, model_id: &str, mutate: F)
    where
        F: FnOnce(&mut JobStatus),
    {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(model_id) {
            Some(status) => mutate(status),
            None => warn!(model_id = %model_id, "Update for unknown job dropped"),
        }
    }

    pub async fn get(&self, model_id: &str) -> Option<JobStatus> {
        let jobs = self.jobs.read().await;
        jobs.get(model_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get_returns_initializing_record() {
        let store = JobStore::new();
        store.create("m1", 3).await;

        let status = store.get("m1").await.unwrap();
        assert_eq!(status.status, JobPhase::Initializing);
        assert_eq!(status.total_epochs, 3);
        assert!(status.logs.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let store = JobStore::new();
        assert!(store.get("ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_create_overwrites_prior_record() {
        let store = JobStore::new();
        store.create("m1", 3).await;
        store.update("m1", |status| status.log("old run")).await;
        store.create("m1", 5).await;

        let status = store.get("m1").await.unwrap();
        assert_eq!(status.total_epochs, 5);
        assert!(status.logs.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let store = JobStore::new();
        store.update("ghost", |status| status.progress = 50.0).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let store = JobStore::new();
        store.create("m1", 4).await;
        store.update("m1", |status| status.record_epoch(2, EpochMetrics::default())).await;
        store.update("m1", |status| status.set_progress(10.0)).await;

        let status = store.get("m1").await.unwrap();
        assert!((status.progress - 50.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_record_epoch_formats_log_line() {
        let store = JobStore::new();
        store.create("m1", 2).await;
        store
            .update("m1", |status| {
                status.advance(JobPhase::Training);
                status.record_epoch(1, EpochMetrics { loss: 0.69314, accuracy: 0.5 });
            })
            .await;

        let status = store.get("m1").await.unwrap();
        assert_eq!(status.logs.last().unwrap(), "Epoch 1/2 - Loss: 0.6931");
        assert_eq!(status.current_epoch, 1);
    }

    #[tokio::test]
    async fn test_fail_keeps_progress_and_records_error() {
        let store = JobStore::new();
        store.create("m1", 4).await;
        store
            .update("m1", |status| {
                status.advance(JobPhase::Training);
                status.record_epoch(1, EpochMetrics::default());
                status.fail("trainer exploded");
            })
            .await;

        let status = store.get("m1").await.unwrap();
        assert_eq!(status.status, JobPhase::Failed);
        assert_eq!(status.error.as_deref(), Some("trainer exploded"));
        assert!((status.progress - 25.0).abs() < f64::EPSILON);
        assert_eq!(status.logs.last().unwrap(), "Error: trainer exploded");
    }

    #[tokio::test]
    async fn test_complete_sets_progress_to_100() {
        let store = JobStore::new();
        store.create("m1", 1).await;
        store
            .update("m1", |status| {
                status.advance(JobPhase::Deploying);
                status.complete("https://hub.example/user/m1-repo");
            })
            .await;

        let status = store.get("m1").await.unwrap();
        assert_eq!(status.status, JobPhase::Completed);
        assert!((status.progress - 100.0).abs() < f64::EPSILON);
        assert!(status.hub_url.unwrap().contains("m1-repo"));
    }
}
