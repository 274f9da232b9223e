//! Background job worker.
//!
//! A single consumer loop takes queued jobs and spawns one independent task
//! per job, so concurrent jobs interleave freely and never block status
//! queries. The loop is also the pipeline's single failure boundary: any
//! error from `run_job` becomes the job's terminal `failed` status.

use crate::config::PipelineConfig;
use crate::pipeline;
use crate::queue::JobReceiver;
use kiln_training::JobStore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Spawns the worker loop. The handle resolves when the queue closes.
pub fn spawn_worker(
    mut receiver: JobReceiver,
    store: JobStore,
    config: PipelineConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = receiver.recv().await {
            let store = store.clone();
            let config = config.clone();
            tokio::spawn(async move {
                let model_id = job.request.model_id.clone();
                info!(model_id = %model_id, "Starting training job");
                if let Err(e) = pipeline::run_job(&job.request, &store, &config).await {
                    error!(model_id = %model_id, error = %e, "Training job failed");
                    store.update(&model_id, |status| status.fail(e.to_string())).await;
                }
            });
        }
        debug!("Job queue closed, worker exiting");
    })
}
