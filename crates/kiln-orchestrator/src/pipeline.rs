//! The job pipeline.
//!
//! `run_job` drives one training job through the forward-only phase sequence,
//! updating the job store at every transition. It returns the published model
//! URL; the worker is the single failure boundary that turns an `Err` into
//! the job's terminal `failed` status.

use crate::advisor;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::local_trainer::LocalTrainer;
use crate::resolve;

use kiln_models::{slugify, CompletionClient, DatasetRowsClient, HubClient};
use kiln_training::{
    split_holdout, ArtifactLayout, CreationMode, JobPhase, JobStore, ModelConfig, ProgressEvent,
    ProgressSink, PublishTarget, Trainer, TrainingRequest,
};

use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Fraction of the dataset held out for evaluation (1 in `HOLDOUT`).
const HOLDOUT: usize = 5;

/// Progress sink that records trainer callbacks on the job's status record.
pub struct StoreProgressSink {
    store: JobStore,
}

impl StoreProgressSink {
    #[must_use]
    pub fn new(store: JobStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProgressSink for StoreProgressSink {
    async fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::EpochCompleted { job_id, epoch, metrics, .. } => {
                self.store.update(&job_id, |status| status.record_epoch(epoch, metrics)).await;
            }
            ProgressEvent::Message { job_id, message } => {
                self.store.update(&job_id, |status| status.log(message)).await;
            }
            ProgressEvent::Started { job_id } | ProgressEvent::Finished { job_id } => {
                debug!(job_id = %job_id, "Trainer lifecycle event");
            }
        }
    }
}

/// Runs one training job to completion and returns the published model URL.
///
/// The job's status record must already exist (the submission handler
/// creates it). Every phase transition and log line lands in the store
/// before the phase's work begins, so pollers always see the current phase.
pub async fn run_job(
    request: &TrainingRequest,
    store: &JobStore,
    config: &PipelineConfig,
) -> Result<String, PipelineError> {
    let model_id = &request.model_id;

    // Advisory analysis, only on the from-scratch path with a description
    // and a credential. Failures are logged on the job and never fatal.
    if request.creation_mode == CreationMode::FromScratch
        && request.model_description.is_some()
        && request.advisor_api_key.is_some()
    {
        store
            .update(model_id, |status| {
                status.advance(JobPhase::Analyzing);
                status.log("Analyzing dataset and model requirements...");
            })
            .await;

        let api_key = request.advisor_api_key.as_deref().unwrap_or_default();
        let advisor_client = CompletionClient::with_api_key(api_key, &config.advisor_base_url);
        match advisor::analyze_description(&advisor_client, &config.advisor_model, request).await {
            Ok(analysis) => {
                store
                    .update(model_id, |status| {
                        status.log(format!("AI Analysis: {analysis}"));
                        status.ai_analysis = Some(analysis);
                    })
                    .await;
            }
            Err(e) => {
                warn!(model_id = %model_id, error = %e, "Advisory analysis failed");
                store.update(model_id, |status| status.log(format!("AI analysis failed: {e}"))).await;
            }
        }
    }

    store
        .update(model_id, |status| {
            status.advance(JobPhase::LoadingDataset);
            status.log(format!(
                "Loading dataset: {}",
                request.dataset_name.as_deref().unwrap_or(&request.dataset_source)
            ));
        })
        .await;
    let rows_client = DatasetRowsClient::with_base_url(&config.rows_base_url);
    let dataset = resolve::resolve_dataset(request, &rows_client).await?;
    let (train_set, eval_set) = split_holdout(&dataset, HOLDOUT);

    store
        .update(model_id, |status| {
            status.advance(JobPhase::PreparingModel);
            status.log("Preparing model and tokenizer...");
        })
        .await;
    // The advisory analysis never feeds this choice: fine-tune uses the
    // caller's base model, everything else the fixed default architecture.
    let model_config = match (&request.creation_mode, &request.base_model) {
        (CreationMode::FineTune, Some(base_model)) => ModelConfig::fine_tune(base_model.as_str()),
        _ => ModelConfig::from_scratch(),
    };
    let hub = HubClient::with_base_url(&request.hub_token, &config.hub_base_url);
    let trainer = LocalTrainer::new(
        model_id.clone(),
        request.hyperparams,
        request.compute_type,
        ArtifactLayout::for_workspace_root(&config.workspace_root),
        hub.clone(),
    );
    trainer
        .prepare(&model_config)
        .await
        .map_err(|e| PipelineError::ModelPreparation(e.to_string()))?;

    store
        .update(model_id, |status| {
            status.advance(JobPhase::Training);
            status.log("Starting training...");
        })
        .await;
    let sink = StoreProgressSink::new(store.clone());
    trainer.train(&train_set, &sink).await?;

    store
        .update(model_id, |status| {
            status.advance(JobPhase::Evaluating);
            status.log("Evaluating model...");
        })
        .await;
    let report = trainer.evaluate(&eval_set).await?;
    let final_metrics = serde_json::to_value(report).map_err(kiln_training::TrainingError::from)?;
    store.update(model_id, |status| {
        status.metrics.insert("final".to_string(), final_metrics);
    })
    .await;

    store
        .update(model_id, |status| {
            status.advance(JobPhase::Deploying);
            status.log("Pushing model to the hub...");
        })
        .await;
    let identity = hub.whoami().await?;
    let repo_name = format!("{}-{}", slugify(&request.model_name), chrono::Utc::now().timestamp());
    let repo_id = format!("{}/{}", identity.name, repo_name);
    let url = trainer
        .publish(&PublishTarget { repo_id })
        .await
        .map_err(|e| PipelineError::Publish(e.to_string()))?;

    store.update(model_id, |status| status.complete(&url)).await;
    info!(model_id = %model_id, url = %url, "Training job completed");
    Ok(url)
}
