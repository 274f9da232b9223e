//! Local delegate trainer.
//!
//! A deliberately small real trainer: feature-hashed bag-of-words logistic
//! regression optimized by mini-batch SGD. It produces a JSON checkpoint, a
//! config, and a model card, and publishes them through the hub client.

use kiln_models::HubClient;
use kiln_training::{
    validate_examples, ArtifactLayout, ComputeTarget, EpochMetrics, EvalReport, LabeledExample,
    ModelConfig, ProgressEvent, ProgressSink, PublishTarget, Trainer, TrainingError,
    TrainingHyperParams, TrainingResult,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use tracing::{info, warn};

/// Learned binary classification head over hashed bag-of-words features.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinearHead {
    dims: usize,
    weights: Vec<f64>,
    bias: f64,
}

#[derive(Debug, Serialize)]
struct CheckpointFile<'a> {
    base_architecture: &'a str,
    head: &'a LinearHead,
}

#[derive(Default)]
struct TrainerState {
    config: Option<ModelConfig>,
    model: Option<LinearHead>,
    train_metrics: Option<EpochMetrics>,
    eval_report: Option<EvalReport>,
}

pub struct LocalTrainer {
    job_id: String,
    hyperparams: TrainingHyperParams,
    compute: ComputeTarget,
    layout: ArtifactLayout,
    hub: HubClient,
    state: Mutex<TrainerState>,
}

impl LocalTrainer {
    #[must_use]
    pub fn new(
        job_id: impl Into<String>,
        hyperparams: TrainingHyperParams,
        compute: ComputeTarget,
        layout: ArtifactLayout,
        hub: HubClient,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            hyperparams,
            compute,
            layout,
            hub,
            state: Mutex::new(TrainerState::default()),
        }
    }

    fn lock(&self) -> TrainingResult<std::sync::MutexGuard<'_, TrainerState>> {
        self.state
            .lock()
            .map_err(|_| TrainingError::Trainer("trainer state poisoned".to_string()))
    }
}

#[async_trait]
impl Trainer for LocalTrainer {
    fn id(&self) -> &'static str {
        "local-sgd"
    }

    async fn prepare(&self, config: &ModelConfig) -> TrainingResult<()> {
        if config.num_labels != 2 {
            return Err(TrainingError::Trainer(format!(
                "local trainer only supports a binary head, got {} labels",
                config.num_labels
            )));
        }
        if config.max_features == 0 {
            return Err(TrainingError::Trainer("max_features must be >= 1".to_string()));
        }
        if self.compute != ComputeTarget::Cpu {
            warn!(
                job_id = %self.job_id,
                requested = self.compute.as_str(),
                "Requested accelerator is unavailable, running on cpu"
            );
        }

        info!(
            job_id = %self.job_id,
            base_architecture = %config.base_architecture,
            "Prepared model and tokenizer"
        );
        self.lock()?.config = Some(config.clone());
        Ok(())
    }

    async fn train(
        &self,
        dataset: &[LabeledExample],
        sink: &dyn ProgressSink,
    ) -> TrainingResult<()> {
        let config = self
            .lock()?
            .config
            .clone()
            .ok_or_else(|| TrainingError::Trainer("train called before prepare".to_string()))?;
        validate_examples(dataset)?;

        let dims = config.max_features;
        let mut head = LinearHead { dims, weights: vec![0.0; dims], bias: 0.0 };
        let total = self.hyperparams.epochs;
        let batch_size = self.hyperparams.batch_size.max(1) as usize;
        let lr = self.hyperparams.learning_rate;

        sink.on_event(ProgressEvent::Started { job_id: self.job_id.clone() }).await;

        let mut last_metrics = EpochMetrics::default();
        for epoch in 1..=total {
            let order = epoch_order(dataset.len(), epoch);
            let mut loss_sum = 0.0;
            let mut correct = 0usize;

            for chunk in order.chunks(batch_size) {
                let mut gradient: HashMap<usize, f64> = HashMap::new();
                let mut bias_gradient = 0.0;

                for &idx in chunk {
                    let example = &dataset[idx];
                    let features = featurize(&example.text, dims);
                    let prediction = sigmoid(score(&head, &features));
                    let target = if example.label > 0 { 1.0 } else { 0.0 };

                    loss_sum += log_loss(prediction, target);
                    if (prediction >= 0.5) == (target >= 0.5) {
                        correct += 1;
                    }

                    let error = prediction - target;
                    for &(index, value) in &features {
                        *gradient.entry(index).or_insert(0.0) += error * value;
                    }
                    bias_gradient += error;
                }

                let scale = lr / chunk.len() as f64;
                for (index, grad) in gradient {
                    head.weights[index] -= scale * grad;
                }
                head.bias -= scale * bias_gradient;
            }

            last_metrics = EpochMetrics {
                loss: loss_sum / dataset.len() as f64,
                accuracy: correct as f64 / dataset.len() as f64,
            };
            sink.on_event(ProgressEvent::EpochCompleted {
                job_id: self.job_id.clone(),
                epoch,
                total,
                metrics: last_metrics,
            })
            .await;
        }

        sink.on_event(ProgressEvent::Finished { job_id: self.job_id.clone() }).await;

        let mut state = self.lock()?;
        state.model = Some(head);
        state.train_metrics = Some(last_metrics);
        Ok(())
    }

    async fn evaluate(&self, dataset: &[LabeledExample]) -> TrainingResult<EvalReport> {
        let head = self
            .lock()?
            .model
            .clone()
            .ok_or_else(|| TrainingError::Trainer("evaluate called before train".to_string()))?;
        if dataset.is_empty() {
            return Err(TrainingError::Dataset("evaluation dataset is empty".to_string()));
        }

        let mut loss_sum = 0.0;
        let mut correct = 0usize;
        for example in dataset {
            let features = featurize(&example.text, head.dims);
            let prediction = sigmoid(score(&head, &features));
            let target = if example.label > 0 { 1.0 } else { 0.0 };
            loss_sum += log_loss(prediction, target);
            if (prediction >= 0.5) == (target >= 0.5) {
                correct += 1;
            }
        }

        let report = EvalReport {
            eval_loss: loss_sum / dataset.len() as f64,
            eval_accuracy: correct as f64 / dataset.len() as f64,
            eval_examples: dataset.len(),
        };
        self.lock()?.eval_report = Some(report);
        Ok(report)
    }

    async fn publish(&self, target: &PublishTarget) -> TrainingResult<String> {
        let (config, head, train_metrics, eval_report) = {
            let state = self.lock()?;
            let config = state
                .config
                .clone()
                .ok_or_else(|| TrainingError::Trainer("publish called before prepare".to_string()))?;
            let head = state
                .model
                .clone()
                .ok_or_else(|| TrainingError::Trainer("publish called before train".to_string()))?;
            (config, head, state.train_metrics, state.eval_report)
        };

        let job_dir = self.layout.ensure_job_dir(&self.job_id)?;

        let checkpoint =
            CheckpointFile { base_architecture: &config.base_architecture, head: &head };
        let checkpoint_path = self.layout.checkpoint_path(&self.job_id);
        std::fs::write(&checkpoint_path, serde_json::to_string_pretty(&checkpoint)?)?;
        let checkpoint_digest = kiln_training::sha256_file(&checkpoint_path)?;

        let model_config = serde_json::json!({
            "base_architecture": config.base_architecture,
            "num_labels": config.num_labels,
            "max_features": config.max_features,
            "task": "text-classification",
            "framework": "kiln",
        });
        std::fs::write(
            self.layout.config_path(&self.job_id),
            serde_json::to_string_pretty(&model_config)?,
        )?;

        std::fs::write(
            self.layout.model_card_path(&self.job_id),
            model_card(&target.repo_id, &config, &checkpoint_digest, train_metrics, eval_report),
        )?;

        let repo_name = target.repo_id.rsplit('/').next().unwrap_or(&target.repo_id);
        self.hub
            .create_repo(repo_name)
            .await
            .map_err(|e| TrainingError::Trainer(format!("repo creation failed: {e}")))?;
        let url = self
            .hub
            .upload_folder(&job_dir, &target.repo_id)
            .await
            .map_err(|e| TrainingError::Trainer(format!("artifact upload failed: {e}")))?;

        info!(job_id = %self.job_id, url = %url, "Published training artifacts");
        Ok(url)
    }
}

/// Deterministic per-epoch visit order: indices sorted by a hash of
/// `(epoch, idx)`, so every run over the same dataset sees the same
/// shuffles.
fn epoch_order(len: usize, epoch: u32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by_key(|&idx| {
        let mut hasher = DefaultHasher::new();
        (epoch, idx).hash(&mut hasher);
        hasher.finish()
    });
    order
}

/// Hashed bag-of-words features, term frequency normalized by token count.
fn featurize(text: &str, dims: usize) -> Vec<(usize, f64)> {
    let tokens: Vec<String> = text
        .to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    let weight = 1.0 / tokens.len() as f64;
    let mut features: HashMap<usize, f64> = HashMap::new();
    for token in &tokens {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let index = (hasher.finish() % dims as u64) as usize;
        *features.entry(index).or_insert(0.0) += weight;
    }
    features.into_iter().collect()
}

fn score(head: &LinearHead, features: &[(usize, f64)]) -> f64 {
    features.iter().fold(head.bias, |acc, &(index, value)| acc + head.weights[index] * value)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn log_loss(prediction: f64, target: f64) -> f64 {
    let p = prediction.clamp(1e-7, 1.0 - 1e-7);
    -(target * p.ln() + (1.0 - target) * (1.0 - p).ln())
}

fn model_card(
    repo_id: &str,
    config: &ModelConfig,
    checkpoint_digest: &str,
    train_metrics: Option<EpochMetrics>,
    eval_report: Option<EvalReport>,
) -> String {
    let mut card = String::from(
        "---\nlicense: apache-2.0\ntags:\n- kiln\n- text-classification\npipeline_tag: text-classification\n---\n\n",
    );
    card.push_str(&format!("# {repo_id}\n\nTrained and published with Kiln.\n\n"));
    card.push_str("## Model Details\n\n");
    card.push_str(&format!("- **Base architecture**: {}\n", config.base_architecture));
    card.push_str(&format!("- **Labels**: {}\n", config.num_labels));
    card.push_str(&format!("- **Feature space**: {} hashed dimensions\n", config.max_features));
    card.push_str(&format!("- **Checkpoint digest**: sha256:{checkpoint_digest}\n\n"));

    card.push_str("## Metrics\n\n| metric | value |\n|---|---|\n");
    if let Some(metrics) = train_metrics {
        card.push_str(&format!("| train loss | {:.4} |\n", metrics.loss));
        card.push_str(&format!("| train accuracy | {:.4} |\n", metrics.accuracy));
    }
    if let Some(report) = eval_report {
        card.push_str(&format!("| eval loss | {:.4} |\n", report.eval_loss));
        card.push_str(&format!("| eval accuracy | {:.4} |\n", report.eval_accuracy));
    }
    card
}
