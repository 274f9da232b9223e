use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};

/// Whether a job refines an existing model or starts from the default
/// architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreationMode {
    FineTune,
    FromScratch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingMode {
    Supervised,
    Unsupervised,
    Reinforcement,
}

impl TrainingMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supervised => "supervised",
            Self::Unsupervised => "unsupervised",
            Self::Reinforcement => "reinforcement",
        }
    }
}

/// Requested compute device. The local trainer only runs on cpu; anything
/// else is honored as a logged downgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeTarget {
    Cpu,
    Gpu,
    Tpu,
}

impl ComputeTarget {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
            Self::Tpu => "tpu",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainingHyperParams {
    #[serde(default = "default_epochs")]
    pub epochs: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

const fn default_epochs() -> u32 {
    3
}

const fn default_batch_size() -> u32 {
    8
}

const fn default_learning_rate() -> f64 {
    2e-5
}

impl Default for TrainingHyperParams {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
        }
    }
}

impl TrainingHyperParams {
    pub fn validate(&self) -> TrainingResult<()> {
        if self.epochs == 0 {
            return Err(TrainingError::InvalidRequest("epochs must be >= 1".to_string()));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainingError::InvalidRequest("learning_rate must be > 0".to_string()));
        }
        if self.batch_size == 0 {
            return Err(TrainingError::InvalidRequest("batch_size must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// A training-and-publish request as submitted to `POST /train`.
///
/// Immutable once submitted; the orchestrator reads it, never writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRequest {
    /// Caller-supplied job identifier. One status record per id.
    pub model_id: String,
    /// Display name; slugified for the hub repository.
    pub model_name: String,
    pub creation_mode: CreationMode,
    pub training_mode: TrainingMode,
    /// Free-text description; feeds the advisory analysis only.
    #[serde(default)]
    pub model_description: Option<String>,
    pub model_type: String,
    pub task_type: String,
    /// Dataset policy selector: `hub` (named lookup), `auto`, anything else
    /// falls back to the synthetic dataset.
    pub dataset_source: String,
    #[serde(default)]
    pub dataset_name: Option<String>,
    /// Base model reference for the fine-tune path.
    #[serde(default)]
    pub base_model: Option<String>,
    pub compute_type: ComputeTarget,
    #[serde(flatten)]
    pub hyperparams: TrainingHyperParams,
    /// Hub write credential, passed per request, never read from the
    /// environment.
    pub hub_token: String,
    /// Secondary-service credential for the advisory analysis.
    #[serde(default)]
    pub advisor_api_key: Option<String>,
}

impl TrainingRequest {
    pub fn validate(&self) -> TrainingResult<()> {
        if self.model_id.trim().is_empty() {
            return Err(TrainingError::InvalidRequest("model_id is required".to_string()));
        }
        if self.model_name.trim().is_empty() {
            return Err(TrainingError::InvalidRequest("model_name is required".to_string()));
        }
        if self.hub_token.trim().is_empty() {
            return Err(TrainingError::InvalidRequest("hub_token is required".to_string()));
        }
        self.hyperparams.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_json() -> serde_json::Value {
        serde_json::json!({
            "model_id": "m1",
            "model_name": "Sentiment Demo",
            "creation_mode": "fine-tune",
            "training_mode": "supervised",
            "model_type": "transformer",
            "task_type": "classification",
            "dataset_source": "none",
            "compute_type": "cpu",
            "hub_token": "hf_test"
        })
    }

    #[test]
    fn test_deserializes_with_hyperparameter_defaults() {
        let request: TrainingRequest = serde_json::from_value(request_json()).unwrap();
        assert_eq!(request.hyperparams.epochs, 3);
        assert_eq!(request.hyperparams.batch_size, 8);
        assert!((request.hyperparams.learning_rate - 2e-5).abs() < f64::EPSILON);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_creation_mode_uses_kebab_case() {
        let mut json = request_json();
        json["creation_mode"] = "from-scratch".into();
        let request: TrainingRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.creation_mode, CreationMode::FromScratch);
    }

    #[test]
    fn test_validate_rejects_zero_epochs() {
        let mut json = request_json();
        json["epochs"] = 0.into();
        let request: TrainingRequest = serde_json::from_value(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_learning_rate() {
        let mut json = request_json();
        json["learning_rate"] = (-1.0).into();
        let request: TrainingRequest = serde_json::from_value(json).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_requires_identifiers() {
        let mut json = request_json();
        json["model_id"] = "  ".into();
        let request: TrainingRequest = serde_json::from_value(json).unwrap();
        assert!(request.validate().is_err());
    }
}
