//! Kiln Training
//!
//! Backend-agnostic training primitives for:
//! - Describing training requests (`TrainingRequest`)
//! - Tracking job phases and status records (`JobStore`)
//! - Representing labeled datasets and the synthetic fallback
//! - Inspecting and digesting checkpoint artifacts
//! - Implementing training backends (`Trainer`)

pub mod artifacts;
pub mod dataset;
pub mod error;
pub mod layout;
pub mod phase;
pub mod progress;
pub mod request;
pub mod status;
pub mod trainer;

pub use artifacts::{inspect_checkpoint, sha256_file, CheckpointFormat, CheckpointInspection};
pub use dataset::{split_holdout, synthetic_dataset, validate_examples, Dataset, LabeledExample};
pub use error::{TrainingError, TrainingResult};
pub use layout::ArtifactLayout;
pub use phase::JobPhase;
pub use progress::{EpochMetrics, ProgressEvent, ProgressSink, StdoutProgressSink};
pub use request::{ComputeTarget, CreationMode, TrainingHyperParams, TrainingMode, TrainingRequest};
pub use status::{JobStatus, JobStore};
pub use trainer::{EvalReport, ModelConfig, PublishTarget, Trainer, DEFAULT_ARCHITECTURE};
