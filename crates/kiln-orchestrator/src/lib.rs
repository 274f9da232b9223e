//! Kiln Orchestrator
//!
//! Drives one training job from submission to a published model:
//! - `run_job`: the forward-only phase pipeline
//! - dataset resolution policies (named lookup, auto heuristic, synthetic)
//! - the advisory description analysis step
//! - `LocalTrainer`: the shipped delegate trainer backend
//! - `JobQueue` + `spawn_worker`: explicit fire-and-forget execution

pub mod advisor;
pub mod config;
pub mod error;
pub mod local_trainer;
pub mod pipeline;
pub mod queue;
pub mod resolve;
pub mod worker;

pub use advisor::{analysis_prompt, analyze_description};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use local_trainer::LocalTrainer;
pub use pipeline::{run_job, StoreProgressSink};
pub use queue::{JobQueue, JobReceiver, QueueClosed, QueuedJob};
pub use resolve::{resolve_dataset, select_policy, DatasetPolicy, SAMPLE_ROWS};
pub use worker::spawn_worker;
