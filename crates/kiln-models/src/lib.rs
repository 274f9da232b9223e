//! Kiln Models
//!
//! HTTP clients for the external services Kiln orchestrates against:
//! - `HubClient`: the model hub's repo, upload, and identity APIs
//! - `DatasetRowsClient`: the hub's dataset rows API for named lookups
//! - `CompletionClient`: an OpenAI-compatible chat completion API used for
//!   advisory analysis

pub mod completion;
pub mod datasets;
pub mod error;
pub mod hub;

pub use completion::{ChatMessage, CompletionClient, CompletionError};
pub use datasets::{DatasetRow, DatasetRowsClient};
pub use error::{HubError, HubResult};
pub use hub::{slugify, HubClient, HubIdentity, DEFAULT_HUB_URL};
