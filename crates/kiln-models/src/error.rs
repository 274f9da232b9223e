use std::path::PathBuf;
use thiserror::Error;

pub type HubResult<T> = std::result::Result<T, HubError>;

/// Errors from the model hub's registry APIs.
#[derive(Debug, Error)]
pub enum HubError {
    /// The local artifact to upload does not exist. Raised before any
    /// transport call is attempted.
    #[error("artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// Upload transport failure (network, auth, quota). Not retried.
    #[error("upload failed: {0}")]
    Upload(String),

    /// Non-success response from a hub API endpoint.
    #[error("hub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
