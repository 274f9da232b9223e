//! Model hub registry client.
//!
//! Covers the three registry operations Kiln needs: resolving the
//! authenticated identity, creating model repositories, and uploading
//! artifact files or folders.

use crate::error::{HubError, HubResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";

/// Authenticated account as reported by the hub.
#[derive(Debug, Clone, Deserialize)]
pub struct HubIdentity {
    pub name: String,
}

#[derive(Debug, Serialize)]
struct CreateRepoRequest<'a> {
    #[serde(rename = "type")]
    repo_type: &'a str,
    name: &'a str,
    private: bool,
}

/// Client for the model hub's registry API.
#[derive(Debug, Clone)]
pub struct HubClient {
    token: String,
    base_url: String,
    client: Client,
}

impl HubClient {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_HUB_URL)
    }

    /// Points the client at a different hub deployment (or a test server).
    #[must_use]
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { token: token.into(), base_url, client: Client::new() }
    }

    /// Deterministic public URL for a repository on this hub.
    #[must_use]
    pub fn repo_url(&self, repo_id: &str) -> String {
        format!("{}/{}", self.base_url, repo_id)
    }

    /// Resolves the account behind the configured token.
    pub async fn whoami(&self) -> HubResult<HubIdentity> {
        let url = format!("{}/api/whoami-v2", self.base_url);
        let response = self.client.get(&url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, "Hub identity lookup failed");
            return Err(HubError::Api { status: status.as_u16(), message });
        }
        Ok(response.json::<HubIdentity>().await?)
    }

    /// Creates a public model repository. A repository that already exists
    /// is treated as success, so deploys are idempotent.
    pub async fn create_repo(&self, repo_name: &str) -> HubResult<()> {
        let url = format!("{}/api/repos/create", self.base_url);
        let body = CreateRepoRequest { repo_type: "model", name: repo_name, private: false };
        let response =
            self.client.post(&url).bearer_auth(&self.token).json(&body).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!(repo_name = %repo_name, "Created hub repository");
            return Ok(());
        }

        let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        if status.as_u16() == 409 || message.to_lowercase().contains("already") {
            debug!(repo_name = %repo_name, "Hub repository already exists");
            return Ok(());
        }
        error!(status = %status, repo_name = %repo_name, "Failed to create hub repository");
        Err(HubError::Api { status: status.as_u16(), message })
    }

    /// Uploads a single local file into `repo_id` under `path_in_repo` and
    /// returns the repository URL.
    ///
    /// A missing local file fails before any transport call.
    pub async fn upload_file(
        &self,
        path: &Path,
        repo_id: &str,
        path_in_repo: &str,
    ) -> HubResult<String> {
        if !path.exists() {
            return Err(HubError::ArtifactNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        self.upload_bytes(repo_id, path_in_repo, bytes).await?;
        Ok(self.repo_url(repo_id))
    }

    /// Uploads every regular file under `folder` into `repo_id`, keeping
    /// relative paths, and returns the repository URL.
    pub async fn upload_folder(&self, folder: &Path, repo_id: &str) -> HubResult<String> {
        if !folder.exists() {
            return Err(HubError::ArtifactNotFound(folder.to_path_buf()));
        }

        for entry in WalkDir::new(folder).sort_by_file_name() {
            let entry = entry.map_err(|e| HubError::Upload(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(folder)
                .map_err(|e| HubError::Upload(e.to_string()))?
                .to_string_lossy()
                .replace('\\', "/");
            let bytes = std::fs::read(entry.path())?;
            self.upload_bytes(repo_id, &relative, bytes).await?;
        }
        Ok(self.repo_url(repo_id))
    }

    async fn upload_bytes(
        &self,
        repo_id: &str,
        path_in_repo: &str,
        bytes: Vec<u8>,
    ) -> HubResult<()> {
        let url = format!("{}/api/repos/{}/upload/{}", self.base_url, repo_id, path_in_repo);
        debug!(repo_id = %repo_id, path_in_repo = %path_in_repo, bytes = bytes.len(), "Uploading file to hub");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, path_in_repo = %path_in_repo, "Upload transport failure");
                HubError::Upload(format!("Network error: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, path_in_repo = %path_in_repo, "Hub rejected upload");
            return Err(HubError::Upload(format!("({status}): {message}")));
        }
        Ok(())
    }
}

/// Normalizes a display name into a hub repository slug: lowercase with
/// every run of other characters collapsed to `-`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            slug.push(ch);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_lowercases_and_collapses() {
        assert_eq!(slugify("Sentiment Demo"), "sentiment-demo");
        assert_eq!(slugify("My_Model v2!"), "my-model-v2");
        assert_eq!(slugify("--edge--"), "edge");
    }

    #[test]
    fn test_repo_url_is_deterministic() {
        let client = HubClient::with_base_url("t", "https://hub.example/");
        assert_eq!(client.repo_url("user/model"), "https://hub.example/user/model");
    }
}
