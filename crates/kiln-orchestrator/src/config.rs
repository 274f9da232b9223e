use kiln_models::hub::DEFAULT_HUB_URL;
use kiln_models::datasets::DEFAULT_ROWS_URL;
use std::path::PathBuf;

/// Chat model used for advisory analysis.
pub const DEFAULT_ADVISOR_MODEL: &str = "llama-3.1-8b-instant";

const DEFAULT_ADVISOR_URL: &str = "https://api.groq.com/openai/v1";

/// Endpoints and filesystem roots a pipeline run talks to.
///
/// Every external surface is a field so tests can point a run at local mock
/// servers and a scratch directory.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub hub_base_url: String,
    pub rows_base_url: String,
    pub advisor_base_url: String,
    pub advisor_model: String,
    /// Root under which `.kiln/artifacts/<job_id>/` directories are created.
    pub workspace_root: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hub_base_url: DEFAULT_HUB_URL.to_string(),
            rows_base_url: DEFAULT_ROWS_URL.to_string(),
            advisor_base_url: DEFAULT_ADVISOR_URL.to_string(),
            advisor_model: DEFAULT_ADVISOR_MODEL.to_string(),
            workspace_root: PathBuf::from("."),
        }
    }
}
