//! Dataset resolution policies.
//!
//! Exactly one policy applies per request, selected by the raw
//! `dataset_source` string: a named hub lookup, the automatic task-keyed
//! heuristic, or the synthetic fallback.

use crate::error::PipelineError;
use kiln_models::{DatasetRow, DatasetRowsClient};
use kiln_training::{synthetic_dataset, validate_examples, Dataset, LabeledExample, TrainingRequest};
use tracing::{debug, info};

/// Rows fetched for named and auto lookups.
pub const SAMPLE_ROWS: usize = 1000;

const AUTO_CLASSIFICATION_DATASET: &str = "imdb";
const AUTO_FALLBACK_DATASET: &str = "glue";
const AUTO_FALLBACK_CONFIG: &str = "sst2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetPolicy {
    /// Look up `dataset_name` on the hub.
    Named,
    /// Pick a fixed sample dataset keyed by task type.
    Auto,
    /// Fixed synthetic dataset of repeated labeled examples.
    Synthetic,
}

/// Maps the request's `dataset_source` string to a policy. Anything that is
/// not a known registry selector or `auto` falls back to synthetic data.
#[must_use]
pub fn select_policy(dataset_source: &str) -> DatasetPolicy {
    match dataset_source {
        "hub" | "huggingface" => DatasetPolicy::Named,
        "auto" => DatasetPolicy::Auto,
        _ => DatasetPolicy::Synthetic,
    }
}

/// Resolves the training dataset for `request`.
pub async fn resolve_dataset(
    request: &TrainingRequest,
    rows: &DatasetRowsClient,
) -> Result<Dataset, PipelineError> {
    let policy = select_policy(&request.dataset_source);
    debug!(model_id = %request.model_id, policy = ?policy, "Resolving dataset");

    let examples = match policy {
        DatasetPolicy::Named => {
            let name = request.dataset_name.as_deref().ok_or_else(|| {
                PipelineError::Dataset(
                    "dataset_name is required when dataset_source is a registry".to_string(),
                )
            })?;
            fetch(rows, name, None).await?
        }
        DatasetPolicy::Auto => {
            if request.task_type == "classification" {
                fetch(rows, AUTO_CLASSIFICATION_DATASET, None).await?
            } else {
                fetch(rows, AUTO_FALLBACK_DATASET, Some(AUTO_FALLBACK_CONFIG)).await?
            }
        }
        DatasetPolicy::Synthetic => synthetic_dataset(),
    };

    validate_examples(&examples).map_err(|e| PipelineError::Dataset(e.to_string()))?;
    info!(model_id = %request.model_id, examples = examples.len(), "Dataset resolved");
    Ok(examples)
}

async fn fetch(
    rows: &DatasetRowsClient,
    dataset: &str,
    config: Option<&str>,
) -> Result<Dataset, PipelineError> {
    let fetched = rows
        .fetch_rows(dataset, config, "train", SAMPLE_ROWS)
        .await
        .map_err(|e| PipelineError::Dataset(e.to_string()))?;
    Ok(fetched.into_iter().map(to_example).collect())
}

fn to_example(row: DatasetRow) -> LabeledExample {
    LabeledExample { text: row.text, label: row.label }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_training::{ComputeTarget, CreationMode, TrainingHyperParams, TrainingMode};

    fn request(dataset_source: &str, dataset_name: Option<&str>, task_type: &str) -> TrainingRequest {
        TrainingRequest {
            model_id: "m1".to_string(),
            model_name: "Demo".to_string(),
            creation_mode: CreationMode::FineTune,
            training_mode: TrainingMode::Supervised,
            model_description: None,
            model_type: "transformer".to_string(),
            task_type: task_type.to_string(),
            dataset_source: dataset_source.to_string(),
            dataset_name: dataset_name.map(ToString::to_string),
            base_model: None,
            compute_type: ComputeTarget::Cpu,
            hyperparams: TrainingHyperParams::default(),
            hub_token: "hf_test".to_string(),
            advisor_api_key: None,
        }
    }

    #[test]
    fn test_policy_selection() {
        assert_eq!(select_policy("hub"), DatasetPolicy::Named);
        assert_eq!(select_policy("huggingface"), DatasetPolicy::Named);
        assert_eq!(select_policy("auto"), DatasetPolicy::Auto);
        assert_eq!(select_policy("none"), DatasetPolicy::Synthetic);
        assert_eq!(select_policy(""), DatasetPolicy::Synthetic);
        assert_eq!(select_policy("upload"), DatasetPolicy::Synthetic);
    }

    #[tokio::test]
    async fn test_unknown_source_resolves_to_synthetic_fallback() {
        let rows = DatasetRowsClient::with_base_url("http://127.0.0.1:1");
        let dataset = resolve_dataset(&request("none", None, "classification"), &rows)
            .await
            .unwrap();

        assert_eq!(dataset.len(), 1000);
        assert_eq!(dataset.iter().filter(|ex| ex.label == 1).count(), 500);
    }

    #[tokio::test]
    async fn test_named_policy_requires_dataset_name() {
        let rows = DatasetRowsClient::with_base_url("http://127.0.0.1:1");
        let result = resolve_dataset(&request("hub", None, "classification"), &rows).await;
        assert!(matches!(result, Err(PipelineError::Dataset(_))));
    }

    #[tokio::test]
    async fn test_named_policy_fetches_rows_from_registry() {
        let mut server = mockito::Server::new_async().await;
        let rows_json: Vec<serde_json::Value> = (0..10)
            .map(|i| serde_json::json!({"row": {"text": format!("review {i}"), "label": i % 2}}))
            .collect();
        let mock = server
            .mock("GET", "/rows")
            .match_query(mockito::Matcher::UrlEncoded("dataset".into(), "yelp".into()))
            .with_body(serde_json::json!({"rows": rows_json, "num_rows_total": 10}).to_string())
            .create_async()
            .await;

        let rows = DatasetRowsClient::with_base_url(server.url());
        let dataset = resolve_dataset(&request("hub", Some("yelp"), "classification"), &rows)
            .await
            .unwrap();

        assert_eq!(dataset.len(), 10);
        assert_eq!(dataset[0].text, "review 0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_auto_policy_picks_sample_dataset_by_task() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "rows": [{"row": {"text": "an auto sample", "label": 1}}],
            "num_rows_total": 1
        })
        .to_string();
        let imdb = server
            .mock("GET", "/rows")
            .match_query(mockito::Matcher::UrlEncoded("dataset".into(), "imdb".into()))
            .with_body(&body)
            .create_async()
            .await;
        let sst2 = server
            .mock("GET", "/rows")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("dataset".into(), "glue".into()),
                mockito::Matcher::UrlEncoded("config".into(), "sst2".into()),
            ]))
            .with_body(&body)
            .create_async()
            .await;

        let rows = DatasetRowsClient::with_base_url(server.url());
        resolve_dataset(&request("auto", None, "classification"), &rows).await.unwrap();
        resolve_dataset(&request("auto", None, "generation"), &rows).await.unwrap();

        imdb.assert_async().await;
        sst2.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_named_dataset_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rows")
            .match_query(mockito::Matcher::Any)
            .with_body(serde_json::json!({"rows": [], "num_rows_total": 0}).to_string())
            .create_async()
            .await;

        let rows = DatasetRowsClient::with_base_url(server.url());
        let result = resolve_dataset(&request("hub", Some("empty"), "classification"), &rows).await;
        assert!(matches!(result, Err(PipelineError::Dataset(_))));
    }
}
