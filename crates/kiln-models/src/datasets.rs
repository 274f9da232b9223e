//! Dataset rows client.
//!
//! Named dataset lookups go through the hub's rows API, which serves dataset
//! contents as paginated JSON rows without a local dataset toolchain.

use crate::error::{HubError, HubResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_ROWS_URL: &str = "https://datasets-server.huggingface.co";

/// Largest page the rows API serves per request.
const PAGE_SIZE: usize = 100;

/// One labeled text row from a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub text: String,
    pub label: i64,
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    rows: Vec<RowEntry>,
    #[serde(default)]
    num_rows_total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row: serde_json::Value,
}

/// Client for the hub's dataset rows API.
#[derive(Debug, Clone)]
pub struct DatasetRowsClient {
    base_url: String,
    client: Client,
}

impl Default for DatasetRowsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetRowsClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_ROWS_URL)
    }

    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, client: Client::new() }
    }

    /// Fetches up to `limit` labeled rows from `dataset`'s train split,
    /// paging through the rows API.
    ///
    /// Rows without a recognizable text field or an integer label are
    /// skipped; a dataset that yields nothing at all is an API-level error
    /// for the caller to classify.
    pub async fn fetch_rows(
        &self,
        dataset: &str,
        config: Option<&str>,
        split: &str,
        limit: usize,
    ) -> HubResult<Vec<DatasetRow>> {
        let mut rows = Vec::new();
        let mut offset = 0usize;

        while rows.len() < limit {
            let length = PAGE_SIZE.min(limit - rows.len());
            let mut request = self
                .client
                .get(format!("{}/rows", self.base_url))
                .query(&[("dataset", dataset), ("split", split)])
                .query(&[("offset", offset), ("length", length)]);
            if let Some(config) = config {
                request = request.query(&[("config", config)]);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let message =
                    response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                return Err(HubError::Api { status: status.as_u16(), message });
            }

            let page: RowsResponse = response.json().await?;
            let page_len = page.rows.len();
            for entry in page.rows {
                if let Some(row) = parse_row(&entry.row) {
                    rows.push(row);
                }
            }

            offset += page_len;
            let exhausted = page_len < length
                || page.num_rows_total.is_some_and(|total| offset as u64 >= total);
            if exhausted {
                break;
            }
        }

        debug!(dataset = %dataset, rows = rows.len(), "Fetched dataset rows");
        Ok(rows)
    }
}

/// Pulls `(text, label)` out of a row. Classification datasets name the text
/// column `text` or `sentence`.
fn parse_row(row: &serde_json::Value) -> Option<DatasetRow> {
    let text = row
        .get("text")
        .or_else(|| row.get("sentence"))
        .and_then(serde_json::Value::as_str)?
        .to_string();
    let label = row.get("label").and_then(serde_json::Value::as_i64)?;
    Some(DatasetRow { text, label })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_accepts_text_and_sentence_columns() {
        let row = serde_json::json!({"text": "good movie", "label": 1});
        assert_eq!(
            parse_row(&row),
            Some(DatasetRow { text: "good movie".to_string(), label: 1 })
        );

        let row = serde_json::json!({"sentence": "bad movie", "label": 0});
        assert_eq!(parse_row(&row).unwrap().label, 0);
    }

    #[test]
    fn test_parse_row_skips_unlabeled_rows() {
        assert!(parse_row(&serde_json::json!({"text": "no label"})).is_none());
        assert!(parse_row(&serde_json::json!({"label": 1})).is_none());
    }

    #[tokio::test]
    async fn test_fetch_rows_pages_until_limit() {
        let mut server = mockito::Server::new_async().await;

        let page: Vec<serde_json::Value> = (0..100)
            .map(|i| serde_json::json!({"row": {"text": format!("row {i}"), "label": i % 2}}))
            .collect();
        let first = server
            .mock("GET", "/rows")
            .match_query(mockito::Matcher::UrlEncoded("offset".into(), "0".into()))
            .with_body(
                serde_json::json!({"rows": page, "num_rows_total": 150}).to_string(),
            )
            .create_async()
            .await;
        let tail: Vec<serde_json::Value> = (100..150)
            .map(|i| serde_json::json!({"row": {"text": format!("row {i}"), "label": i % 2}}))
            .collect();
        let second = server
            .mock("GET", "/rows")
            .match_query(mockito::Matcher::UrlEncoded("offset".into(), "100".into()))
            .with_body(
                serde_json::json!({"rows": tail, "num_rows_total": 150}).to_string(),
            )
            .create_async()
            .await;

        let client = DatasetRowsClient::with_base_url(server.url());
        let rows = client.fetch_rows("imdb", None, "train", 120).await.unwrap();

        assert_eq!(rows.len(), 120);
        assert_eq!(rows[0].text, "row 0");
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_rows_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rows")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .with_body("dataset not found")
            .create_async()
            .await;

        let client = DatasetRowsClient::with_base_url(server.url());
        let result = client.fetch_rows("missing", None, "train", 10).await;
        assert!(matches!(result, Err(HubError::Api { status: 404, .. })));
    }
}
