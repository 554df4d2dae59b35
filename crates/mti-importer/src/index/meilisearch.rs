//! Meilisearch HTTP client

use async_trait::async_trait;
use mti_common::{Document, ImportError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::IndexClient;

/// Default Meilisearch host.
pub const DEFAULT_MEILI_HOST: &str = "http://localhost:7700";

/// Default API key for a local development instance.
pub const DEFAULT_MEILI_API_KEY: &str = "master-key";

/// Default HTTP timeout for a single bulk call.
pub const DEFAULT_MEILI_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct MeiliConfig {
    pub host: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for MeiliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeiliConfig")
            .field("host", &self.host)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for MeiliConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MEILI_HOST.to_string(),
            api_key: Some(DEFAULT_MEILI_API_KEY.to_string()),
            timeout_secs: DEFAULT_MEILI_TIMEOUT_SECS,
        }
    }
}

impl MeiliConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("MEILI_HOST").unwrap_or_else(|| DEFAULT_MEILI_HOST.to_string()),
            api_key: match lookup("MEILI_API_KEY") {
                Some(key) if key.is_empty() => None,
                Some(key) => Some(key),
                None => Some(DEFAULT_MEILI_API_KEY.to_string()),
            },
            timeout_secs: lookup("MEILI_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MEILI_TIMEOUT_SECS),
        }
    }
}

/// Enqueued task returned by the documents endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskInfo {
    task_uid: Option<u64>,
}

pub struct MeiliClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl MeiliClient {
    pub fn new(config: &MeiliConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ImportError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.host.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn documents_url(&self, index: &str) -> String {
        format!("{}/indexes/{}/documents", self.base_url, index)
    }
}

#[async_trait]
impl IndexClient for MeiliClient {
    async fn add_documents(&self, index: &str, documents: &[Document]) -> Result<()> {
        let mut request = self
            .client
            .post(self.documents_url(index))
            .query(&[("primaryKey", "id")])
            .json(documents);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ImportError::index(format!("Request to {} failed: {}", self.base_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImportError::index(format!(
                "Meilisearch returned {}: {}",
                status, body
            )));
        }

        let task: Option<TaskInfo> = response.json().await.ok();
        debug!(
            index,
            documents = documents.len(),
            task_uid = ?task.and_then(|t| t.task_uid),
            "Documents enqueued"
        );

        Ok(())
    }
}
