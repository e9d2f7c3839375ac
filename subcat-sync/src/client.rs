//! TripSit dataset client
//!
//! Fetches the secondary-source dataset over HTTP. Any transport failure,
//! non-2xx response or non-object body is fatal to the sync pass.

use crate::error::SyncError;
use crate::source::SourceDataset;
use std::time::Duration;

const USER_AGENT: &str = concat!("subcat-sync/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the secondary-source dataset
pub struct TripSitClient {
    http_client: reqwest::Client,
    url: String,
    timeout_secs: u64,
}

impl TripSitClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, SyncError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
            timeout_secs,
        })
    }

    /// Download and parse the full dataset
    pub async fn fetch_dataset(&self) -> Result<SourceDataset, SyncError> {
        tracing::debug!(url = %self.url, "Fetching secondary-source dataset");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SyncError::Status(status.as_u16(), error_text));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let dataset = SourceDataset::from_slice(&bytes)?;

        tracing::info!(entries = dataset.len(), "Fetched secondary-source dataset");
        Ok(dataset)
    }

    fn transport_error(&self, e: reqwest::Error) -> SyncError {
        if e.is_timeout() {
            SyncError::Timeout(self.timeout_secs)
        } else {
            SyncError::Network(e.to_string())
        }
    }
}
