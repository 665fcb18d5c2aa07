//! Telemetry HTTP Client
//!
//! reqwest client for the game telemetry API. Every request carries the
//! configured timeout; nothing is retried; a failed poll simply waits for
//! the next tick.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::dto::{DataResponse, Snapshot};
use super::{endpoint, TelemetryError, TelemetrySource};

const DATA_PATH: &str = "/api/data";
const CLEAR_PATH: &str = "/api/clear";

/// reqwest-backed telemetry source
#[derive(Debug, Clone)]
pub struct HttpTelemetryClient {
    client: Client,
    timeout: Duration,
}

impl HttpTelemetryClient {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TelemetryError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, TelemetryError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(TelemetryError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl TelemetrySource for HttpTelemetryClient {
    async fn fetch_snapshot(&self, base_url: &str) -> Result<Snapshot, TelemetryError> {
        let url = endpoint(base_url, DATA_PATH)?;
        let response = self.get(&url).await?;
        let text = response.text().await.map_err(classify)?;

        let parsed: DataResponse =
            serde_json::from_str(&text).map_err(|e| TelemetryError::Decode(e.to_string()))?;
        let snapshot = Snapshot::from(parsed);

        tracing::debug!(url = %url, players = snapshot.readings.len(), "Fetched snapshot");
        Ok(snapshot)
    }

    async fn request_reset(&self, base_url: &str) -> Result<(), TelemetryError> {
        let url = endpoint(base_url, CLEAR_PATH)?;
        self.client.get(&url).send().await.map_err(classify)?;
        tracing::debug!(url = %url, "Requested remote reset");
        Ok(())
    }
}

fn classify(e: reqwest::Error) -> TelemetryError {
    if e.is_timeout() {
        TelemetryError::Timeout
    } else if e.is_connect() {
        TelemetryError::Unavailable
    } else {
        TelemetryError::Request(e)
    }
}
