//! Telemetry Source
//!
//! Polling side of the dashboard: fetches cumulative damage snapshots from
//! the game telemetry API and folds them into a session's history.
//!
//! - `client`: reqwest-backed [`HttpTelemetryClient`]
//! - `dto`: wire format of `GET {base}/api/data`
//! - `ingest`: append-on-change folding of a snapshot into [`History`]
//!
//! [`History`]: crate::history::History

mod client;
mod dto;
mod ingest;

pub use client::HttpTelemetryClient;
pub use dto::{PlayerReading, Snapshot};
pub use ingest::{ingest_snapshot, IngestSummary};

use async_trait::async_trait;

/// Where cumulative damage readings come from
///
/// Sessions only talk to this trait, so tests can swap in a scripted source.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch the current cumulative damage of every player
    async fn fetch_snapshot(&self, base_url: &str) -> Result<Snapshot, TelemetryError>;

    /// Ask the source to reset its counters. The response body is ignored.
    async fn request_reset(&self, base_url: &str) -> Result<(), TelemetryError>;
}

/// Errors that can occur while talking to the telemetry API
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid API address: {0:?}")]
    InvalidUrl(String),

    #[error("request timed out")]
    Timeout,

    #[error("telemetry API unavailable")]
    Unavailable,

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Join an operator-supplied base URL with an API path.
///
/// Surrounding whitespace and trailing slashes on the base are ignored.
pub fn endpoint(base_url: &str, path: &str) -> Result<String, TelemetryError> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(TelemetryError::InvalidUrl(base_url.to_string()));
    }
    Ok(format!("{}/{}", base, path.trim_start_matches('/')))
}
