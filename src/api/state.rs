//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::session::{SessionConfig, SessionRegistry};
use crate::telemetry::TelemetrySource;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Telemetry source handed to every new session
    pub source: Arc<dyn TelemetrySource>,
    /// Live dashboard sessions
    pub sessions: Arc<SessionRegistry>,
    /// Defaults for new sessions
    pub session_config: Arc<SessionConfig>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        session_config: SessionConfig,
        config: ApiConfig,
    ) -> Self {
        Self {
            source,
            sessions: Arc::new(SessionRegistry::new(config.max_sessions)),
            session_config: Arc::new(session_config),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Number of live dashboard sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.count().await
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum concurrent dashboard sessions
    pub max_sessions: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8050,
            max_sessions: 100,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
