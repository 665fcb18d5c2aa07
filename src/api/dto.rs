//! Data Transfer Objects
//!
//! Response types for the REST endpoints. Dashboard traffic itself goes
//! over the WebSocket; see [`crate::websocket`].

use serde::Serialize;

use crate::session::SessionInfo;
use crate::websocket::DashboardDefaults;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "saturated"
    pub status: String,
    /// Live dashboard sessions
    pub active_sessions: usize,
    /// Session limit
    pub max_sessions: usize,
    /// Seconds since start
    pub uptime_seconds: u64,
    /// Crate version
    pub version: String,
}

/// Session list response
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
    pub total: usize,
}

/// Event accepted for a session
#[derive(Debug, Serialize)]
pub struct EventAcceptedResponse {
    /// Always "accepted"
    pub status: String,
    pub session_id: String,
}

/// Widget defaults for new dashboards
#[derive(Debug, Serialize)]
pub struct DefaultsResponse {
    #[serde(flatten)]
    pub defaults: DashboardDefaults,
    pub poll_interval_ms: u64,
}
