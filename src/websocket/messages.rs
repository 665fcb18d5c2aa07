//! WebSocket Message Types
//!
//! Defines all message types exchanged between the dashboard page and its
//! session over the `/ws` connection.

use serde::{Deserialize, Serialize};

use crate::resample::{TimeZoneOption, TIME_ZONE_OPTIONS};
use crate::session::{
    ParamsUpdate, RenderUpdate, SessionConfig, SessionEvent, BUCKET_STEP_SECS, MAX_BUCKET_SECS,
    MIN_BUCKET_SECS,
};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start polling
    Start,
    /// Stop polling
    Stop,
    /// Clear local and remote statistics
    Clear,
    /// Redraw from current state
    Refresh,
    /// Change API address, bucket width, zone, selection or auto-include
    SetParams(ParamsUpdate),
    /// Ping for keepalive
    Ping,
}

impl ClientMessage {
    /// The session event this message maps to, if any
    pub fn into_event(self) -> Option<SessionEvent> {
        match self {
            ClientMessage::Start => Some(SessionEvent::Start),
            ClientMessage::Stop => Some(SessionEvent::Stop),
            ClientMessage::Clear => Some(SessionEvent::Clear),
            ClientMessage::Refresh => Some(SessionEvent::Refresh),
            ClientMessage::SetParams(update) => Some(SessionEvent::SetParams(update)),
            ClientMessage::Ping => None,
        }
    }
}

/// Initial control values for the dashboard widgets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardDefaults {
    pub api_url: Option<String>,
    pub bucket_secs: f64,
    pub min_bucket_secs: f64,
    pub max_bucket_secs: f64,
    pub bucket_step_secs: f64,
    pub time_zone: String,
    pub auto_include: bool,
}

impl From<&SessionConfig> for DashboardDefaults {
    fn from(config: &SessionConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            bucket_secs: config.bucket_secs,
            min_bucket_secs: MIN_BUCKET_SECS,
            max_bucket_secs: MAX_BUCKET_SECS,
            bucket_step_secs: BUCKET_STEP_SECS,
            time_zone: config.time_zone.clone(),
            auto_include: config.auto_include,
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Session established
    Connected {
        /// Unique session identifier
        session_id: String,
        /// Starting widget values
        defaults: DashboardDefaults,
        /// Selectable display zones
        time_zones: Vec<TimeZoneOption>,
    },
    /// Redraw instruction
    Render(Box<RenderUpdate>),
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

impl ServerMessage {
    pub fn connected(session_id: &str, config: &SessionConfig) -> Self {
        ServerMessage::Connected {
            session_id: session_id.to_string(),
            defaults: DashboardDefaults::from(config),
            time_zones: TIME_ZONE_OPTIONS.to_vec(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}
