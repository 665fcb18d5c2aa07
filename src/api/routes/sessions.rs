//! Session Routes
//!
//! Read-only views of the dashboard setup plus out-of-band control of live
//! sessions (e.g. starting or clearing a wall display from a script).
//!
//! - GET /api/v1/time-zones - Selectable display zones
//! - GET /api/v1/defaults - Widget defaults for new dashboards
//! - GET /api/v1/sessions - List live sessions
//! - GET /api/v1/sessions/:id - Get one session
//! - POST /api/v1/sessions/:id/events - Queue an event for a session

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{DefaultsResponse, EventAcceptedResponse, SessionListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::resample::{TimeZoneOption, TIME_ZONE_OPTIONS};
use crate::session::SessionInfo;
use crate::websocket::{ClientMessage, DashboardDefaults};

/// GET /api/v1/time-zones
pub async fn list_time_zones() -> Json<Vec<TimeZoneOption>> {
    Json(TIME_ZONE_OPTIONS.to_vec())
}

/// GET /api/v1/defaults
pub async fn get_defaults(State(state): State<Arc<AppState>>) -> Json<DefaultsResponse> {
    Json(DefaultsResponse {
        defaults: DashboardDefaults::from(state.session_config.as_ref()),
        poll_interval_ms: state.session_config.poll_interval.as_millis() as u64,
    })
}

/// GET /api/v1/sessions
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<SessionListResponse> {
    let sessions = state.sessions.list().await;
    Json(SessionListResponse {
        total: sessions.len(),
        sessions,
    })
}

/// GET /api/v1/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionInfo>> {
    state
        .sessions
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Session '{}'", id)))
}

/// POST /api/v1/sessions/:id/events
///
/// Body uses the WebSocket client message format, e.g. `{"type": "start"}`.
/// The session's dashboard sees the resulting redraw.
pub async fn post_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(message): Json<ClientMessage>,
) -> ApiResult<(StatusCode, Json<EventAcceptedResponse>)> {
    let event = message
        .into_event()
        .ok_or_else(|| ApiError::Validation("ping is only supported over the WebSocket".to_string()))?;

    state.sessions.send(&id, event).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(EventAcceptedResponse {
            status: "accepted".to_string(),
            session_id: id,
        }),
    ))
}
