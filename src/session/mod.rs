//! Dashboard Sessions
//!
//! A session is one dashboard with its own history, player registry,
//! display parameters and poll timer. Everything a session does is driven
//! by [`SessionEvent`]s consumed one at a time by its actor task:
//!
//! ```text
//! ws / REST ──SessionEvent──▶ mpsc ──▶ actor loop ◀── 2 s ticker (while running)
//!                                         │ poll → resample → render
//!                                         ▼
//!                                  RenderUpdate ──▶ ws writer
//! ```
//!
//! Passes never overlap: the actor finishes one event before reading the
//! next, and ticks are just another event.
//!
//! - **state**: the [`Session`] itself and its event handling
//! - **events**: event, parameter and render types
//! - **actor**: the serialized event loop
//! - **registry**: live sessions, for limits and out-of-band control

mod actor;
mod events;
mod registry;
mod state;

pub use actor::{spawn_session, SessionHandle};
pub use events::{ParamsUpdate, PlayerOption, RenderUpdate, SessionEvent};
pub use registry::{SessionId, SessionInfo, SessionRegistry};
pub use state::{
    is_valid_bucket_secs, Session, SessionConfig, SessionParams, BUCKET_STEP_SECS,
    MAX_BUCKET_SECS, MIN_BUCKET_SECS,
};

use thiserror::Error;

/// Errors from session management
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The registry is full
    #[error("Maximum number of sessions reached")]
    TooManySessions,

    /// No live session with this id
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The session's actor has stopped
    #[error("Session closed")]
    Closed,
}
