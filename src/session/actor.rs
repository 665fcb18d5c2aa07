//! Session actor
//!
//! Owns a [`Session`] on its own task and feeds it events one at a time.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::events::{RenderUpdate, SessionEvent};
use super::state::Session;
use super::SessionError;

const EVENT_QUEUE: usize = 64;

/// Handle to a running session actor
///
/// Dropping every clone of the event sender stops the actor.
pub struct SessionHandle {
    id: String,
    events: mpsc::Sender<SessionEvent>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queue an event for the actor
    pub async fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.events.send(event).await.map_err(|_| SessionError::Closed)
    }

    /// Sender that can be handed to other owners (e.g. the registry)
    pub fn sender(&self) -> mpsc::Sender<SessionEvent> {
        self.events.clone()
    }

    /// Stop the actor without waiting for queued events
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the actor to finish
    pub async fn join(self) {
        let Self { events, task, .. } = self;
        drop(events);
        let _ = task.await;
    }
}

/// Spawn the actor loop for `session`.
///
/// Every handled event that produces a redraw is sent on `renders`. The
/// actor exits when all event senders are gone or `renders` is closed.
pub fn spawn_session(
    session: Session,
    poll_interval: Duration,
    renders: mpsc::UnboundedSender<RenderUpdate>,
) -> SessionHandle {
    let id = session.id().to_string();
    let (tx, rx) = mpsc::channel(EVENT_QUEUE);
    let task = tokio::spawn(run(session, rx, renders, poll_interval));

    SessionHandle { id, events: tx, task }
}

async fn run(
    mut session: Session,
    mut events: mpsc::Receiver<SessionEvent>,
    renders: mpsc::UnboundedSender<RenderUpdate>,
    poll_interval: Duration,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!(session_id = %session.id(), "Session actor started");

    loop {
        let event = tokio::select! {
            received = events.recv() => match received {
                Some(event) => event,
                None => break,
            },
            _ = ticker.tick(), if session.is_running() => SessionEvent::Tick,
        };

        let was_running = session.is_running();
        let update = session.handle(event).await;

        // Start already polled; the next tick is one full interval away
        if !was_running && session.is_running() {
            ticker.reset();
        }

        if let Some(update) = update {
            if renders.send(update).is_err() {
                break;
            }
        }
    }

    tracing::debug!(session_id = %session.id(), "Session actor stopped");
}
