//! WebSocket Handler
//!
//! Each upgraded connection gets its own session actor. Client messages
//! become session events; render updates go back out as `render` messages.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;
use crate::session::{
    spawn_session, RenderUpdate, Session, SessionEvent, SessionHandle, SessionId,
};

/// WebSocket upgrade handler
///
/// This is the entry point for dashboard connections.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one dashboard session for the lifetime of the socket
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let Some(OpenSession {
        id: session_id,
        handle,
        mut render_rx,
    }) = open_session(&mut sender, &state).await
    else {
        let _ = sender.close().await;
        return;
    };
    let events = handle.sender();

    // First paint
    let _ = handle.send(SessionEvent::Refresh).await;

    // Replies that bypass the session (pong, parse errors)
    let (direct_tx, mut direct_rx) = mpsc::unbounded_channel::<ServerMessage>();

    let id_for_send = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                Some(update) = render_rx.recv() => ServerMessage::Render(Box::new(update)),
                Some(message) = direct_rx.recv() => message,
                else => break,
            };

            if send_json(&mut sender, &message).await.is_err() {
                tracing::debug!(session_id = %id_for_send, "WebSocket send failed, closing connection");
                break;
            }
        }
    });

    let id_for_recv = session_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&id_for_recv, &events, &direct_tx, msg).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(session_id = %id_for_recv, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    // Cleanup: forget the session and stop its actor
    state.sessions.unregister(&session_id).await;
    handle.abort();
}

/// A registered session with its actor running
struct OpenSession {
    id: SessionId,
    handle: SessionHandle,
    render_rx: mpsc::UnboundedReceiver<RenderUpdate>,
}

/// Register a session, spawn its actor and greet the client.
///
/// Over the session limit the client gets an `error` message and no actor
/// is spawned. Returns `None` whenever the connection should be closed.
async fn open_session<S>(sender: &mut S, state: &AppState) -> Option<OpenSession>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let session_id = match state.sessions.register().await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting dashboard connection");
            let _ = send_json(sender, &ServerMessage::error(e.to_string())).await;
            return None;
        }
    };

    let session = Session::new(
        session_id.clone(),
        Arc::clone(&state.source),
        &state.session_config,
    );
    let (render_tx, render_rx) = mpsc::unbounded_channel::<RenderUpdate>();
    let handle = spawn_session(session, state.session_config.poll_interval, render_tx);

    if let Err(e) = state.sessions.attach(&session_id, handle.sender()).await {
        tracing::error!(session_id = %session_id, error = %e, "Failed to attach session");
    }

    let connected = ServerMessage::connected(&session_id, &state.session_config);
    if let Err(e) = send_json(sender, &connected).await {
        tracing::error!(session_id = %session_id, error = %e, "Failed to send connected message");
        state.sessions.unregister(&session_id).await;
        handle.abort();
        return None;
    }

    Some(OpenSession {
        id: session_id,
        handle,
        render_rx,
    })
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(
    session_id: &str,
    events: &mpsc::Sender<SessionEvent>,
    direct: &mpsc::UnboundedSender<ServerMessage>,
    message: Message,
) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Ping) => {
                    let _ = direct.send(ServerMessage::Pong);
                }
                Ok(client_msg) => {
                    if let Some(event) = client_msg.into_event() {
                        tracing::debug!(session_id = %session_id, event = ?event, "Dashboard event");
                        if events.send(event).await.is_err() {
                            return false;
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %e,
                        text = %text,
                        "Invalid client message"
                    );
                    // Send error but keep connection open
                    let _ = direct.send(ServerMessage::error(format!("Invalid message format: {}", e)));
                }
            }
            true
        }
        Message::Binary(_) => {
            let _ = direct.send(ServerMessage::error("Binary messages not supported"));
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(session_id = %session_id, "Client requested close");
            false
        }
    }
}

async fn send_json<S>(sender: &mut S, message: &ServerMessage) -> Result<(), S::Error>
where
    S: Sink<Message> + Unpin,
{
    match serde_json::to_string(message) {
        Ok(text) => sender.send(Message::Text(text)).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use crate::session::SessionConfig;
    use crate::telemetry::{Snapshot, TelemetryError, TelemetrySource};
    use async_trait::async_trait;

    struct EmptySource;

    #[async_trait]
    impl TelemetrySource for EmptySource {
        async fn fetch_snapshot(&self, _base_url: &str) -> Result<Snapshot, TelemetryError> {
            Ok(Snapshot::default())
        }

        async fn request_reset(&self, _base_url: &str) -> Result<(), TelemetryError> {
            Ok(())
        }
    }

    fn state_with_limit(max_sessions: usize) -> AppState {
        let api_config = ApiConfig {
            max_sessions,
            ..Default::default()
        };
        AppState::new(Arc::new(EmptySource), SessionConfig::default(), api_config)
    }

    fn sent_types(sent: &[Message]) -> Vec<String> {
        sent.iter()
            .map(|message| match message {
                Message::Text(text) => {
                    let value: serde_json::Value = serde_json::from_str(text).unwrap();
                    value["type"].as_str().unwrap().to_string()
                }
                other => panic!("unexpected frame {:?}", other),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_over_limit_connection_gets_error() {
        let state = state_with_limit(0);
        let mut sent: Vec<Message> = Vec::new();

        let opened = open_session(&mut sent, &state).await;

        assert!(opened.is_none());
        assert_eq!(sent_types(&sent), vec!["error"]);
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_full_registry_rejects_next_connection() {
        let state = state_with_limit(1);

        let mut first: Vec<Message> = Vec::new();
        let session = open_session(&mut first, &state).await.unwrap();
        assert_eq!(sent_types(&first), vec!["connected"]);

        let mut second: Vec<Message> = Vec::new();
        assert!(open_session(&mut second, &state).await.is_none());
        assert_eq!(sent_types(&second), vec!["error"]);
        assert_eq!(state.session_count().await, 1);

        session.handle.abort();
    }

    #[tokio::test]
    async fn test_open_session_is_attached() {
        let state = state_with_limit(4);
        let mut sent: Vec<Message> = Vec::new();

        let mut session = open_session(&mut sent, &state).await.unwrap();
        state
            .sessions
            .send(&session.id, SessionEvent::Refresh)
            .await
            .unwrap();

        let update = session.render_rx.recv().await.unwrap();
        assert!(!update.running);

        session.handle.abort();
    }

    #[tokio::test]
    async fn test_text_message_becomes_event() {
        let (events_tx, mut events_rx) = mpsc::channel(4);
        let (direct_tx, mut direct_rx) = mpsc::unbounded_channel();

        let keep = handle_ws_message(
            "s",
            &events_tx,
            &direct_tx,
            Message::Text(r#"{"type": "clear"}"#.to_string()),
        )
        .await;

        assert!(keep);
        assert_eq!(events_rx.recv().await, Some(SessionEvent::Clear));
        assert!(direct_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_ping_answered_directly() {
        let (events_tx, mut events_rx) = mpsc::channel(4);
        let (direct_tx, mut direct_rx) = mpsc::unbounded_channel();

        handle_ws_message("s", &events_tx, &direct_tx, Message::Text(r#"{"type":"ping"}"#.to_string())).await;

        assert!(matches!(direct_rx.recv().await, Some(ServerMessage::Pong)));
        assert!(events_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_invalid_message_keeps_connection() {
        let (events_tx, _events_rx) = mpsc::channel(4);
        let (direct_tx, mut direct_rx) = mpsc::unbounded_channel();

        let keep = handle_ws_message("s", &events_tx, &direct_tx, Message::Text("nope".to_string())).await;

        assert!(keep);
        assert!(matches!(direct_rx.recv().await, Some(ServerMessage::Error { .. })));
    }

    #[tokio::test]
    async fn test_close_ends_connection() {
        let (events_tx, _events_rx) = mpsc::channel(4);
        let (direct_tx, _direct_rx) = mpsc::unbounded_channel();

        assert!(!handle_ws_message("s", &events_tx, &direct_tx, Message::Close(None)).await);
    }
}
