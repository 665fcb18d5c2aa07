//! WebSocket Dashboard Channel
//!
//! The dashboard page talks to its session over one WebSocket.
//!
//! ## Protocol
//!
//! Client → server (`type` tag, snake_case):
//! - `start`, `stop`, `clear`, `refresh`
//! - `set_params` with any of `api_url`, `bucket_secs`, `time_zone`,
//!   `selected`, `auto_include`
//! - `ping`
//!
//! Server → client:
//! - `connected` with the session id, widget defaults and time zones
//! - `render` with the Plotly figure, player list, selection and status
//! - `pong`, `error`
//!
//! ## Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8050/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'set_params', api_url: 'http://127.0.0.1:8989'}));
//!   ws.send(JSON.stringify({type: 'start'}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'render') Plotly.react('chart', msg.figure.data, msg.figure.layout);
//! };
//! ```

mod handler;
mod messages;

pub use handler::websocket_handler;
pub use messages::{ClientMessage, DashboardDefaults, ServerMessage};
