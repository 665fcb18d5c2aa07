//! Chart Rendering
//!
//! Builds Plotly-compatible figures from bucketed series. The browser
//! hands `figure.data` and `figure.layout` straight to `Plotly.react`, so
//! field names here follow Plotly's schema.

mod figure;
mod render;

pub use figure::{Axis, Figure, Layout, Legend, Line, Title, Trace};
pub use render::{format_width, render_chart, select_players_placeholder, waiting_placeholder};
