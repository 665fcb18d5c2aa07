//! Session event and render types

use serde::{Deserialize, Serialize};

use crate::chart::Figure;

/// Something that happened to a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Start the poll timer (polls once right away)
    Start,
    /// Stop the poll timer
    Stop,
    /// Timer fired
    Tick,
    /// Drop local history and ask the source to reset
    Clear,
    /// Change display parameters; redraws without polling
    SetParams(ParamsUpdate),
    /// Redraw from current state
    Refresh,
}

/// Partial parameter change; absent fields keep their value
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ParamsUpdate {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub bucket_secs: Option<f64>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub selected: Option<Vec<String>>,
    #[serde(default)]
    pub auto_include: Option<bool>,
}

/// Entry of the player picker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerOption {
    pub id: String,
    pub name: String,
}

/// Everything the browser needs to redraw after one pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderUpdate {
    pub figure: Figure,
    /// Players present in history, first-seen order
    pub players: Vec<PlayerOption>,
    /// Players drawn on the chart
    pub selected: Vec<String>,
    pub auto_include: bool,
    pub running: bool,
    pub bucket_secs: f64,
    pub time_zone: String,
    pub sample_count: usize,
    pub status: String,
}
