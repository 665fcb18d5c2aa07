//! Core data types for damage history
//!
//! - `Sample`: one cumulative-damage observation for one player
//! - `History`: insertion-ordered, append-only sequence of samples

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single cumulative-damage observation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    /// Unix timestamp in milliseconds (UTC)
    pub timestamp: i64,
    /// Player identifier as reported by the telemetry source
    pub player_id: String,
    /// Cumulative damage reported at `timestamp`
    pub cumulative_damage: f64,
}

impl Sample {
    /// Create a sample stamped with the current time
    pub fn new(player_id: impl Into<String>, cumulative_damage: f64) -> Self {
        Self::with_timestamp(player_id, cumulative_damage, Utc::now().timestamp_millis())
    }

    /// Create a sample with a specific timestamp
    pub fn with_timestamp(
        player_id: impl Into<String>,
        cumulative_damage: f64,
        timestamp: i64,
    ) -> Self {
        Self {
            timestamp,
            player_id: player_id.into(),
            cumulative_damage,
        }
    }
}

/// Append-only sample history for one session
///
/// Samples are only appended when a player's cumulative value changes,
/// so flat stretches are represented by the absence of samples.
#[derive(Debug, Clone, Default)]
pub struct History {
    samples: Vec<Sample>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading, appending a sample only if the value changed.
    ///
    /// Returns `true` if a sample was appended.
    pub fn record(&mut self, player_id: &str, cumulative_damage: f64, timestamp: i64) -> bool {
        if self.last_value(player_id) == Some(cumulative_damage) {
            return false;
        }

        self.samples
            .push(Sample::with_timestamp(player_id, cumulative_damage, timestamp));
        true
    }

    /// Most recent cumulative value recorded for a player
    pub fn last_value(&self, player_id: &str) -> Option<f64> {
        self.samples
            .iter()
            .rev()
            .find(|s| s.player_id == player_id)
            .map(|s| s.cumulative_damage)
    }

    /// Distinct player ids in first-seen order
    pub fn players(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.samples
            .iter()
            .filter(|s| seen.insert(s.player_id.as_str()))
            .map(|s| s.player_id.clone())
            .collect()
    }

    /// All samples in insertion order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Samples belonging to any of the given players, in insertion order
    pub fn samples_for<'a>(&'a self, players: &'a [String]) -> impl Iterator<Item = &'a Sample> {
        self.samples
            .iter()
            .filter(move |s| players.iter().any(|p| *p == s.player_id))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop every sample
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl From<Vec<Sample>> for History {
    fn from(samples: Vec<Sample>) -> Self {
        Self { samples }
    }
}
