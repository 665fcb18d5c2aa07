//! Snapshot ingestion
//!
//! Folds one poll into a session's history and player registry.

use crate::history::{History, PlayerRegistry};

use super::dto::Snapshot;

/// What a single ingest changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Samples appended to the history
    pub appended: usize,
    /// Players seen for the first time by the registry
    pub new_players: usize,
}

/// Append a sample for every player whose cumulative value changed.
///
/// All samples from one snapshot share `timestamp` (Unix ms).
pub fn ingest_snapshot(
    history: &mut History,
    registry: &mut PlayerRegistry,
    snapshot: &Snapshot,
    timestamp: i64,
) -> IngestSummary {
    let mut summary = IngestSummary::default();

    for reading in &snapshot.readings {
        if history.record(&reading.player_id, reading.cumulative_damage, timestamp) {
            summary.appended += 1;
        }
        if registry.observe(&reading.player_id) {
            summary.new_players += 1;
        }
    }

    summary
}
