//! Telemetry wire format
//!
//! `GET {base}/api/data` returns
//!
//! ```json
//! {"user": {"9226643": {"total_damage": {"total": 123456}, "...": "..."}}}
//! ```
//!
//! Everything except the nested total is ignored. Players keep the order
//! the API lists them in.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Deserialize)]
pub(crate) struct DataResponse {
    #[serde(default, deserialize_with = "ordered_entries")]
    user: Vec<(String, UserEntry)>,
}

/// Read the `user` object as id/entry pairs in document order
fn ordered_entries<'de, D>(deserializer: D) -> Result<Vec<(String, UserEntry)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, UserEntry)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of player id to player stats")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((id, entry)) = map.next_entry::<String, UserEntry>()? {
                entries.push((id, entry));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    #[serde(default)]
    total_damage: Option<TotalDamage>,
}

#[derive(Debug, Deserialize)]
struct TotalDamage {
    #[serde(default)]
    total: f64,
}

/// One player's cumulative damage at poll time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerReading {
    pub player_id: String,
    pub cumulative_damage: f64,
}

/// All readings returned by one poll
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub readings: Vec<PlayerReading>,
}

impl Snapshot {
    pub fn new(readings: Vec<PlayerReading>) -> Self {
        Self { readings }
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl From<DataResponse> for Snapshot {
    fn from(response: DataResponse) -> Self {
        let readings = response
            .user
            .into_iter()
            .map(|(player_id, entry)| PlayerReading {
                player_id,
                // A player without a damage block has dealt nothing yet
                cumulative_damage: entry.total_damage.map(|d| d.total).unwrap_or(0.0),
            })
            .collect();
        Self { readings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Snapshot {
        serde_json::from_str::<DataResponse>(json).unwrap().into()
    }

    #[test]
    fn test_parse_nested_total() {
        let snapshot = parse(
            r#"{"code": 0, "user": {
                "114514": {"name": "x", "total_damage": {"normal": 10, "total": 1500}},
                "9226643": {"total_damage": {"total": 42.5}}
            }}"#,
        );

        assert_eq!(snapshot.readings.len(), 2);
        assert_eq!(
            snapshot.readings[0],
            PlayerReading {
                player_id: "114514".to_string(),
                cumulative_damage: 1500.0
            }
        );
        assert_eq!(snapshot.readings[1].cumulative_damage, 42.5);
    }

    #[test]
    fn test_missing_user_map_is_empty() {
        assert!(parse(r#"{"code": 0}"#).is_empty());
    }

    #[test]
    fn test_missing_total_reads_as_zero() {
        let snapshot = parse(r#"{"user": {"1": {}, "2": {"total_damage": {}}}}"#);
        assert!(snapshot.readings.iter().all(|r| r.cumulative_damage == 0.0));
    }

    #[test]
    fn test_players_keep_api_order() {
        let snapshot = parse(
            r#"{"user": {
                "9226643": {"total_damage": {"total": 1}},
                "7": {"total_damage": {"total": 2}},
                "114514": {"total_damage": {"total": 3}}
            }}"#,
        );

        let ids: Vec<&str> = snapshot.readings.iter().map(|r| r.player_id.as_str()).collect();
        assert_eq!(ids, vec!["9226643", "7", "114514"]);
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        assert!(serde_json::from_str::<DataResponse>(r#"{"user": [1, 2]}"#).is_err());
    }
}
