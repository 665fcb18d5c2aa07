//! Cumulative-to-incremental bucketing
//!
//! All arithmetic is done on UTC Unix milliseconds. The grid starts at the
//! earliest selected sample floored to a whole second and ends at the latest
//! sample ceiled to a whole second, so every sample is covered by some grid
//! point at or after it.

use chrono::{TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;

use super::zones::parse_time_zone;
use super::{ResampleError, ResampleResult};
use crate::history::{History, Sample};

/// Spacing of the forward-fill grid
pub const GRID_STEP_MS: i64 = 1_000;

const LABEL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Start of one bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketLabel {
    /// Bucket start, Unix milliseconds (UTC)
    pub start_ms: i64,
    /// Bucket start rendered in the display zone
    pub label: String,
}

/// Per-bucket increments for one player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSeries {
    pub player_id: String,
    /// One value per bucket, aligned with [`BucketedSeries::buckets`]
    pub increments: Vec<f64>,
    /// Sum of `increments`
    pub total: f64,
}

/// Regular series for every requested player on a shared bucket grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketedSeries {
    pub bucket_width_ms: i64,
    pub time_zone: String,
    pub buckets: Vec<BucketLabel>,
    pub series: Vec<PlayerSeries>,
}

impl BucketedSeries {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Display labels of all buckets
    pub fn labels(&self) -> Vec<String> {
        self.buckets.iter().map(|b| b.label.clone()).collect()
    }

    pub fn get(&self, player_id: &str) -> Option<&PlayerSeries> {
        self.series.iter().find(|s| s.player_id == player_id)
    }
}

/// Bucket width in milliseconds, rounded to the nearest millisecond
pub fn bucket_width_ms(bucket_secs: f64) -> ResampleResult<i64> {
    if !bucket_secs.is_finite() {
        return Err(ResampleError::InvalidBucketWidth(bucket_secs));
    }
    let width = (bucket_secs * 1000.0).round();
    if width < 1.0 {
        return Err(ResampleError::InvalidBucketWidth(bucket_secs));
    }
    Ok(width as i64)
}

/// Resample `players`' cumulative damage into per-bucket increments.
///
/// Players without samples are left out. Output series follow the order of
/// `players`.
pub fn resample(
    history: &History,
    players: &[String],
    bucket_secs: f64,
    time_zone: &str,
) -> ResampleResult<BucketedSeries> {
    let width = bucket_width_ms(bucket_secs)?;
    let tz = parse_time_zone(time_zone)?;

    let mut by_player: HashMap<&str, Vec<&Sample>> = HashMap::new();
    for sample in history.samples_for(players) {
        by_player
            .entry(sample.player_id.as_str())
            .or_default()
            .push(sample);
    }

    let mut result = BucketedSeries {
        bucket_width_ms: width,
        time_zone: time_zone.to_string(),
        buckets: Vec::new(),
        series: Vec::new(),
    };

    let timestamps = by_player.values().flatten().map(|s| s.timestamp);
    let (Some(first), Some(last)) = (timestamps.clone().min(), timestamps.max()) else {
        return Ok(result);
    };

    let start = first.div_euclid(GRID_STEP_MS) * GRID_STEP_MS;
    let end = if last.rem_euclid(GRID_STEP_MS) == 0 {
        last
    } else {
        (last.div_euclid(GRID_STEP_MS) + 1) * GRID_STEP_MS
    };
    let bucket_count = ((end - start) / width + 1) as usize;

    for b in 0..bucket_count {
        let start_ms = start + b as i64 * width;
        let label = Utc
            .timestamp_millis_opt(start_ms)
            .single()
            .ok_or(ResampleError::TimestampOutOfRange(start_ms))?
            .with_timezone(&tz)
            .format(LABEL_FORMAT)
            .to_string();
        result.buckets.push(BucketLabel { start_ms, label });
    }

    let mut seen = Vec::new();
    for player in players {
        if seen.contains(&player) {
            continue;
        }
        seen.push(player);

        let Some(samples) = by_player.get_mut(player.as_str()) else {
            continue;
        };
        samples.sort_by_key(|s| s.timestamp);

        let increments = player_increments(samples, start, end, width, bucket_count);
        let total = increments.iter().sum();
        result.series.push(PlayerSeries {
            player_id: player.clone(),
            increments,
            total,
        });
    }

    Ok(result)
}

/// Forward-fill one player's samples over the grid and bucket the differences.
///
/// `samples` must be sorted by timestamp. The baseline is the player's first
/// sample, so the first filled point contributes nothing.
fn player_increments(
    samples: &[&Sample],
    start: i64,
    end: i64,
    width: i64,
    bucket_count: usize,
) -> Vec<f64> {
    let mut increments = vec![0.0; bucket_count];
    let mut previous = samples.first().map(|s| s.cumulative_damage);
    let mut next = 0;
    let mut filled: Option<f64> = None;

    let mut grid = start;
    while grid <= end {
        while next < samples.len() && samples[next].timestamp <= grid {
            filled = Some(samples[next].cumulative_damage);
            next += 1;
        }

        if let (Some(value), Some(prev)) = (filled, previous) {
            let bucket = ((grid - start) / width) as usize;
            increments[bucket] += value - prev;
            previous = Some(value);
        }

        grid += GRID_STEP_MS;
    }

    increments
}
