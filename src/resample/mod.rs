//! Resampling
//!
//! Turns a sparse, irregular cumulative-damage history into regular
//! per-bucket increments that can be stacked on one chart.
//!
//! ```text
//! samples ─▶ 1 s grid (forward-fill, UTC) ─▶ first difference ─▶ sum per bucket ─▶ relabel in display zone
//! ```
//!
//! The computation never looks at the display zone; only the bucket labels
//! do.

mod bucket;
mod zones;

pub use bucket::{bucket_width_ms, resample, BucketLabel, BucketedSeries, PlayerSeries, GRID_STEP_MS};
pub use zones::{
    is_offered_time_zone, parse_time_zone, TimeZoneOption, DEFAULT_TIME_ZONE, TIME_ZONE_OPTIONS,
};

use thiserror::Error;

/// Errors raised while resampling
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResampleError {
    /// Bucket width rounds to zero milliseconds, is negative or not finite
    #[error("Invalid bucket width: {0}s")]
    InvalidBucketWidth(f64),

    /// Not a tz database zone name
    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// Timestamp cannot be represented as a calendar date
    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(i64),
}

/// Result type for resampling
pub type ResampleResult<T> = Result<T, ResampleError>;
