//! Display time zones offered by the dashboard

use chrono_tz::Tz;
use serde::Serialize;

use super::{ResampleError, ResampleResult};

/// A selectable display zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeZoneOption {
    /// Text shown in the selector
    pub label: &'static str,
    /// IANA zone name
    pub value: &'static str,
}

pub const DEFAULT_TIME_ZONE: &str = "Asia/Singapore";

pub const TIME_ZONE_OPTIONS: &[TimeZoneOption] = &[
    TimeZoneOption { label: "Singapore (SGT, UTC+8)", value: "Asia/Singapore" },
    TimeZoneOption { label: "Coordinated Universal Time (UTC)", value: "UTC" },
    TimeZoneOption { label: "Shanghai, China (CST, UTC+8)", value: "Asia/Shanghai" },
    TimeZoneOption { label: "Tokyo, Japan (JST, UTC+9)", value: "Asia/Tokyo" },
    TimeZoneOption { label: "London, UK (GMT/BST)", value: "Europe/London" },
    TimeZoneOption { label: "New York, US (EST/EDT)", value: "America/New_York" },
    TimeZoneOption { label: "Los Angeles, US (PST/PDT)", value: "America/Los_Angeles" },
];

/// Parse an IANA zone name
pub fn parse_time_zone(name: &str) -> ResampleResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ResampleError::UnknownTimeZone(name.to_string()))
}

/// Whether `name` is one of the zones the dashboard offers
pub fn is_offered_time_zone(name: &str) -> bool {
    TIME_ZONE_OPTIONS.iter().any(|o| o.value == name)
}
