//! # Damage Timeline
//!
//! Live dashboard of per-player damage output. A running dashboard polls a
//! game telemetry API for cumulative damage counters, keeps the readings in
//! memory and redraws a stacked chart of damage dealt per time bucket.
//!
//! ## Modules
//!
//! - [`history`]: Samples, the append-only history and player names
//! - [`telemetry`]: HTTP client for the telemetry API and snapshot ingestion
//! - [`resample`]: Cumulative readings to per-bucket increments
//! - [`chart`]: Plotly figure construction
//! - [`session`]: Per-dashboard state and its event loop
//! - [`api`]: Axum server, REST routes and the dashboard page
//! - [`websocket`]: Dashboard connection handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use damage_timeline::history::History;
//! use damage_timeline::resample::resample;
//!
//! let mut history = History::new();
//! history.record("114514", 0.0, 1_000);
//! history.record("114514", 50.0, 2_000);
//! history.record("114514", 120.0, 3_000);
//!
//! let series = resample(&history, &["114514".to_string()], 5.0, "UTC").unwrap();
//! assert_eq!(series.series[0].total, 120.0);
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod history;
pub mod logging;
pub mod resample;
pub mod session;
pub mod telemetry;
pub mod websocket;

// Re-export top-level types for convenience
pub use history::{History, PlayerRegistry, Sample};

pub use resample::{resample, BucketedSeries, ResampleError, ResampleResult};

pub use chart::{render_chart, Figure};

pub use session::{Session, SessionConfig, SessionEvent, SessionRegistry};

pub use telemetry::{HttpTelemetryClient, Snapshot, TelemetryError, TelemetrySource};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoadedConfig};
