//! Session state and event handling

use chrono::{Local, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::events::{ParamsUpdate, PlayerOption, RenderUpdate, SessionEvent};
use crate::chart::{render_chart, select_players_placeholder, waiting_placeholder, Figure};
use crate::history::{History, PlayerRegistry};
use crate::resample::{is_offered_time_zone, resample, DEFAULT_TIME_ZONE};
use crate::telemetry::{ingest_snapshot, TelemetrySource};

pub const MIN_BUCKET_SECS: f64 = 0.5;
pub const MAX_BUCKET_SECS: f64 = 10.0;
pub const BUCKET_STEP_SECS: f64 = 0.5;

const NO_URL_STATUS: &str = "Enter the API server address and press Start.";

/// Defaults every new session starts from
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Telemetry API base URL pre-filled in the dashboard
    pub api_url: Option<String>,
    pub bucket_secs: f64,
    pub time_zone: String,
    pub auto_include: bool,
    /// Poll cadence while running
    pub poll_interval: Duration,
    /// Known player names
    pub player_names: HashMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let mut player_names = HashMap::new();
        player_names.insert("114514".to_string(), "Veteran".to_string());
        player_names.insert("9226643".to_string(), "Imita".to_string());

        Self {
            api_url: None,
            bucket_secs: 5.0,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            auto_include: true,
            poll_interval: Duration::from_secs(2),
            player_names,
        }
    }
}

/// Current display parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SessionParams {
    pub api_url: Option<String>,
    pub bucket_secs: f64,
    pub time_zone: String,
    pub selected: Vec<String>,
    pub auto_include: bool,
}

/// One dashboard's state
pub struct Session {
    id: String,
    source: Arc<dyn TelemetrySource>,
    history: History,
    registry: PlayerRegistry,
    params: SessionParams,
    running: bool,
    status: String,
}

impl Session {
    pub fn new(id: impl Into<String>, source: Arc<dyn TelemetrySource>, config: &SessionConfig) -> Self {
        Self {
            id: id.into(),
            source,
            history: History::new(),
            registry: PlayerRegistry::new(config.player_names.clone()),
            params: SessionParams {
                api_url: normalize_url(config.api_url.as_deref()),
                bucket_secs: config.bucket_secs,
                time_zone: config.time_zone.clone(),
                selected: Vec::new(),
                auto_include: config.auto_include,
            },
            running: false,
            status: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Handle one event and return what to draw.
    ///
    /// Returns `None` only for ticks that arrive while stopped.
    pub async fn handle(&mut self, event: SessionEvent) -> Option<RenderUpdate> {
        match event {
            SessionEvent::Start => {
                if !self.running {
                    self.running = true;
                    tracing::info!(session_id = %self.id, "Polling started");
                    self.poll().await;
                }
            }
            SessionEvent::Stop => {
                if self.running {
                    self.running = false;
                    tracing::info!(session_id = %self.id, "Polling stopped");
                }
            }
            SessionEvent::Tick => {
                if !self.running {
                    return None;
                }
                self.poll().await;
            }
            SessionEvent::Clear => self.clear().await,
            SessionEvent::SetParams(update) => self.apply(update),
            SessionEvent::Refresh => {}
        }

        Some(self.render())
    }

    /// Fetch one snapshot and fold it into history
    async fn poll(&mut self) {
        let Some(base) = self.params.api_url.clone() else {
            self.status = NO_URL_STATUS.to_string();
            return;
        };

        match self.source.fetch_snapshot(&base).await {
            Ok(snapshot) => {
                let summary = ingest_snapshot(
                    &mut self.history,
                    &mut self.registry,
                    &snapshot,
                    Utc::now().timestamp_millis(),
                );
                tracing::debug!(
                    session_id = %self.id,
                    players = snapshot.readings.len(),
                    appended = summary.appended,
                    new_players = summary.new_players,
                    "Poll complete"
                );
                self.status = format!("Data updated at {}", Local::now().format("%H:%M:%S"));
            }
            Err(e) => {
                tracing::warn!(session_id = %self.id, error = %e, "Poll failed");
                self.status = format!("Error fetching data: {}", e);
            }
        }
    }

    /// Drop local history, then ask the source to reset
    async fn clear(&mut self) {
        self.history.clear();

        self.status = match self.params.api_url.clone() {
            None => "API address is empty, only local data cleared.".to_string(),
            Some(base) => match self.source.request_reset(&base).await {
                Ok(()) => "Server and local statistics cleared.".to_string(),
                Err(e) => {
                    tracing::warn!(session_id = %self.id, error = %e, "Remote reset failed");
                    format!("Failed to clear server data, local data cleared. Error: {}", e)
                }
            },
        };

        tracing::info!(session_id = %self.id, "History cleared");
    }

    fn apply(&mut self, update: ParamsUpdate) {
        if let Some(url) = update.api_url {
            self.params.api_url = normalize_url(Some(&url));
        }

        if let Some(secs) = update.bucket_secs {
            if is_valid_bucket_secs(secs) {
                self.params.bucket_secs = secs;
            } else {
                self.status = format!(
                    "Bucket width must be {}-{}s in {}s steps, got {}",
                    MIN_BUCKET_SECS, MAX_BUCKET_SECS, BUCKET_STEP_SECS, secs
                );
            }
        }

        if let Some(zone) = update.time_zone {
            if is_offered_time_zone(&zone) {
                self.params.time_zone = zone;
            } else {
                self.status = format!("Unsupported time zone: {}", zone);
            }
        }

        if let Some(selected) = update.selected {
            self.params.selected = selected;
        }

        if let Some(auto_include) = update.auto_include {
            self.params.auto_include = auto_include;
        }
    }

    /// Recompute the chart from current history and parameters
    fn render(&mut self) -> RenderUpdate {
        let players = self.history.players();
        let bucket_secs = self.params.bucket_secs;

        let figure = if self.history.is_empty() {
            self.params.selected.clear();
            waiting_placeholder()
        } else {
            if self.params.auto_include {
                self.params.selected = players.clone();
            }

            if self.params.selected.is_empty() {
                select_players_placeholder(bucket_secs)
            } else {
                match resample(
                    &self.history,
                    &self.params.selected,
                    bucket_secs,
                    &self.params.time_zone,
                ) {
                    Ok(series) => render_chart(&series, &self.registry, bucket_secs),
                    Err(e) => {
                        tracing::warn!(session_id = %self.id, error = %e, "Resample failed");
                        Figure::empty(format!("Cannot render chart: {}", e))
                    }
                }
            }
        };

        RenderUpdate {
            figure,
            players: players
                .iter()
                .map(|id| PlayerOption {
                    id: id.clone(),
                    name: self.registry.display_name(id),
                })
                .collect(),
            selected: self.params.selected.clone(),
            auto_include: self.params.auto_include,
            running: self.running,
            bucket_secs,
            time_zone: self.params.time_zone.clone(),
            sample_count: self.history.len(),
            status: self.status.clone(),
        }
    }
}

/// Bucket widths the dashboard slider can produce
pub fn is_valid_bucket_secs(secs: f64) -> bool {
    (MIN_BUCKET_SECS..=MAX_BUCKET_SECS).contains(&secs) && (secs / BUCKET_STEP_SECS).fract() == 0.0
}

fn normalize_url(url: Option<&str>) -> Option<String> {
    url.map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{PlayerReading, Snapshot, TelemetryError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted snapshots; runs dry with `Unavailable`
    #[derive(Default)]
    struct StubSource {
        snapshots: Mutex<VecDeque<Result<Snapshot, TelemetryError>>>,
        fetches: AtomicUsize,
        resets: AtomicUsize,
        fail_reset: bool,
    }

    impl StubSource {
        fn scripted(script: Vec<Result<Snapshot, TelemetryError>>) -> Self {
            Self {
                snapshots: Mutex::new(script.into()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl TelemetrySource for StubSource {
        async fn fetch_snapshot(&self, _base_url: &str) -> Result<Snapshot, TelemetryError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.snapshots
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TelemetryError::Unavailable))
        }

        async fn request_reset(&self, _base_url: &str) -> Result<(), TelemetryError> {
            self.resets.fetch_add(1, Ordering::SeqCst);
            if self.fail_reset {
                Err(TelemetryError::Timeout)
            } else {
                Ok(())
            }
        }
    }

    fn snap(readings: &[(&str, f64)]) -> Result<Snapshot, TelemetryError> {
        Ok(Snapshot::new(
            readings
                .iter()
                .map(|(id, v)| PlayerReading {
                    player_id: id.to_string(),
                    cumulative_damage: *v,
                })
                .collect(),
        ))
    }

    fn session_with(source: Arc<StubSource>, api_url: Option<&str>) -> Session {
        let config = SessionConfig {
            api_url: api_url.map(str::to_string),
            ..SessionConfig::default()
        };
        Session::new("test", source, &config)
    }

    #[tokio::test]
    async fn test_start_polls_immediately() {
        let source = Arc::new(StubSource::scripted(vec![snap(&[("114514", 100.0), ("7", 5.0)])]));
        let mut session = session_with(Arc::clone(&source), Some("http://game:8989"));

        let update = session.handle(SessionEvent::Start).await.unwrap();

        assert!(update.running);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(update.sample_count, 2);
        assert!(update.status.starts_with("Data updated at"), "{}", update.status);
        assert_eq!(
            update.players,
            vec![
                PlayerOption { id: "114514".to_string(), name: "Veteran".to_string() },
                PlayerOption { id: "7".to_string(), name: "Player_7".to_string() },
            ]
        );
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let source = Arc::new(StubSource::scripted(vec![snap(&[("a", 1.0)])]));
        let mut session = session_with(Arc::clone(&source), Some("http://game"));

        session.handle(SessionEvent::Start).await;
        session.handle(SessionEvent::Start).await;

        assert!(session.is_running());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tick_ignored_while_stopped() {
        let source = Arc::new(StubSource::default());
        let mut session = session_with(Arc::clone(&source), Some("http://game"));

        assert!(session.handle(SessionEvent::Tick).await.is_none());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stop_halts_ticks() {
        let source = Arc::new(StubSource::scripted(vec![snap(&[("a", 1.0)]), snap(&[("a", 2.0)])]));
        let mut session = session_with(Arc::clone(&source), Some("http://game"));

        session.handle(SessionEvent::Start).await;
        session.handle(SessionEvent::Tick).await;
        let stopped = session.handle(SessionEvent::Stop).await.unwrap();
        assert!(!stopped.running);
        assert!(session.handle(SessionEvent::Tick).await.is_none());

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_unchanged_reading_appends_nothing() {
        let source = Arc::new(StubSource::scripted(vec![
            snap(&[("a", 10.0)]),
            snap(&[("a", 10.0)]),
            snap(&[("a", 10.0)]),
        ]));
        let mut session = session_with(Arc::clone(&source), Some("http://game"));

        session.handle(SessionEvent::Start).await;
        session.handle(SessionEvent::Tick).await;
        let update = session.handle(SessionEvent::Tick).await.unwrap();

        assert_eq!(update.sample_count, 1);
    }

    #[tokio::test]
    async fn test_fetch_error_keeps_history() {
        let source = Arc::new(StubSource::scripted(vec![
            snap(&[("a", 10.0)]),
            Err(TelemetryError::Decode("expected value".to_string())),
        ]));
        let mut session = session_with(Arc::clone(&source), Some("http://game"));

        let before = session.handle(SessionEvent::Start).await.unwrap();
        let after = session.handle(SessionEvent::Tick).await.unwrap();

        assert_eq!(after.sample_count, 1);
        assert_eq!(after.figure, before.figure);
        assert_eq!(after.status, "Error fetching data: malformed response: expected value");
    }

    #[tokio::test]
    async fn test_missing_url_prompts_without_fetching() {
        let source = Arc::new(StubSource::default());
        let mut session = session_with(Arc::clone(&source), None);

        let update = session.handle(SessionEvent::Start).await.unwrap();

        assert_eq!(update.status, NO_URL_STATUS);
        assert_eq!(update.figure.layout.title.text, "Waiting for data...");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clear_with_remote_success() {
        let source = Arc::new(StubSource::scripted(vec![snap(&[("a", 10.0)])]));
        let mut session = session_with(Arc::clone(&source), Some("http://game"));
        session.handle(SessionEvent::Start).await;

        let update = session.handle(SessionEvent::Clear).await.unwrap();

        assert!(session.history().is_empty());
        assert_eq!(update.status, "Server and local statistics cleared.");
        assert_eq!(source.resets.load(Ordering::SeqCst), 1);
        assert!(update.players.is_empty());
        assert!(update.selected.is_empty());
    }

    #[tokio::test]
    async fn test_clear_survives_remote_failure() {
        let source = Arc::new(StubSource {
            snapshots: Mutex::new(vec![snap(&[("a", 10.0)])].into()),
            fail_reset: true,
            ..Default::default()
        });
        let mut session = session_with(Arc::clone(&source), Some("http://game"));
        session.handle(SessionEvent::Start).await;

        let update = session.handle(SessionEvent::Clear).await.unwrap();

        assert!(session.history().is_empty());
        assert_eq!(
            update.status,
            "Failed to clear server data, local data cleared. Error: request timed out"
        );
    }

    #[tokio::test]
    async fn test_clear_without_url_is_local_only() {
        let source = Arc::new(StubSource::default());
        let mut session = session_with(Arc::clone(&source), None);

        let update = session.handle(SessionEvent::Clear).await.unwrap();

        assert_eq!(update.status, "API address is empty, only local data cleared.");
        assert_eq!(source.resets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_params_redraw_without_polling() {
        let source = Arc::new(StubSource::scripted(vec![snap(&[("a", 10.0), ("b", 3.0)])]));
        let mut session = session_with(Arc::clone(&source), Some("http://game"));
        session.handle(SessionEvent::Start).await;

        let update = session
            .handle(SessionEvent::SetParams(ParamsUpdate {
                bucket_secs: Some(2.5),
                time_zone: Some("Europe/London".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(update.bucket_secs, 2.5);
        assert_eq!(update.time_zone, "Europe/London");
        assert_eq!(update.figure.layout.title.text, "Incremental damage per 2.5s");
        assert_eq!(
            update.figure.layout.xaxis.as_ref().unwrap().title.text,
            "Time (Europe/London)"
        );
    }

    #[tokio::test]
    async fn test_off_step_bucket_width_rejected() {
        let source = Arc::new(StubSource::default());
        let mut session = session_with(source, None);

        let update = session
            .handle(SessionEvent::SetParams(ParamsUpdate {
                bucket_secs: Some(0.75),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(update.bucket_secs, 5.0);
        assert_eq!(
            update.status,
            "Bucket width must be 0.5-10s in 0.5s steps, got 0.75"
        );
    }

    #[tokio::test]
    async fn test_out_of_range_bucket_width_rejected() {
        let source = Arc::new(StubSource::default());
        let mut session = session_with(source, None);

        let update = session
            .handle(SessionEvent::SetParams(ParamsUpdate {
                bucket_secs: Some(12.0),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(update.bucket_secs, 5.0);
        assert!(update.status.ends_with("got 12"), "{}", update.status);
    }

    #[tokio::test]
    async fn test_unlisted_time_zone_rejected() {
        let source = Arc::new(StubSource::default());
        let mut session = session_with(source, None);

        let update = session
            .handle(SessionEvent::SetParams(ParamsUpdate {
                time_zone: Some("Europe/Paris".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(update.time_zone, DEFAULT_TIME_ZONE);
        assert_eq!(update.bucket_secs, 5.0);
        assert_eq!(update.status, "Unsupported time zone: Europe/Paris");
    }

    #[tokio::test]
    async fn test_manual_selection() {
        let source = Arc::new(StubSource::scripted(vec![snap(&[("a", 10.0), ("b", 3.0)])]));
        let mut session = session_with(Arc::clone(&source), Some("http://game"));
        session.handle(SessionEvent::Start).await;

        let none = session
            .handle(SessionEvent::SetParams(ParamsUpdate {
                auto_include: Some(false),
                selected: Some(Vec::new()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(none.figure.layout.title.text, "Select players to display");
        assert!(none.figure.data.is_empty());

        let one = session
            .handle(SessionEvent::SetParams(ParamsUpdate {
                selected: Some(vec!["b".to_string()]),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(one.selected, vec!["b".to_string()]);
        assert_eq!(one.figure.data.len(), 1);
        assert_eq!(one.figure.data[0].name, "Player_b");
    }

    #[tokio::test]
    async fn test_auto_include_selects_everyone() {
        let source = Arc::new(StubSource::scripted(vec![
            snap(&[("a", 10.0)]),
            snap(&[("a", 12.0), ("b", 3.0)]),
        ]));
        let mut session = session_with(Arc::clone(&source), Some("http://game"));

        session.handle(SessionEvent::Start).await;
        let update = session.handle(SessionEvent::Tick).await.unwrap();

        assert!(update.auto_include);
        assert_eq!(update.selected, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(update.figure.data.len(), 2);
    }

    #[tokio::test]
    async fn test_url_update_is_trimmed() {
        let source = Arc::new(StubSource::default());
        let mut session = session_with(source, Some("http://old"));

        session
            .handle(SessionEvent::SetParams(ParamsUpdate {
                api_url: Some("  ".to_string()),
                ..Default::default()
            }))
            .await;
        assert_eq!(session.params().api_url, None);

        session
            .handle(SessionEvent::SetParams(ParamsUpdate {
                api_url: Some(" http://new:8989 ".to_string()),
                ..Default::default()
            }))
            .await;
        assert_eq!(session.params().api_url.as_deref(), Some("http://new:8989"));
    }

    #[test]
    fn test_bucket_validation() {
        assert!(is_valid_bucket_secs(0.5));
        assert!(is_valid_bucket_secs(10.0));
        assert!(is_valid_bucket_secs(3.5));
        assert!(!is_valid_bucket_secs(0.25));
        assert!(!is_valid_bucket_secs(10.5));
        assert!(!is_valid_bucket_secs(1.2));
        assert!(!is_valid_bucket_secs(f64::NAN));
    }
}
