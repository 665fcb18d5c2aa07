//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ApiConfig;
use crate::resample::{is_offered_time_zone, DEFAULT_TIME_ZONE, TIME_ZONE_OPTIONS};
use crate::session::{is_valid_bucket_secs, SessionConfig};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Player id to display name
    #[serde(default = "default_players")]
    pub players: HashMap<String, String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_players() -> HashMap<String, String> {
    SessionConfig::default().player_names
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            telemetry: TelemetryConfig::default(),
            dashboard: DashboardConfig::default(),
            players: default_players(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Dashboard server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_max_sessions() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Telemetry API client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Pre-filled API address for new dashboards
    #[serde(default)]
    pub default_api_url: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_request_timeout() -> u64 {
    2000
}

fn default_poll_interval() -> u64 {
    2000
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_api_url: None,
            request_timeout_ms: default_request_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl TelemetryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Initial dashboard widget values
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_bucket_secs")]
    pub bucket_secs: f64,

    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    #[serde(default = "default_auto_include")]
    pub auto_include: bool,
}

fn default_bucket_secs() -> f64 {
    5.0
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

fn default_auto_include() -> bool {
    true
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bucket_secs: default_bucket_secs(),
            time_zone: default_time_zone(),
            auto_include: default_auto_include(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or else search the default locations.
    ///
    /// Environment overrides are applied last. Problems that do not stop
    /// startup are returned in [`LoadedConfig::warnings`] so they can be
    /// logged once the subscriber is installed.
    pub fn resolve(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let mut loaded = match explicit {
            Some(path) => LoadedConfig {
                config: Self::load(path)?,
                origin: Some(path.to_path_buf()),
                warnings: Vec::new(),
            },
            None => Self::search(&default_search_paths()),
        };
        loaded.apply_overrides(|key| std::env::var(key).ok());
        Ok(loaded)
    }

    /// Load the first readable config among `paths`, else defaults.
    ///
    /// Files that exist but fail to load are skipped and reported.
    pub fn search(paths: &[PathBuf]) -> LoadedConfig {
        let mut warnings = Vec::new();

        for path in paths {
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        origin: Some(path.clone()),
                        warnings,
                    }
                }
                Err(e) => warnings.push(format!("Skipping config: {}", e)),
            }
        }

        LoadedConfig {
            config: Config::default(),
            origin: None,
            warnings,
        }
    }

    /// Reject values the dashboard could not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_bucket_secs(self.dashboard.bucket_secs) {
            return Err(ConfigError::Invalid(format!(
                "dashboard.bucket_secs must be a multiple of 0.5 between 0.5 and 10, got {}",
                self.dashboard.bucket_secs
            )));
        }
        if !is_offered_time_zone(&self.dashboard.time_zone) {
            return Err(ConfigError::Invalid(format!(
                "dashboard.time_zone '{}' is not one of the selectable zones",
                self.dashboard.time_zone
            )));
        }
        if self.telemetry.request_timeout_ms == 0 || self.telemetry.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "telemetry intervals must be positive".to_string(),
            ));
        }
        if self.server.max_sessions == 0 {
            return Err(ConfigError::Invalid(
                "server.max_sessions must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Defaults for every new dashboard session
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            api_url: self.telemetry.default_api_url.clone(),
            bucket_secs: self.dashboard.bucket_secs,
            time_zone: self.dashboard.time_zone.clone(),
            auto_include: self.dashboard.auto_include,
            poll_interval: self.telemetry.poll_interval(),
            player_names: self.players.clone(),
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            max_sessions: self.server.max_sessions,
        }
    }
}

/// Default config file locations, most specific first
pub fn default_search_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|p| p.join("damage-timeline").join("config.toml")),
        Some(PathBuf::from("./config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// A resolved configuration and how it was obtained
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from, `None` for built-in defaults
    pub origin: Option<PathBuf>,
    /// Non-fatal problems met while loading
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let config = &mut self.config;

        if let Some(host) = lookup("DAMAGE_TIMELINE_HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("DAMAGE_TIMELINE_PORT") {
            match port.parse() {
                Ok(p) => config.server.port = p,
                Err(_) => self
                    .warnings
                    .push(format!("Ignoring invalid DAMAGE_TIMELINE_PORT: {}", port)),
            }
        }
        if let Some(url) = lookup("DAMAGE_TIMELINE_API_URL") {
            config.telemetry.default_api_url = Some(url);
        }
        if let Some(level) = lookup("DAMAGE_TIMELINE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = lookup("DAMAGE_TIMELINE_LOG_FORMAT") {
            config.logging.format = format;
        }
    }

    /// Log where the config came from and every warning.
    ///
    /// Call after the tracing subscriber is installed.
    pub fn report(&self) {
        match &self.origin {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    let zones: String = TIME_ZONE_OPTIONS
        .iter()
        .map(|zone| format!("#   {:<20} {}\n", zone.value, zone.label))
        .collect();

    DEFAULT_CONFIG_TEMPLATE.replace("{time_zones}", &zones)
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Damage Timeline Configuration
#
# Environment variables override these settings:
# - DAMAGE_TIMELINE_HOST
# - DAMAGE_TIMELINE_PORT
# - DAMAGE_TIMELINE_API_URL
# - DAMAGE_TIMELINE_LOG_LEVEL
# - DAMAGE_TIMELINE_LOG_FORMAT

[server]
# Dashboard server host
host = "0.0.0.0"

# Dashboard server port
port = 8050

# Maximum concurrent dashboard connections
max_sessions = 100

[telemetry]
# API address pre-filled in new dashboards
# default_api_url = "http://127.0.0.1:8080"

# Per-request timeout (ms)
request_timeout_ms = 2000

# How often a running dashboard polls the API (ms)
poll_interval_ms = 2000

[dashboard]
# Bucket width in seconds, 0.5 to 10 in steps of 0.5
bucket_secs = 5.0

# Display time zone, one of:
{time_zones}time_zone = "Asia/Singapore"

# Draw every known player, including ones that show up later
auto_include = true

[players]
# Display names by player id; unknown ids show as Player_<id>
"114514" = "Veteran"
"9226643" = "Imita"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8050);
        assert_eq!(config.server.max_sessions, 100);
        assert_eq!(config.telemetry.request_timeout(), Duration::from_secs(2));
        assert_eq!(config.dashboard.time_zone, "Asia/Singapore");
        assert_eq!(config.players.get("114514").map(String::as_str), Some("Veteran"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let file = write_config(&generate_default_config());
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8050);
        assert_eq!(config.telemetry.default_api_url, None);
        assert_eq!(config.telemetry.poll_interval_ms, 2000);
        assert_eq!(config.dashboard.bucket_secs, 5.0);
        assert!(config.dashboard.auto_include);
        assert_eq!(config.players.len(), 2);
        assert_eq!(config.players.get("9226643").map(String::as_str), Some("Imita"));
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
[server]
port = 9000

[dashboard]
bucket_secs = 2.5
"#,
        );
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.dashboard.bucket_secs, 2.5);
        assert_eq!(config.dashboard.time_zone, "Asia/Singapore");
        assert_eq!(config.players.len(), 2);
    }

    #[test]
    fn test_players_table_replaces_seeds() {
        let file = write_config(
            r#"
[players]
"42" = "Answer"
"#,
        );
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.players.len(), 1);
        let session = config.session_config();
        assert_eq!(session.player_names.get("42").map(String::as_str), Some("Answer"));
    }

    #[test]
    fn test_invalid_bucket_rejected() {
        let file = write_config("[dashboard]\nbucket_secs = 0.7\n");
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_time_zone_rejected() {
        let file = write_config("[dashboard]\ntime_zone = \"Mars/Olympus\"\n");
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("[server\nport = ");
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::load(Path::new("/nonexistent/damage-timeline.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    fn defaults() -> LoadedConfig {
        LoadedConfig {
            config: Config::default(),
            origin: None,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_generated_config_lists_offered_zones() {
        let template = generate_default_config();
        let zone_comments: Vec<&str> = template
            .lines()
            .filter(|line| line.starts_with("#   "))
            .collect();

        assert_eq!(zone_comments.len(), TIME_ZONE_OPTIONS.len());
        for option in TIME_ZONE_OPTIONS {
            assert!(
                zone_comments.iter().any(|line| line.contains(option.value)),
                "{} missing from template",
                option.value
            );
        }
        assert!(!template.contains("Europe/Berlin"));
    }

    #[test]
    fn test_search_reports_broken_file() {
        let broken = write_config("[server\nport = ");
        let loaded = Config::search(&[broken.path().to_path_buf()]);

        assert!(loaded.origin.is_none());
        assert_eq!(loaded.config.server.port, 8050);
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("Failed to parse"));
    }

    #[test]
    fn test_search_falls_through_to_next_file() {
        let broken = write_config("[dashboard]\nbucket_secs = 0.7\n");
        let good = write_config("[server]\nport = 9001\n");
        let missing = PathBuf::from("/nonexistent/damage-timeline.toml");

        let loaded = Config::search(&[
            missing,
            broken.path().to_path_buf(),
            good.path().to_path_buf(),
        ]);

        assert_eq!(loaded.origin.as_deref(), Some(good.path()));
        assert_eq!(loaded.config.server.port, 9001);
        assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn test_search_without_files_is_silent() {
        let loaded = Config::search(&[PathBuf::from("/nonexistent/damage-timeline.toml")]);
        assert!(loaded.origin.is_none());
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_resolve_explicit_path_fails_hard() {
        let broken = write_config("[server\nport = ");
        assert!(matches!(
            Config::resolve(Some(broken.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let mut loaded = defaults();
        loaded.apply_overrides(|key| match key {
            "DAMAGE_TIMELINE_PORT" => Some("9100".to_string()),
            "DAMAGE_TIMELINE_API_URL" => Some("http://10.0.0.2:8080".to_string()),
            "DAMAGE_TIMELINE_LOG_FORMAT" => Some("json".to_string()),
            _ => None,
        });
        let config = &loaded.config;

        assert_eq!(config.server.port, 9100);
        assert_eq!(
            config.telemetry.default_api_url.as_deref(),
            Some("http://10.0.0.2:8080")
        );
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_invalid_port_override_ignored() {
        let mut loaded = defaults();
        loaded.apply_overrides(|key| {
            (key == "DAMAGE_TIMELINE_PORT").then(|| "not-a-port".to_string())
        });
        assert_eq!(loaded.config.server.port, 8050);
        assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn test_session_and_api_config() {
        let mut config = Config::default();
        config.telemetry.poll_interval_ms = 500;
        config.server.max_sessions = 3;

        let session = config.session_config();
        assert_eq!(session.poll_interval, Duration::from_millis(500));
        assert_eq!(session.bucket_secs, 5.0);

        let api = config.api_config();
        assert_eq!(api.max_sessions, 3);
        assert_eq!(api.addr(), "0.0.0.0:8050");
    }
}
