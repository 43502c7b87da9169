//! # Monitor Configuration
//!
//! Sources, lowest to highest precedence:
//! 1.  Built-in defaults (profile defaults for categories and thresholds).
//! 2.  The JSON config file (`monitor_coldchain.conf`, or `--config-path`).
//! 3.  Environment variables (`MONITOR_*`, `.env` honoured) and CLI flags.
//!
//! The merged `ConfigArgs` is then validated into an immutable `MonitorConfig`.

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::domain::{Category, Profile};
use crate::errors::MonitorError;
use crate::views::Thresholds;

pub const DEFAULT_CONFIG_FILE: &str = "monitor_coldchain.conf";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_SOCKET_URL: &str = "ws://localhost:8001/ws";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_HISTORY_WINDOW: usize = 20;
pub const DEFAULT_CHART_POINTS: usize = 10;

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(name = "monitor_coldchain", about = "Console monitor for cold-chain shipments", version)]
#[serde(rename_all = "camelCase")]
pub struct ConfigArgs {
    #[clap(long, env = "MONITOR_API_URL", help = "Base URL of the telemetry REST API.")]
    pub api_url: Option<String>,

    #[clap(long, env = "MONITOR_SOCKET_URL", help = "WebSocket URL for pushed telemetry and alerts.")]
    pub socket_url: Option<String>,

    #[clap(long, env = "MONITOR_PROFILE", help = "Dashboard profile: shipments or deliveries.")]
    pub profile: Option<Profile>,

    #[clap(long, env = "MONITOR_CATEGORIES", value_delimiter = ',', help = "Comma separated data categories to poll (defaults to the profile's).")]
    pub categories: Option<Vec<Category>>,

    #[clap(long, env = "MONITOR_POLL_INTERVAL_MS", help = "Milliseconds between refresh cycles.")]
    pub poll_interval_ms: Option<u64>,

    #[clap(long, env = "MONITOR_REQUEST_TIMEOUT_MS", help = "Per-request timeout in milliseconds.")]
    pub request_timeout_ms: Option<u64>,

    #[clap(long, env = "MONITOR_MAX_RETRIES", help = "Retries for transient HTTP failures (0 disables).")]
    pub max_retries: Option<u32>,

    #[clap(long, env = "MONITOR_AUTH_TOKEN", hide_env_values = true, help = "Bearer token sent with every request.")]
    pub auth_token: Option<String>,

    #[clap(long, env = "MONITOR_HISTORY_WINDOW", help = "Series points kept in the store.")]
    pub history_window: Option<usize>,

    #[clap(long, env = "MONITOR_CHART_POINTS", help = "Points drawn per chart.")]
    pub chart_points: Option<usize>,

    #[clap(long, env = "MONITOR_ENABLE_SOCKET", help = "Open the WebSocket channel (true/false).")]
    pub enable_socket: Option<bool>,

    #[clap(long, env = "MONITOR_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "MONITOR_LOG_DIR", help = "Directory for rolling log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "MONITOR_LOG_LEVEL", help = "Logging level or filter directive (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    /// Partial threshold table; only the JSON file can set it.
    #[clap(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Value>,
}

impl ConfigArgs {
    /// `other` wins wherever it has a value.
    fn merge(self, other: ConfigArgs) -> ConfigArgs {
        ConfigArgs {
            api_url: other.api_url.or(self.api_url),
            socket_url: other.socket_url.or(self.socket_url),
            profile: other.profile.or(self.profile),
            categories: other.categories.or(self.categories),
            poll_interval_ms: other.poll_interval_ms.or(self.poll_interval_ms),
            request_timeout_ms: other.request_timeout_ms.or(self.request_timeout_ms),
            max_retries: other.max_retries.or(self.max_retries),
            auth_token: other.auth_token.or(self.auth_token),
            history_window: other.history_window.or(self.history_window),
            chart_points: other.chart_points.or(self.chart_points),
            enable_socket: other.enable_socket.or(self.enable_socket),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            thresholds: match (self.thresholds, other.thresholds) {
                (Some(mut base), Some(overlay)) => {
                    merge_json(&mut base, overlay);
                    Some(base)
                }
                (base, overlay) => overlay.or(base),
            },
        }
    }
}

/// Fully resolved, validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub api_url: Url,
    pub socket_url: Url,
    pub profile: Profile,
    pub categories: Vec<Category>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub auth_token: Option<String>,
    pub history_window: usize,
    pub chart_points: usize,
    pub thresholds: Thresholds,
    pub enable_socket: bool,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

/// Loads `.env`, then the configuration from the process arguments.
pub fn load_config() -> Result<MonitorConfig, MonitorError> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("loaded environment from {}", path.display());
    }
    load_config_from(std::env::args_os())
}

/// Same as [`load_config`] for an explicit argument list (first item is the
/// program name). Does not read `.env`.
pub fn load_config_from<I, T>(args: I) -> Result<MonitorConfig, MonitorError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = ConfigArgs::try_parse_from(args).map_err(|e| MonitorError::Config(e.to_string()))?;
    resolve(cli)
}

/// Merges the config file under `cli` and validates the result.
pub fn resolve(cli: ConfigArgs) -> Result<MonitorConfig, MonitorError> {
    let explicit = cli.config_path.is_some();
    let path = cli
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let merged = match read_config_file(&path, explicit)? {
        Some(file) => file.merge(cli),
        None => cli,
    };
    MonitorConfig::from_args(merged)
}

fn read_config_file(path: &Path, explicit: bool) -> Result<Option<ConfigArgs>, MonitorError> {
    if !path.exists() {
        if explicit {
            return Err(MonitorError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        tracing::info!(
            "Config file not found at {}. Using defaults and environment/CLI variables.",
            path.display()
        );
        return Ok(None);
    }

    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str::<ConfigArgs>(&raw).map_err(|e| e.to_string()));

    match parsed {
        Ok(file) => Ok(Some(file)),
        Err(e) if explicit => Err(MonitorError::Config(format!(
            "failed to load config file {}: {}",
            path.display(),
            e
        ))),
        Err(e) => {
            tracing::warn!(
                "Failed to load config file {}: {}. Falling back to other sources.",
                path.display(),
                e
            );
            Ok(None)
        }
    }
}

/// Every polled category must be pollable and fill its own store slot.
fn check_categories(categories: &[Category]) -> Result<(), MonitorError> {
    for (i, category) in categories.iter().enumerate() {
        if !category.is_pollable() {
            return Err(MonitorError::Config(format!(
                "category '{}' is loaded on demand and cannot be polled",
                category
            )));
        }
        if let Some(other) = categories[..i].iter().find(|c| c.slot() == category.slot()) {
            return Err(MonitorError::Config(format!(
                "categories '{}' and '{}' both fill the {} slot",
                other,
                category,
                category.slot()
            )));
        }
    }
    Ok(())
}

impl MonitorConfig {
    pub fn from_args(args: ConfigArgs) -> Result<Self, MonitorError> {
        let profile = args.profile.unwrap_or_default();

        let api_url = parse_url(
            args.api_url.as_deref().unwrap_or(DEFAULT_API_URL),
            &["http", "https"],
            "api url",
        )?;
        let socket_url = parse_url(
            args.socket_url.as_deref().unwrap_or(DEFAULT_SOCKET_URL),
            &["ws", "wss"],
            "socket url",
        )?;

        let categories = args.categories.unwrap_or_else(|| profile.categories());
        if categories.is_empty() {
            return Err(MonitorError::Config("at least one category is required".into()));
        }
        check_categories(&categories)?;

        let poll_interval = positive_ms(args.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS, "poll interval")?;
        let request_timeout =
            positive_ms(args.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS, "request timeout")?;

        let history_window = args.history_window.unwrap_or(DEFAULT_HISTORY_WINDOW);
        let chart_points = args.chart_points.unwrap_or(DEFAULT_CHART_POINTS);
        if history_window == 0 || chart_points == 0 {
            return Err(MonitorError::Config(
                "history window and chart points must be at least 1".into(),
            ));
        }

        let thresholds = match args.thresholds {
            Some(overlay) => {
                let mut base = serde_json::to_value(profile.thresholds())?;
                merge_json(&mut base, overlay);
                serde_json::from_value::<Thresholds>(base)
                    .map_err(|e| MonitorError::Config(format!("invalid thresholds: {}", e)))?
            }
            None => profile.thresholds(),
        };
        thresholds.validate().map_err(MonitorError::Config)?;

        Ok(Self {
            api_url,
            socket_url,
            profile,
            categories,
            poll_interval,
            request_timeout,
            max_retries: args.max_retries.unwrap_or(0),
            auth_token: args.auth_token.filter(|t| !t.trim().is_empty()),
            history_window,
            chart_points,
            thresholds,
            enable_socket: args.enable_socket.unwrap_or(true),
            log_dir: args.log_dir,
            log_level: args.log_level.unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_url(raw: &str, schemes: &[&str], what: &str) -> Result<Url, MonitorError> {
    let url = Url::parse(raw).map_err(|e| MonitorError::Config(format!("invalid {} '{}': {}", what, raw, e)))?;
    if !schemes.contains(&url.scheme()) {
        return Err(MonitorError::Config(format!(
            "{} '{}' must use one of: {}",
            what,
            raw,
            schemes.join(", ")
        )));
    }
    Ok(url)
}

fn positive_ms(value: Option<u64>, default: u64, what: &str) -> Result<Duration, MonitorError> {
    match value.unwrap_or(default) {
        0 => Err(MonitorError::Config(format!("{} must be greater than zero", what))),
        ms => Ok(Duration::from_millis(ms)),
    }
}

/// Recursively overlays `overlay` onto `base`. Objects merge key by key,
/// everything else is replaced.
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::Limit;
    use std::io::Write;

    fn write_conf(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_follow_the_profile() {
        let cfg = MonitorConfig::from_args(ConfigArgs::default()).unwrap();
        assert_eq!(cfg.api_url.as_str(), "http://localhost:8000/");
        assert_eq!(cfg.socket_url.as_str(), DEFAULT_SOCKET_URL);
        assert_eq!(cfg.profile, Profile::Shipments);
        assert_eq!(cfg.categories, Profile::Shipments.categories());
        assert_eq!(cfg.thresholds, Thresholds::default());
        assert_eq!(cfg.max_retries, 0);
        assert!(cfg.enable_socket);
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));

        let deliveries = MonitorConfig::from_args(ConfigArgs {
            profile: Some(Profile::Deliveries),
            ..ConfigArgs::default()
        })
        .unwrap();
        assert_eq!(deliveries.categories, Profile::Deliveries.categories());
        assert_eq!(deliveries.thresholds.temperature, Limit::new(7.0, 8.0));
    }

    #[test]
    fn cli_flags_parse() {
        let file = write_conf("{}");
        let cfg = load_config_from([
            "monitor_coldchain",
            "--config-path",
            file.path().to_str().unwrap(),
            "--api-url",
            "http://backend:9000",
            "--profile",
            "deliveries",
            "--categories",
            "kpis,alerts",
            "--poll-interval-ms",
            "300000",
            "--enable-socket",
            "false",
        ])
        .unwrap();

        assert_eq!(cfg.api_url.as_str(), "http://backend:9000/");
        assert_eq!(cfg.profile, Profile::Deliveries);
        assert_eq!(cfg.categories, vec![Category::Kpis, Category::Alerts]);
        assert_eq!(cfg.poll_interval, Duration::from_secs(300));
        assert!(!cfg.enable_socket);
    }

    #[test]
    fn file_values_sit_under_cli_values() {
        let file = write_conf(
            r#"{
                "apiUrl": "http://from-file:8000",
                "pollIntervalMs": 2000,
                "profile": "deliveries",
                "thresholds": { "temperature": { "alert": 9 } }
            }"#,
        );

        let cfg = resolve(ConfigArgs {
            config_path: Some(file.path().to_path_buf()),
            poll_interval_ms: Some(1000),
            ..ConfigArgs::default()
        })
        .unwrap();

        assert_eq!(cfg.api_url.host_str(), Some("from-file"));
        assert_eq!(cfg.poll_interval, Duration::from_secs(1));
        // partial override keeps the profile's warning level
        assert_eq!(cfg.thresholds.temperature, Limit::new(7.0, 9.0));
        assert_eq!(cfg.thresholds.vibration, Limit::new(2.0, 3.0));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let zero = MonitorConfig::from_args(ConfigArgs {
            poll_interval_ms: Some(0),
            ..ConfigArgs::default()
        });
        assert!(matches!(zero, Err(MonitorError::Config(_))));

        let bad_url = MonitorConfig::from_args(ConfigArgs {
            api_url: Some("not a url".into()),
            ..ConfigArgs::default()
        });
        assert!(matches!(bad_url, Err(MonitorError::Config(_))));

        let wrong_scheme = MonitorConfig::from_args(ConfigArgs {
            socket_url: Some("http://localhost:8001/ws".into()),
            ..ConfigArgs::default()
        });
        assert!(matches!(wrong_scheme, Err(MonitorError::Config(_))));

        let inverted = MonitorConfig::from_args(ConfigArgs {
            thresholds: Some(serde_json::json!({"humidity": {"warning": 90, "alert": 80}})),
            ..ConfigArgs::default()
        });
        assert!(matches!(inverted, Err(MonitorError::Config(_))));
    }

    #[test]
    fn overlapping_categories_are_rejected() {
        for list in ["telemetry,latest_telemetry", "alerts,active_alerts", "kpis,kpis", "active_deliveries"] {
            let result = load_config_from(["monitor_coldchain", "--categories", list]);
            assert!(matches!(result, Err(MonitorError::Config(_))), "{}", list);
        }
        let ok = load_config_from(["monitor_coldchain", "--categories", "latest_telemetry,active_alerts,kpis"]).unwrap();
        assert_eq!(ok.categories.len(), 3);
    }

    #[test]
    fn explicit_config_path_must_exist_and_parse() {
        let missing = resolve(ConfigArgs {
            config_path: Some(PathBuf::from("/definitely/not/here.conf")),
            ..ConfigArgs::default()
        });
        assert!(matches!(missing, Err(MonitorError::Config(_))));

        let broken = write_conf("{ not json");
        let result = resolve(ConfigArgs {
            config_path: Some(broken.path().to_path_buf()),
            ..ConfigArgs::default()
        });
        assert!(matches!(result, Err(MonitorError::Config(_))));
    }

    #[test]
    fn blank_token_is_dropped() {
        let cfg = MonitorConfig::from_args(ConfigArgs {
            auth_token: Some("  ".into()),
            ..ConfigArgs::default()
        })
        .unwrap();
        assert!(cfg.auth_token.is_none());
    }
}
