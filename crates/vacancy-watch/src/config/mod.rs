use crate::workflows::vacancy::domain::RunMode;
use chrono::FixedOffset;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for a watch run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub run: RunConfig,
    pub fetch: FetchConfig,
    pub notify: NotifyConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mode_raw = env::var("RUN_MODE").unwrap_or_else(|_| "scheduled".to_string());
        let mode = RunMode::parse(&mode_raw).ok_or(ConfigError::InvalidRunMode(mode_raw))?;

        let status_file = env::var("STATUS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("status.json"));
        let properties_file = env::var("PROPERTIES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("properties.csv"));

        let notify_on_first_observation = parse_flag("NOTIFY_ON_FIRST_OBSERVATION", false)?;
        let report_utc_offset_hours = parse_number::<i32>("REPORT_UTC_OFFSET_HOURS", 9)?;
        if !(-23..=23).contains(&report_utc_offset_hours) {
            return Err(ConfigError::InvalidUtcOffset(report_utc_offset_hours));
        }

        let timeout_secs = parse_number::<u64>("FETCH_TIMEOUT_SECS", 15)?;
        let max_attempts = parse_number::<u32>("FETCH_MAX_ATTEMPTS", 3)?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidAttempts);
        }
        let backoff_ms = parse_number::<u64>("FETCH_BACKOFF_MS", 1000)?;
        let user_agent = env::var("FETCH_USER_AGENT")
            .unwrap_or_else(|_| format!("vacancy-watch/{}", env!("CARGO_PKG_VERSION")));

        let webhook_url = env::var("NOTIFY_WEBHOOK_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            run: RunConfig {
                mode,
                status_file,
                properties_file,
                notify_on_first_observation,
                report_utc_offset_hours,
            },
            fetch: FetchConfig {
                timeout: Duration::from_secs(timeout_secs),
                max_attempts,
                backoff: Duration::from_millis(backoff_ms),
                user_agent,
            },
            notify: NotifyConfig { webhook_url },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// What a single pass does and where its inputs and state live.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: RunMode,
    pub status_file: PathBuf,
    pub properties_file: PathBuf,
    pub notify_on_first_observation: bool,
    pub report_utc_offset_hours: i32,
}

impl RunConfig {
    /// Offset used to stamp alerts and reports.
    pub fn report_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.report_utc_offset_hours * 3600)
            .ok_or(ConfigError::InvalidUtcOffset(self.report_utc_offset_hours))
    }
}

/// Page fetch timeouts and the bounded retry budget.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default)]
pub struct NotifyConfig {
    pub webhook_url: Option<String>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn parse_number<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            key,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let raw = match env::var(key) {
        Ok(raw) => raw,
        Err(_) => return Ok(default),
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { key, value: raw }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidRunMode(String),
    InvalidNumber { key: &'static str, value: String },
    InvalidFlag { key: &'static str, value: String },
    InvalidAttempts,
    InvalidUtcOffset(i32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRunMode(value) => {
                write!(f, "RUN_MODE must be 'scheduled' or 'manual', got '{value}'")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got '{value}'")
            }
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true or false, got '{value}'")
            }
            ConfigError::InvalidAttempts => write!(f, "FETCH_MAX_ATTEMPTS must be at least 1"),
            ConfigError::InvalidUtcOffset(hours) => {
                write!(f, "REPORT_UTC_OFFSET_HOURS must be within -23..=23, got {hours}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
