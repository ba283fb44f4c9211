//! Watcher configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const ENV_LOG_FILE_PATH: &str = "LOG_FILE_PATH";
pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
pub const ENV_ERROR_RATE_THRESHOLD: &str = "ERROR_RATE_THRESHOLD";
pub const ENV_WINDOW_SIZE: &str = "WINDOW_SIZE";
pub const ENV_ALERT_COOLDOWN_SEC: &str = "ALERT_COOLDOWN_SEC";
pub const ENV_WEBHOOK_TIMEOUT_SEC: &str = "WEBHOOK_TIMEOUT_SEC";
pub const ENV_NOTIFY_DISABLED: &str = "NOTIFY_DISABLED";

pub const DEFAULT_LOG_FILE: &str = "/var/log/nginx/access_real.log";
pub const DEFAULT_ERROR_RATE_THRESHOLD: f64 = 2.0;
pub const DEFAULT_WINDOW_SIZE: usize = 200;
pub const DEFAULT_ALERT_COOLDOWN_SECS: u64 = 300;
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 5;

/// Rejected configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Resolved watcher configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherConfig {
    pub log_file: PathBuf,
    pub slack_webhook_url: Option<String>,
    /// Error-rate alert threshold, in percent.
    pub error_rate_threshold: f64,
    pub window_size: usize,
    pub alert_cooldown: Duration,
    pub webhook_timeout: Duration,
    pub notify_disabled: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            slack_webhook_url: None,
            error_rate_threshold: DEFAULT_ERROR_RATE_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
            alert_cooldown: Duration::from_secs(DEFAULT_ALERT_COOLDOWN_SECS),
            webhook_timeout: Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
            notify_disabled: false,
        }
    }
}

impl WatcherConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_file = match lookup(ENV_LOG_FILE_PATH) {
            Some(path) if path.trim().is_empty() => {
                return Err(invalid(ENV_LOG_FILE_PATH, &path, "path must not be empty"))
            }
            Some(path) => PathBuf::from(path),
            None => defaults.log_file,
        };

        let slack_webhook_url = lookup(ENV_SLACK_WEBHOOK_URL)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let error_rate_threshold = parse_or(
            &lookup,
            ENV_ERROR_RATE_THRESHOLD,
            defaults.error_rate_threshold,
        )?;
        if !error_rate_threshold.is_finite() || error_rate_threshold < 0.0 {
            return Err(invalid(
                ENV_ERROR_RATE_THRESHOLD,
                &error_rate_threshold.to_string(),
                "threshold must be a non-negative percentage",
            ));
        }

        let window_size: usize = parse_or(&lookup, ENV_WINDOW_SIZE, defaults.window_size)?;
        if window_size == 0 {
            return Err(invalid(ENV_WINDOW_SIZE, "0", "window must hold at least one request"));
        }

        let cooldown_secs: u64 =
            parse_or(&lookup, ENV_ALERT_COOLDOWN_SEC, DEFAULT_ALERT_COOLDOWN_SECS)?;

        let timeout_secs: u64 =
            parse_or(&lookup, ENV_WEBHOOK_TIMEOUT_SEC, DEFAULT_WEBHOOK_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(invalid(ENV_WEBHOOK_TIMEOUT_SEC, "0", "timeout must be at least 1s"));
        }

        let notify_disabled = lookup(ENV_NOTIFY_DISABLED)
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");

        Ok(Self {
            log_file,
            slack_webhook_url,
            error_rate_threshold,
            window_size,
            alert_cooldown: Duration::from_secs(cooldown_secs),
            webhook_timeout: Duration::from_secs(timeout_secs),
            notify_disabled,
        })
    }

    /// Alerts go out only with a webhook configured and delivery not switched off.
    #[must_use]
    pub fn alerts_enabled(&self) -> bool {
        self.slack_webhook_url.is_some() && !self.notify_disabled
    }
}

fn parse_or<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(var, &raw, &e.to_string())),
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
