//! Process configuration, resolved once from the environment

use crate::error::ConfigError;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_PUSHGATEWAY_URL: &str = "http://localhost:9091";
pub const DEFAULT_PRUNE_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_PRUNE_THRESHOLD_SECS: u64 = 600;

/// Timeout applied to every request sent to the Pushgateway
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(2000);

/// Pruner settings. Built once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Pushgateway base address, always ending in `/`
    pub pushgateway_url: Url,
    /// Time between two prune cycles
    pub prune_interval: Duration,
    /// Groupings older than this are deleted
    pub prune_threshold: Duration,
    pub request_timeout: Duration,
    /// `DEBUG=true` turns on debug logging
    pub debug: bool,
}

impl Config {
    /// Read `PUSHGATEWAY_URL`, `PRUNE_INTERVAL`, `PRUNE_THRESHOLD` and `DEBUG`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through `lookup`. Unset and empty values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |name: &str| {
            let value = lookup(name).filter(|value| !value.is_empty());
            match &value {
                Some(value) => debug!(name, value = %value, "Found environment variable"),
                None => debug!(name, "No environment value found, using default"),
            }
            value
        };

        let raw_url =
            resolve("PUSHGATEWAY_URL").unwrap_or_else(|| DEFAULT_PUSHGATEWAY_URL.to_string());
        let pushgateway_url = base_url(&raw_url).map_err(|_| ConfigError::InvalidUrl {
            name: "PUSHGATEWAY_URL",
            value: raw_url.clone(),
        })?;

        let prune_interval = seconds(
            "PRUNE_INTERVAL",
            resolve("PRUNE_INTERVAL"),
            DEFAULT_PRUNE_INTERVAL_SECS,
        )?;
        if prune_interval.is_zero() {
            return Err(ConfigError::ZeroInterval {
                name: "PRUNE_INTERVAL",
            });
        }
        let prune_threshold = seconds(
            "PRUNE_THRESHOLD",
            resolve("PRUNE_THRESHOLD"),
            DEFAULT_PRUNE_THRESHOLD_SECS,
        )?;

        let debug = resolve("DEBUG").is_some_and(|value| value == "true");

        Ok(Self {
            pushgateway_url,
            prune_interval,
            prune_threshold,
            request_timeout: REQUEST_TIMEOUT,
            debug,
        })
    }

    /// Log the effective settings
    pub fn log_summary(&self) {
        info!("Pushgateway URL: {}", self.pushgateway_url);
        info!("Prune interval: {} seconds.", self.prune_interval.as_secs());
        info!("Prune threshold: {} seconds.", self.prune_threshold.as_secs());
    }
}

fn seconds(
    name: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<Duration, ConfigError> {
    let secs = match value {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { name, value })?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}

/// Parse an http(s) base URL, appending a trailing `/` if missing
pub fn base_url(raw: &str) -> Result<Url, url::ParseError> {
    let url = Url::parse(raw)?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
    }
    Ok(with_trailing_slash(url))
}

pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
