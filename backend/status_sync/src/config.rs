//! Application configuration loaded from environment variables.

use std::str::FromStr;

use crate::errors::{Result, SyncError};

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the platform API (e.g. https://api.collaboreum.example)
    pub upstream_url: String,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// How often (in seconds) displayed statuses are re-derived from dates
    pub refresh_interval_secs: u64,
    /// How often (in seconds) projects are pulled from the platform API
    pub sync_interval_secs: u64,
    /// Per-request timeout for upstream calls
    pub request_timeout_secs: u64,
    /// Attempts per upstream request before giving up on transient errors
    pub max_fetch_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let upstream_url = lookup("UPSTREAM_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                SyncError::Config("UPSTREAM_URL environment variable is required".to_string())
            })?;

        let config = Config {
            upstream_url: upstream_url.trim_end_matches('/').to_string(),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./collaboreum_status.db".to_string()),
            api_port: parse_or(&lookup, "API_PORT", 3002)?,
            refresh_interval_secs: parse_or(&lookup, "REFRESH_INTERVAL_SECS", 60)?,
            sync_interval_secs: parse_or(&lookup, "SYNC_INTERVAL_SECS", 300)?,
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            max_fetch_attempts: parse_or(&lookup, "MAX_FETCH_ATTEMPTS", 5)?,
        };

        // Zero periods would make the refresher's timers panic.
        for (key, value) in [
            ("REFRESH_INTERVAL_SECS", config.refresh_interval_secs),
            ("SYNC_INTERVAL_SECS", config.sync_interval_secs),
            ("REQUEST_TIMEOUT_SECS", config.request_timeout_secs),
            ("MAX_FETCH_ATTEMPTS", u64::from(config.max_fetch_attempts)),
        ] {
            if value == 0 {
                return Err(SyncError::Config(format!("{key} must be greater than zero")));
            }
        }

        Ok(config)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| SyncError::Config(format!("Invalid {key}"))),
        None => Ok(default),
    }
}
