//! # Configuration Module
//!
//! Runtime settings read from the environment (and optionally a `.env` file):
//! database connection and log output format.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

// Environment variable names
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "DATABASE_MAX_CONNECTIONS";
pub const ACQUIRE_TIMEOUT_VAR: &str = "DATABASE_ACQUIRE_TIMEOUT_SECS";
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";

// Defaults
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable compact lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" | "compact" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => bail!("unknown log format '{other}', expected 'pretty' or 'json'"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// PostgreSQL connection string; only needed by commands that read the database
    pub database_url: Option<String>,
    /// Upper bound of the connection pool
    pub max_connections: u32,
    /// How long to wait for a pooled connection
    pub acquire_timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration from a `.env` style file
    ///
    /// Variables already set in the process environment take precedence over
    /// the file, the same way `dotenv` loads files.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let mut file_vars = HashMap::new();
        let iter = dotenv::from_path_iter(path)
            .with_context(|| format!("Failed to open env file {}", path.display()))?;
        for item in iter {
            let (key, value) =
                item.with_context(|| format!("Failed to parse env file {}", path.display()))?;
            file_vars.insert(key, value);
        }

        Self::from_lookup(|key| env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.database_url = lookup(DATABASE_URL_VAR).filter(|url| !url.trim().is_empty());

        if let Some(value) = lookup(MAX_CONNECTIONS_VAR) {
            let max: u32 = value
                .trim()
                .parse()
                .with_context(|| format!("{MAX_CONNECTIONS_VAR} must be a number, got '{value}'"))?;
            if max == 0 {
                bail!("{MAX_CONNECTIONS_VAR} must be at least 1");
            }
            config.max_connections = max;
        }

        if let Some(value) = lookup(ACQUIRE_TIMEOUT_VAR) {
            let secs: u64 = value
                .trim()
                .parse()
                .with_context(|| format!("{ACQUIRE_TIMEOUT_VAR} must be a number of seconds, got '{value}'"))?;
            config.acquire_timeout = Duration::from_secs(secs);
        }

        if let Some(value) = lookup(LOG_FORMAT_VAR) {
            config.log_format = value.parse()?;
        }

        Ok(config)
    }

    /// The database URL, or an error naming the missing variable
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .with_context(|| format!("{DATABASE_URL_VAR} must be set"))
    }
}
