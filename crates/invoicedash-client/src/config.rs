//! Runtime configuration resolved from the process environment.
//!
//! Supported env vars:
//! - `INVOICEDASH_HOME`: data directory holding `analytics.db`
//! - `VANNA_API_BASE_URL`: base URL of the text-to-SQL service
//! - `INVOICEDASH_CHAT_TIMEOUT_SECS`: outbound chat request timeout
//! - `INVOICEDASH_INGEST_ERROR_THRESHOLD`: errors tolerated before a batch aborts
//! - `INVOICEDASH_PROGRESS_EVERY`: processed-record increment between progress logs

use std::path::PathBuf;
use std::time::Duration;

pub const HOME_ENV: &str = "INVOICEDASH_HOME";
pub const CHAT_BASE_URL_ENV: &str = "VANNA_API_BASE_URL";
pub const CHAT_TIMEOUT_ENV: &str = "INVOICEDASH_CHAT_TIMEOUT_SECS";
pub const ERROR_THRESHOLD_ENV: &str = "INVOICEDASH_INGEST_ERROR_THRESHOLD";
pub const PROGRESS_EVERY_ENV: &str = "INVOICEDASH_PROGRESS_EVERY";

pub const DEFAULT_CHAT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_ERROR_THRESHOLD: usize = 10;
pub const DEFAULT_PROGRESS_EVERY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub home: Option<PathBuf>,
    pub chat_base_url: String,
    pub chat_timeout: Duration,
    pub ingest_error_threshold: usize,
    pub progress_every: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home: None,
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            chat_timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
            ingest_error_threshold: DEFAULT_ERROR_THRESHOLD,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so tests never touch the
    /// real process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            home: non_empty(HOME_ENV).map(PathBuf::from),
            chat_base_url: non_empty(CHAT_BASE_URL_ENV)
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or(defaults.chat_base_url),
            chat_timeout: non_empty(CHAT_TIMEOUT_ENV)
                .and_then(|value| value.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.chat_timeout),
            ingest_error_threshold: non_empty(ERROR_THRESHOLD_ENV)
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(defaults.ingest_error_threshold),
            progress_every: non_empty(PROGRESS_EVERY_ENV)
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|every| *every > 0)
                .unwrap_or(defaults.progress_every),
        }
    }

    pub fn chat_endpoint(&self) -> String {
        format!("{}/chat", self.chat_base_url)
    }
}
