//! Environment configuration.

use std::env;
use std::time::Duration;

pub const DEFAULT_RESULTS_LIMIT: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Verbose logging for store dispatch and navigation transitions.
    pub debug: bool,
    /// Log filter directive handed to the tracing subscriber.
    pub log_filter: Option<String>,
    pub results_limit: usize,
    pub request_timeout: Duration,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_filter: None,
            results_limit: DEFAULT_RESULTS_LIMIT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            debug: env_flag("SEARCH_UI_DEBUG"),
            log_filter: env_string_opt("SEARCH_UI_LOG"),
            results_limit: env_usize_opt("SEARCH_UI_RESULTS_LIMIT")
                .filter(|limit| *limit > 0)
                .unwrap_or(DEFAULT_RESULTS_LIMIT),
            request_timeout: env_usize_opt("SEARCH_UI_REQUEST_TIMEOUT_MS")
                .filter(|millis| *millis > 0)
                .map(|millis| Duration::from_millis(millis as u64))
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_usize_opt(key: &str) -> Option<usize> {
    env_string_opt(key).and_then(|value| value.trim().parse().ok())
}
