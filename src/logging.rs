//! Tracing setup for hosts embedding the framework.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the host. `init_tracing` is a convenience for hosts that want the default
//! console output.
//!
//! Filter precedence: `RUST_LOG`, then `SEARCH_UI_LOG`, then the debug flag.

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub debug: bool,
    pub filter: Option<String>,
}

impl From<&EnvConfig> for LoggingConfig {
    fn from(config: &EnvConfig) -> Self {
        Self {
            debug: config.debug,
            filter: config.log_filter.clone(),
        }
    }
}

impl LoggingConfig {
    fn env_filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
        if let Some(directive) = self.filter.as_deref() {
            if let Ok(filter) = EnvFilter::try_new(directive) {
                return filter;
            }
        }
        if self.debug {
            EnvFilter::new("search_ui=debug")
        } else {
            EnvFilter::new("search_ui=info")
        }
    }
}

/// Install a compact fmt subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| err.to_string())
}
