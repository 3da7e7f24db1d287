use std::time::Duration;

use search_ui::config::{EnvConfig, DEFAULT_REQUEST_TIMEOUT};

pub const DEFAULT_BASE_URL: &str = "https://liveapi.yext.com";
pub const DEFAULT_API_VERSION: &str = "20190101";

/// Transport configuration for the autocomplete endpoints.
#[derive(Debug, Clone)]
pub struct SearchApiConfig {
    /// Sent as the `api_key` query parameter.
    pub api_key: String,
    /// Experience (answers) key the universal and filter endpoints are scoped to.
    pub experience_key: String,
    pub base_url: String,
    /// Sent as the `v` query parameter.
    pub version: String,
    pub timeout: Duration,
}

impl Default for SearchApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            experience_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl SearchApiConfig {
    pub fn new(api_key: impl Into<String>, experience_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            experience_key: experience_key.into(),
            ..Self::default()
        }
    }

    /// Take the request timeout from the host's environment configuration.
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        self.timeout = env.request_timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_live_api() {
        let config = SearchApiConfig::new("key", "answers");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.version, "20190101");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn env_config_supplies_timeout() {
        let env = EnvConfig {
            request_timeout: Duration::from_millis(750),
            ..EnvConfig::default()
        };
        let config = SearchApiConfig::new("key", "answers").with_env(&env);
        assert_eq!(config.timeout, Duration::from_millis(750));
    }
}
