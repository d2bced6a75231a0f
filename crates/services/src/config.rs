use std::env;
use std::time::Duration;

use reqwest::Url;
use storage::HttpApiConfig;

use crate::error::ConfigError;

pub const ENV_BASE_URL: &str = "QUIZ_API_BASE_URL";
pub const ENV_TOKEN: &str = "QUIZ_API_TOKEN";
pub const ENV_TIMEOUT: &str = "QUIZ_API_TIMEOUT_SECS";
pub const ENV_STALE: &str = "QUIZ_CACHE_STALE_SECS";

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_STALE_SECS: u64 = 30;

/// Remote API and cache settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub cache_stale_time: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_stale_time: Duration::from_secs(DEFAULT_STALE_SECS),
        }
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match lookup(var) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidSeconds { var, raw }),
    }
}

impl ApiConfig {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed values; unset values use defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed values; unset values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(base_url)?;
        }
        config.api_token = lookup(ENV_TOKEN).filter(|token| !token.trim().is_empty());
        config.request_timeout = seconds(&lookup, ENV_TIMEOUT, DEFAULT_TIMEOUT_SECS)?;
        config.cache_stale_time = seconds(&lookup, ENV_STALE, DEFAULT_STALE_SECS)?;
        Ok(config)
    }

    /// Replace the base URL after checking it is an absolute http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` otherwise.
    pub fn with_base_url(mut self, raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        let parsed = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidUrl { raw: raw.clone() })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl { raw });
        }
        self.base_url = raw.trim().trim_end_matches('/').to_string();
        Ok(self)
    }

    #[must_use]
    pub fn http_config(&self) -> HttpApiConfig {
        let config = HttpApiConfig::new(self.base_url.clone()).with_timeout(self.request_timeout);
        match &self.api_token {
            Some(token) => config.with_token(token.clone()),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = ApiConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "https://quiz.example.com/api/"),
            (ENV_TOKEN, "tok"),
            (ENV_TIMEOUT, "5"),
            (ENV_STALE, "0"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://quiz.example.com/api");
        assert_eq!(config.api_token.as_deref(), Some("tok"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_stale_time, Duration::ZERO);
        assert_eq!(config.http_config().api_token.as_deref(), Some("tok"));
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = ApiConfig::from_lookup(lookup(&[(ENV_TIMEOUT, "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidSeconds {
                var: ENV_TIMEOUT,
                raw: "soon".into()
            }
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(ApiConfig::default().with_base_url("ftp://host").is_err());
        assert!(ApiConfig::default().with_base_url("not a url").is_err());
    }

    #[test]
    fn blank_token_is_ignored() {
        let config = ApiConfig::from_lookup(lookup(&[(ENV_TOKEN, "  ")])).unwrap();
        assert_eq!(config.api_token, None);
    }
}
