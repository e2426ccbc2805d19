//! Extractor configuration.
//!
//! All values have defaults, so an empty YAML document (or no file at all)
//! yields a working configuration. A typical `focus_extract.yaml`:
//!
//! ```yaml
//! request_timeout_secs: 15
//! max_attempts: 3
//! base_delay_ms: 1000
//! overall_timeout_secs: 60
//! ```

use crate::fetch::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Desktop Chrome signature sent on the first attempt.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Desktop Safari signature used after a 403.
pub const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for fetching and estimation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Redirects followed before giving up.
    pub max_redirects: usize,
    /// Total attempts made by the backoff loop, first attempt included.
    pub max_attempts: usize,
    /// Delay before the second attempt; doubles for each further one.
    pub base_delay_ms: u64,
    /// Stop retrying on definitive client errors such as 404 or a persistent
    /// 403. Off by default: every failure uses the full attempt budget.
    pub fail_fast_on_client_errors: bool,
    pub user_agent: String,
    pub fallback_user_agent: String,
    pub words_per_minute: usize,
    /// Upper bound for a whole extraction, backoff sleeps included.
    pub overall_timeout_secs: Option<u64>,
    /// Route Substack posts through the JSON API.
    pub substack_enabled: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            max_redirects: 10,
            max_attempts: 3,
            base_delay_ms: 1000,
            fail_fast_on_client_errors: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fallback_user_agent: FALLBACK_USER_AGENT.to_string(),
            words_per_minute: 200,
            overall_timeout_secs: None,
            substack_enabled: true,
        }
    }
}

impl ExtractorConfig {
    /// Load a YAML configuration file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        info!(?config.max_attempts, ?config.request_timeout_secs, "Loaded extractor configuration");
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a map.
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
                path: "<inline>".to_string(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        if self.words_per_minute == 0 {
            return Err(ConfigError::Invalid("words_per_minute must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn overall_timeout(&self) -> Option<Duration> {
        self.overall_timeout_secs.map(Duration::from_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        if self.fail_fast_on_client_errors {
            RetryPolicy::TransientOnly
        } else {
            RetryPolicy::All
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fetch_policy() {
        let config = ExtractorConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay(), Duration::from_millis(1000));
        assert_eq!(config.words_per_minute, 200);
        assert!(config.overall_timeout().is_none());
        assert_eq!(config.retry_policy(), RetryPolicy::All);
        assert_ne!(config.user_agent, config.fallback_user_agent);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ExtractorConfig::from_yaml("max_attempts: 5\noverall_timeout_secs: 30\n").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.overall_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.request_timeout_secs, 15);
        assert!(config.substack_enabled);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ExtractorConfig::from_yaml("  \n").unwrap(), ExtractorConfig::default());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = ExtractorConfig::from_yaml("max_attempts: 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = ExtractorConfig::from_yaml("max_attempts: [oops").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus_extract.yaml");
        std::fs::write(&path, "words_per_minute: 250\nsubstack_enabled: false\n").unwrap();

        let config = ExtractorConfig::load(&path).unwrap();
        assert_eq!(config.words_per_minute, 250);
        assert!(!config.substack_enabled);
    }

    #[test]
    fn test_fail_fast_flag_selects_transient_policy() {
        let config = ExtractorConfig::from_yaml("fail_fast_on_client_errors: true").unwrap();
        assert_eq!(config.retry_policy(), RetryPolicy::TransientOnly);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ExtractorConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
