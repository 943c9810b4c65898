//! Runtime configuration: defaults, optional TOML file, environment overrides.
//!
//! Precedence, lowest first: built-in defaults, the TOML file passed with
//! `--config`, the `INTRADAY_*` environment variables, then command-line
//! flags (applied by the binary).
//!
//! ```toml
//! [provider]
//! base_url = "https://query1.finance.yahoo.com"
//! timeout_secs = 30
//!
//! [retry]
//! enabled = true
//! max_attempts = 3
//! delay_ms = 2000
//!
//! [pivot]
//! on_duplicate = "reject"
//!
//! [defaults]
//! symbol = "AAPL"
//! duration = "30d"
//! interval = "15m"
//! ```

use std::{num::NonZeroU32, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use shared_utils::env::env_override;
use thiserror::Error;
use tracing::debug;

use crate::{
    models::timeframe::{Interval, Period},
    pipeline::reshape::DuplicatePolicy,
    providers::yahoo_rest::provider::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT},
    retry::RetryPolicy,
};

pub const BASE_URL_ENV: &str = "INTRADAY_BASE_URL";
pub const USER_AGENT_ENV: &str = "INTRADAY_USER_AGENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub retry: RetryConfig,
    pub pivot: PivotConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Total attempts, the first call included.
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    /// The policy to wrap the provider in, or `None` when retries are off.
    pub fn policy(&self) -> Result<Option<RetryPolicy>, ConfigError> {
        if !self.enabled {
            return Ok(None);
        }
        let max_attempts = NonZeroU32::new(self.max_attempts)
            .ok_or_else(|| ConfigError::Invalid("retry.max_attempts must be at least 1".into()))?;
        Ok(Some(RetryPolicy::new(
            max_attempts,
            Duration::from_millis(self.delay_ms),
        )))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PivotConfig {
    pub on_duplicate: DuplicatePolicy,
}

/// Values preselected in the prompts and used when a flag is omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub symbol: String,
    pub duration: Period,
    pub interval: Interval,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            duration: Period::default(),
            interval: Interval::default(),
        }
    }
}

impl AppConfig {
    /// Overlays the `INTRADAY_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        if let Some(url) = env_override(BASE_URL_ENV) {
            debug!(%url, "base url overridden from environment");
            self.provider.base_url = url;
        }
        if let Some(agent) = env_override(USER_AGENT_ENV) {
            self.provider.user_agent = agent;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.base_url cannot be empty".into()));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid("provider.timeout_secs must be positive".into()));
        }
        self.retry.policy()?;
        Ok(())
    }
}

/// Parse and validate a config from a TOML string. Missing sections and keys
/// take their defaults.
pub fn load_config_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(toml_str)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config_path(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    load_config_str(&text)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = load_config_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.defaults.symbol, "AAPL");
        assert_eq!(config.defaults.duration, Period::ThirtyDays);
        assert_eq!(config.defaults.interval, Interval::FifteenMinutes);
        assert_eq!(config.pivot.on_duplicate, DuplicatePolicy::Reject);
    }

    #[test]
    fn default_retry_matches_three_attempts_two_seconds_apart() {
        let policy = RetryConfig::default().policy().unwrap().unwrap();
        assert_eq!(policy.max_attempts.get(), 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = load_config_str(
            r#"
            [retry]
            delay_ms = 500

            [pivot]
            on_duplicate = "last-wins"

            [defaults]
            interval = "5m"
            "#,
        )
        .unwrap();
        assert_eq!(config.retry.delay_ms, 500);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.pivot.on_duplicate, DuplicatePolicy::LastWins);
        assert_eq!(config.defaults.interval, Interval::FiveMinutes);
        assert_eq!(config.defaults.duration, Period::ThirtyDays);
    }

    #[test]
    fn unknown_keys_and_bad_values_are_rejected() {
        assert!(matches!(
            load_config_str("[retry]\nattempts = 3"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            load_config_str("[defaults]\nduration = \"2d\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            load_config_str("[retry]\nmax_attempts = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn disabled_retry_has_no_policy_even_with_zero_attempts() {
        let config = load_config_str("[retry]\nenabled = false\nmax_attempts = 0").unwrap();
        assert_eq!(config.retry.policy().unwrap(), None);
    }

    #[test]
    fn loads_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[provider]\ntimeout_secs = 5").unwrap();
        let config = load_config_path(file.path()).unwrap();
        assert_eq!(config.provider.timeout_secs, 5);

        let err = load_config_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    #[serial]
    fn environment_overrides_file_values() {
        unsafe {
            std::env::set_var(BASE_URL_ENV, "http://127.0.0.1:9999");
            std::env::remove_var(USER_AGENT_ENV);
        }
        let mut config = load_config_str("[provider]\nbase_url = \"http://from-file\"").unwrap();
        config.apply_env_overrides();
        assert_eq!(config.provider.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.provider.user_agent, DEFAULT_USER_AGENT);
        unsafe { std::env::remove_var(BASE_URL_ENV) };
    }
}
