use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::{CurlOptions, DEFAULT_MAX_BODY_BYTES};
use crate::retry::{RetryMode, RetryPolicy};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per fetch (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (0 = retry immediately).
    #[serde(default)]
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    /// "any" retries every failure; "transient" only timeouts, connection errors, 408/429/5xx.
    #[serde(default)]
    pub mode: RetryMode,
}

fn default_max_delay_secs() -> u64 {
    30
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.0,
            max_delay_secs: default_max_delay_secs(),
            mode: RetryMode::Any,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        if self.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }
        let base_delay = Duration::try_from_secs_f64(self.base_delay_secs)
            .with_context(|| format!("invalid retry.base_delay_secs {}", self.base_delay_secs))?;
        Ok(RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay,
            max_delay: Duration::from_secs(self.max_delay_secs),
            mode: self.mode,
        })
    }
}

/// Global configuration loaded from `~/.config/refetch/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefetchConfig {
    /// Connect timeout per attempt, in seconds.
    pub connect_timeout_secs: u64,
    /// Total time limit per attempt, in seconds.
    pub attempt_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Largest response body accepted per attempt, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
    /// Extra request headers sent with every attempt.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_max_body_bytes() -> u64 {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for RefetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            attempt_timeout_secs: 30,
            retry: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            headers: HashMap::new(),
        }
    }
}

impl RefetchConfig {
    /// Effective retry policy (config section or defaults).
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    /// Transport settings. Zero timeouts are rejected: curl would treat them as unlimited.
    pub fn curl_options(&self) -> Result<CurlOptions> {
        if self.connect_timeout_secs == 0 {
            anyhow::bail!("connect_timeout_secs must be at least 1");
        }
        if self.attempt_timeout_secs == 0 {
            anyhow::bail!("attempt_timeout_secs must be at least 1");
        }
        let opts = CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            attempt_timeout: Duration::from_secs(self.attempt_timeout_secs),
            headers: self.headers.clone(),
            max_body_bytes: self.max_body_bytes,
        };
        opts.validate()?;
        Ok(opts)
    }

    /// Check every derived setting; called on load so bad files fail early.
    pub fn validate(&self) -> Result<()> {
        self.retry_policy()?;
        self.curl_options()?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("refetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RefetchConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] with an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<RefetchConfig> {
    if !path.exists() {
        let default_cfg = RefetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: RefetchConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RefetchConfig::default();
        assert_eq!(cfg.connect_timeout_secs, 15);
        assert_eq!(cfg.attempt_timeout_secs, 30);
        assert!(cfg.retry.is_none());
        assert!(cfg.headers.is_empty());
        assert_eq!(cfg.retry_policy().unwrap(), RetryPolicy::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = RefetchConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: RefetchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_retry_section() {
        let toml = r#"
            connect_timeout_secs = 5
            attempt_timeout_secs = 10

            [retry]
            max_attempts = 4
            base_delay_secs = 0.5
            max_delay_secs = 8
            mode = "transient"

            [headers]
            Accept = "application/json"
        "#;
        let cfg: RefetchConfig = toml::from_str(toml).unwrap();
        let policy = cfg.retry_policy().unwrap();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(8));
        assert_eq!(policy.mode, RetryMode::Transient);

        let curl = cfg.curl_options().unwrap();
        assert_eq!(curl.connect_timeout, Duration::from_secs(5));
        assert_eq!(curl.attempt_timeout, Duration::from_secs(10));
        assert_eq!(
            curl.headers.get("Accept").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(curl.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn zero_timeouts_rejected() {
        let zero_attempt = RefetchConfig {
            attempt_timeout_secs: 0,
            ..RefetchConfig::default()
        };
        let zero_connect = RefetchConfig {
            connect_timeout_secs: 0,
            ..RefetchConfig::default()
        };
        assert!(zero_attempt.curl_options().is_err());
        assert!(zero_connect.validate().is_err());
    }

    #[test]
    fn max_body_bytes_configurable() {
        let toml = r#"
            connect_timeout_secs = 5
            attempt_timeout_secs = 10
            max_body_bytes = 4096
        "#;
        let cfg: RefetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.curl_options().unwrap().max_body_bytes, 4096);

        let zero = RefetchConfig {
            max_body_bytes: 0,
            ..RefetchConfig::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn load_rejects_zero_attempt_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "connect_timeout_secs = 5\nattempt_timeout_secs = 0\n").unwrap();
        assert!(load_or_init_at(&path).is_err());
    }

    #[test]
    fn config_toml_retry_defaults_fill_in() {
        let toml = r#"
            connect_timeout_secs = 5
            attempt_timeout_secs = 10

            [retry]
            max_attempts = 2
        "#;
        let cfg: RefetchConfig = toml::from_str(toml).unwrap();
        let policy = cfg.retry_policy().unwrap();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.base_delay, Duration::ZERO);
        assert_eq!(policy.mode, RetryMode::Any);
    }

    #[test]
    fn zero_attempts_rejected() {
        let retry = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        assert!(retry.to_policy().is_err());
    }

    #[test]
    fn negative_delay_rejected() {
        let retry = RetryConfig {
            base_delay_secs: -1.0,
            ..RetryConfig::default()
        };
        assert!(retry.to_policy().is_err());
    }

    #[test]
    fn load_or_init_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_at(&path).unwrap();
        assert_eq!(cfg, RefetchConfig::default());
        assert!(path.exists());
        let again = load_or_init_at(&path).unwrap();
        assert_eq!(again, cfg);
    }

    #[test]
    fn load_or_init_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "connect_timeout_secs = 1\nattempt_timeout_secs = 2\n[retry]\nmax_attempts = 7\n",
        )
        .unwrap();
        let cfg = load_or_init_at(&path).unwrap();
        assert_eq!(cfg.attempt_timeout_secs, 2);
        assert_eq!(cfg.retry_policy().unwrap().max_attempts, 7);
    }
}
