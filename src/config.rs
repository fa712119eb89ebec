//! Configuration loaded from `scribe.toml`.
//!
//! [`ScribeConfig`] holds every tunable of the demo. Keys absent from the
//! file fall back to defaults matching the managed service's documented
//! provisioning times. The `SCRIBE_API_TOKEN` environment variable takes
//! precedence over the file for the API token.

use serde::Deserialize;
use std::path::Path;

use crate::error::ScribeError;

/// Top-level configuration loaded from `scribe.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScribeConfig {
    /// Base URL of the ledger control-plane API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer token for the control-plane API.
    #[serde(default)]
    pub api_token: String,

    /// Ledger to provision and write to when no name is given on the CLI.
    #[serde(default = "default_ledger_name")]
    pub ledger_name: String,

    /// Maximum readiness-poll attempts before reporting a timeout.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between readiness-poll attempts, in milliseconds.
    #[serde(default = "default_poll_delay_ms")]
    pub poll_delay_ms: u64,

    /// Executor-side retry limit for transaction conflicts.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Base delay in milliseconds for the executor's conflict backoff.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

// Default control-plane endpoint for the us-east-1 region.
fn default_endpoint() -> String {
    "https://ledger.us-east-1.example.com/v1".to_string()
}

// Default ledger name: "community-journal".
fn default_ledger_name() -> String {
    "community-journal".to_string()
}

// Default poll budget: 30 attempts.
fn default_max_attempts() -> u32 {
    30
}

// Default inter-attempt delay: 10 seconds.
fn default_poll_delay_ms() -> u64 {
    10_000
}

// Default conflict retry limit: 4.
fn default_retry_limit() -> u32 {
    4
}

// Default conflict backoff base: 1000ms.
fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_token: String::new(),
            ledger_name: default_ledger_name(),
            max_attempts: default_max_attempts(),
            poll_delay_ms: default_poll_delay_ms(),
            retry_limit: default_retry_limit(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl ScribeConfig {
    /// Load configuration from `scribe.toml` in the current directory,
    /// falling back to defaults if the file does not exist.
    pub fn load() -> Result<Self, ScribeError> {
        Self::load_from(Path::new("scribe.toml"))
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ScribeError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<ScribeConfig>(&contents)?
        } else {
            Self::default()
        };

        // Environment variable takes precedence over the config file.
        if let Ok(token) = std::env::var("SCRIBE_API_TOKEN")
            && !token.is_empty()
        {
            config.api_token = token;
        }

        if config.max_attempts == 0 {
            return Err(ScribeError::Config(
                "max_attempts must be at least 1".into(),
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = ScribeConfig::default();
        assert_eq!(config.ledger_name, "community-journal");
        assert_eq!(config.max_attempts, 30);
        assert_eq!(config.poll_delay_ms, 10_000);
        assert_eq!(config.retry_limit, 4);
        assert_eq!(config.base_delay_ms, 1000);
        assert!(config.api_token.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_token = "tok-test-123"
            max_attempts = 5
        "#;
        let config: ScribeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_token, "tok-test-123");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.ledger_name, "community-journal");
        assert_eq!(config.poll_delay_ms, 10_000);
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scribe.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "ledger_name = \"vehicle-registration\"").unwrap();
        writeln!(file, "poll_delay_ms = 500").unwrap();

        let config = ScribeConfig::load_from(&path).unwrap();
        assert_eq!(config.ledger_name, "vehicle-registration");
        assert_eq!(config.poll_delay_ms, 500);
        assert_eq!(config.max_attempts, 30);
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScribeConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.max_attempts, 30);
    }

    #[test]
    fn zero_max_attempts_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scribe.toml");
        std::fs::write(&path, "max_attempts = 0").unwrap();

        let err = ScribeConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }
}
