use std::path::PathBuf;

use intel_core::client::{DEFAULT_HOST, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_RETRY_TIME, TOKEN_ENV_VAR};
use serde::{Deserialize, Serialize};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawIntelConfig {
    #[serde(default)]
    pub client: RawClientConfig,

    #[serde(default)]
    pub storage: RawStorageConfig,

    #[serde(default)]
    pub model: ModelConfig,
}

/// Client config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawClientConfig {
    pub host: Option<String>,
    pub max_concurrency: Option<usize>,
    pub max_retry_secs: Option<u64>,
    pub token_env: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStorageConfig {
    pub database: Option<PathBuf>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntelConfig {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the model API
    pub host: String,

    /// Completions and explanations allowed in flight at once
    pub max_concurrency: usize,

    /// Give up retrying a busy API after this many seconds
    pub max_retry_secs: u64,

    /// Environment variable holding the API token
    pub token_env: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_retry_secs: DEFAULT_MAX_RETRY_TIME.as_secs(),
            token_env: TOKEN_ENV_VAR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// libSQL file holding evaluation results
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelConfig {
    /// Model used when a command is not given one
    pub default_model: Option<String>,
}

/// Default evaluation database, relative to the working directory
pub const DEFAULT_DATABASE: &str = ".intel/evals.db";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = IntelConfig::default();
        assert_eq!(config.client.host, DEFAULT_HOST);
        assert_eq!(config.client.max_concurrency, 20);
        assert_eq!(config.client.max_retry_secs, 180);
        assert_eq!(config.client.token_env, "AA_TOKEN");
        assert_eq!(config.storage.database, PathBuf::from(".intel/evals.db"));
        assert!(config.model.default_model.is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = IntelConfig {
            client: ClientConfig {
                host: "http://localhost:8000".to_string(),
                max_concurrency: 4,
                ..Default::default()
            },
            storage: StorageConfig {
                database: PathBuf::from("/tmp/evals.db"),
            },
            model: ModelConfig {
                default_model: Some("llama-3-8b-instruct".to_string()),
            },
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: IntelConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.client.host, "http://localhost:8000");
        assert_eq!(parsed.client.max_concurrency, 4);
        assert_eq!(parsed.storage.database, PathBuf::from("/tmp/evals.db"));
        assert_eq!(
            parsed.model.default_model,
            Some("llama-3-8b-instruct".to_string())
        );
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[client]
max_concurrency = 2
"#;
        let raw: RawIntelConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.client.max_concurrency, Some(2));
        assert!(raw.client.host.is_none());
        assert!(raw.storage.database.is_none());
    }

    #[test]
    fn test_raw_config_empty_uses_none() {
        let raw: RawIntelConfig = toml::from_str("").unwrap();

        assert!(raw.client.host.is_none());
        assert!(raw.client.token_env.is_none());
        assert!(raw.model.default_model.is_none());
    }
}
