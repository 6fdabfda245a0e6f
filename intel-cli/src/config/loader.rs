use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use super::types::{
    ClientConfig, IntelConfig, ModelConfig, RawClientConfig, RawIntelConfig, RawStorageConfig,
    StorageConfig,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<IntelConfig> {
        let mut layers = Vec::new();
        if let Some(user_path) = Self::user_config_path() {
            layers.push(user_path);
        }
        layers.push(Self::project_config_path());
        Self::load_layers(&layers)
    }

    /// Merge the files in order, later files overriding earlier ones.
    /// Missing files are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> Result<IntelConfig> {
        let mut raw = RawIntelConfig::default();
        for path in paths {
            if let Some(layer) = Self::read_raw(path)? {
                debug!(path = %path.display(), "loaded config layer");
                raw = Self::merge_raw(raw, layer);
            }
        }
        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "intel").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with INTEL_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("INTEL_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".intel/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<Option<RawIntelConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(raw))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawIntelConfig, overlay: RawIntelConfig) -> RawIntelConfig {
        RawIntelConfig {
            client: RawClientConfig {
                host: overlay.client.host.or(base.client.host),
                max_concurrency: overlay.client.max_concurrency.or(base.client.max_concurrency),
                max_retry_secs: overlay.client.max_retry_secs.or(base.client.max_retry_secs),
                token_env: overlay.client.token_env.or(base.client.token_env),
            },
            storage: RawStorageConfig {
                database: overlay.storage.database.or(base.storage.database),
            },
            model: ModelConfig {
                default_model: overlay.model.default_model.or(base.model.default_model),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawIntelConfig) -> IntelConfig {
        let client = ClientConfig::default();
        IntelConfig {
            client: ClientConfig {
                host: raw.client.host.unwrap_or(client.host),
                max_concurrency: raw.client.max_concurrency.unwrap_or(client.max_concurrency),
                max_retry_secs: raw.client.max_retry_secs.unwrap_or(client.max_retry_secs),
                token_env: raw.client.token_env.unwrap_or(client.token_env),
            },
            storage: StorageConfig {
                database: raw
                    .storage
                    .database
                    .unwrap_or_else(|| StorageConfig::default().database),
            },
            model: raw.model,
        }
    }
}
