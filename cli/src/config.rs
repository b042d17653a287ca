//! CLI configuration loading
//!
//! Loads `~/.config/verbnav/config.toml` (or `VERBNAV_CONFIG`, or an
//! explicit `--config` path). A missing file means built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use verbnav_backend_client::{BackendConfig, BackendError, SessionConfig};
use verbnav_core::NavigatorConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] BackendError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub navigator: NavigatorConfig,
}

impl AppConfig {
    /// Environment variable holding an alternative config path
    pub const ENV_CONFIG_PATH: &'static str = "VERBNAV_CONFIG";

    pub const DEFAULT_CONFIG_FILENAME: &'static str = "config.toml";

    /// Resolution order:
    /// 1. `explicit` (the `--config` flag)
    /// 2. `VERBNAV_CONFIG`
    /// 3. `~/.config/verbnav/config.toml`
    ///
    /// An explicit path must exist; the other two fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let path = Self::resolve_config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        if self.session.token_key.trim().is_empty() {
            return Err(
                BackendError::InvalidConfig("session.token_key is empty".to_string()).into(),
            );
        }
        Ok(())
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| {
                h.join(".config")
                    .join("verbnav")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }
}
