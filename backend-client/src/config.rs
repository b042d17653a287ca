//! `[backend]` and `[session]` tables of the CLI config.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BackendError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// API root, e.g. `http://localhost:8000/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            BackendError::InvalidConfig(format!("base_url `{}`: {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(BackendError::InvalidConfig(format!(
                "base_url `{}` must use http or https",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(BackendError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key under which the bearer token is stored
    #[serde(default = "default_token_key")]
    pub token_key: String,

    /// Session file; `~/.config/verbnav/session.json` when unset
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

fn default_token_key() -> String {
    "access_token".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: default_token_key(),
            store_path: None,
        }
    }
}

impl SessionConfig {
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".config").join("verbnav").join("session.json"))
                .unwrap_or_else(|| PathBuf::from("verbnav-session.json"))
        })
    }
}
