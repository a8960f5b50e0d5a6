//! JSON application config: settings, keybinds, initial source, endpoints.

use std::path::Path;
use std::time::Duration;

use mask_core::Settings;
use mask_editor::Keybinds;
use serde::{Deserialize, Serialize};

use crate::driver::Locator;
use crate::error::ConfigError;
use crate::session::DEFAULT_DECODE_TIMEOUT;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Driver key; the first registered driver when absent.
    pub driver: Option<String>,
    /// `"id/page"` to start from; empty for a fresh item.
    pub locator: String,
}

impl SourceConfig {
    pub fn locator(&self) -> Locator {
        Locator::parse(&self.locator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub settings: Settings,
    pub keybinds: Keybinds,
    pub source: SourceConfig,
    /// Base for relative image URLs returned by drivers.
    pub base_url: Option<String>,
    pub submit_url: String,
    pub decode_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            keybinds: Keybinds::default(),
            source: SourceConfig::default(),
            base_url: None,
            submit_url: "http://localhost:8000/api/submit".to_string(),
            decode_timeout_secs: DEFAULT_DECODE_TIMEOUT.as_secs(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_secs(self.decode_timeout_secs.max(1))
    }
}
