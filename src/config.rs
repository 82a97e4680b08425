// Optional per-store configuration (config.yaml)

use crate::filter::Filter;
use crate::models::Priority;
use crate::store::StoreSettings;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILE: &str = "config.yaml";

/// Which storage adapter backs the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub backend: Backend,
    pub default_priority: Priority,
    pub default_filter: Filter,
    pub max_text_len: Option<usize>,
}

impl Config {
    /// Read `config.yaml` from `dir`, or defaults if there is none
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            debug!(file = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))?;

        debug!(file = ?path, ?config, "Loaded config");
        Ok(config)
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            default_priority: self.default_priority,
            max_text_len: self.max_text_len,
        }
    }
}
