use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{Result, GENERIC_ERROR_MESSAGE},
    utils::{app_data_dir, persistence},
};

const CONFIG_FILE: &str = "config.json";
const SESSION_FILE: &str = "session.json";

/// Runtime settings for the API client and session persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WizardConfig {
    pub api_base_url: String,
    pub properties_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
    pub generic_error_message: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".into(),
            properties_path: "/properties".into(),
            session_file: None,
            generic_error_message: GENERIC_ERROR_MESSAGE.into(),
        }
    }
}

impl WizardConfig {
    /// Location of the persisted session, relative to `base` unless overridden.
    pub fn session_path_in(&self, base: &Path) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| base.join(SESSION_FILE))
    }
}

/// Loads and saves [`WizardConfig`] under the application data directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        let path = base.join(CONFIG_FILE);
        Self { base, path }
    }

    pub fn load(&self) -> Result<WizardConfig> {
        let loaded = persistence::load_json(&self.path)?;
        if loaded.is_none() {
            tracing::debug!(path = %self.path.display(), "no config on disk, using defaults");
        }
        Ok(loaded.unwrap_or_default())
    }

    pub fn save(&self, config: &WizardConfig) -> Result<()> {
        persistence::save_json(config, &self.path)
    }

    pub fn session_path(&self, config: &WizardConfig) -> PathBuf {
        config.session_path_in(&self.base)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
