//! Configuration for promptstore

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::template::{Options, Theme};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the synchronized settings document
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Theme reported before the user has picked one
    #[serde(default)]
    pub default_theme: Theme,

    /// Attempts for a conflicting read-modify-write before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Write the starter templates the first time the store is used
    #[serde(default = "default_seed_on_first_run")]
    pub seed_on_first_run: bool,
}

fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptstore")
}

fn default_max_retries() -> u32 {
    crate::store::DEFAULT_MAX_RETRIES
}

fn default_seed_on_first_run() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            default_theme: Theme::default(),
            max_retries: default_max_retries(),
            seed_on_first_run: default_seed_on_first_run(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::from_file(config_path);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("promptstore").join("config.yml")),
            Some(PathBuf::from("promptstore.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
        serde_yaml::from_str(&content).wrap_err_with(|| format!("Invalid config {}", path.display()))
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Settings record used before anything has been written
    pub fn default_options(&self) -> Options {
        Options::with_theme(self.default_theme)
    }
}
