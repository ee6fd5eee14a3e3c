use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use volumes_core::{ProcessEnvironment, Volume, VolumeConfig};

const CONFIG_FILE: &str = "volumes.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub volumes: Vec<VolumeConfig>,
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("volumes")
            .join(CONFIG_FILE)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("config not found at {}", path.display()))?;
        toml::from_str(&content).context("failed to parse config")
    }

    /// Like [`AppConfig::load`], but a missing file yields an empty config.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }

    pub fn find_volume(&self, handle: &str) -> Option<&VolumeConfig> {
        self.volumes
            .iter()
            .find(|v| v.handle.eq_ignore_ascii_case(handle))
    }

    /// Build the volume for `handle`, resolving placeholders from the process
    /// environment.
    pub fn open_volume(&self, handle: &str) -> Result<Volume> {
        let config = self
            .find_volume(handle)
            .with_context(|| format!("volume '{handle}' not found"))?;
        let volume = Volume::new(config.clone(), Arc::new(ProcessEnvironment))
            .with_context(|| format!("invalid configuration for volume '{handle}'"))?;
        Ok(volume)
    }
}
