pub mod local;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Physical storage operations for one storage technology.
///
/// Paths are relative to the root the backend was constructed with and use
/// `/` as separator. Failures are reported as `anyhow` errors carrying the
/// backend's native cause; [`crate::Volume`] maps them onto
/// [`crate::VolumeError`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn read(&self, path: &str) -> Result<Vec<u8>>;
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;
    async fn delete(&self, path: &str) -> Result<()>;
    async fn exists(&self, path: &str) -> Result<bool>;
    async fn list_contents(&self, path: &str, recursive: bool) -> Result<Vec<Entry>>;
    /// Move `old` to `new`. Fails if `new` exists when checked; the check and
    /// the move are not atomic together, so a concurrent creator may still be
    /// replaced.
    async fn rename(&self, old: &str, new: &str) -> Result<()>;
    async fn copy(&self, src: &str, dst: &str) -> Result<()>;
    async fn create_dir(&self, path: &str) -> Result<()>;
    async fn delete_dir(&self, path: &str) -> Result<()>;
    async fn file_size(&self, path: &str) -> Result<u64>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Selects which backend a volume is stored on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
}

impl BackendKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::Local => "Local Folder",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = crate::ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            _ => Err(crate::ConfigError::UnsupportedBackend(s.to_string())),
        }
    }
}
