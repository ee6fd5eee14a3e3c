use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::local::LocalBackend;
use crate::backend::{Backend, BackendKind, Entry};
use crate::error::{ConfigError, VolumeError, VolumeResult};
use crate::resolver::{Environment, PathResolver};

/// Persisted configuration of a volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeConfig {
    pub name: String,
    pub handle: String,
    #[serde(default = "new_uid")]
    pub uid: String,
    /// Storage root, may contain `$VAR`, `${VAR}` or a leading `@alias`.
    pub path: String,
    /// Public base URL. `None` means the volume is not publicly served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub backend: BackendKind,
}

fn new_uid() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl VolumeConfig {
    pub fn local(name: &str, handle: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            handle: handle.to_string(),
            uid: new_uid(),
            path: path.to_string(),
            url: None,
            backend: BackendKind::Local,
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }
}

/// Check a configuration before a [`Volume`] is built from it.
pub fn validate(config: &VolumeConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::MissingRootPath);
    }
    Ok(())
}

/// Destination of a directory rename: the last segment of `path` replaced by
/// `new_name`, keeping the parent.
pub fn renamed_dir_path(path: &str, new_name: &str) -> String {
    let trimmed = path.trim_end_matches(['/', '\\']);
    match trimmed.rsplit_once(['/', '\\']) {
        Some((parent, _)) if !parent.is_empty() => format!("{parent}/{new_name}"),
        _ => new_name.to_string(),
    }
}

fn is_single_segment(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// A storage root bound to a backend.
///
/// The root path and URL are re-resolved on every access and a fresh
/// adapter is built per operation, so a change in the environment is picked
/// up by the next call.
#[derive(Debug, Clone)]
pub struct Volume {
    config: VolumeConfig,
    resolver: PathResolver,
}

impl Volume {
    pub fn new(config: VolumeConfig, env: Arc<dyn Environment>) -> Result<Self, ConfigError> {
        Self::with_resolver(config, PathResolver::new(env))
    }

    pub fn with_resolver(config: VolumeConfig, resolver: PathResolver) -> Result<Self, ConfigError> {
        validate(&config)?;
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &VolumeConfig {
        &self.config
    }

    pub fn handle(&self) -> &str {
        &self.config.handle
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.config.backend
    }

    pub fn display_name(&self) -> &'static str {
        self.config.backend.display_name()
    }

    pub fn root_path(&self) -> String {
        self.resolver.resolve_root(&self.config.path)
    }

    pub fn root_url(&self) -> Option<String> {
        let raw = self.config.url.as_deref()?;
        let url = self.resolver.resolve_url(raw);
        if url.is_empty() { None } else { Some(url) }
    }

    /// Public URL of a file, when the volume is publicly served.
    pub fn public_url(&self, path: &str) -> Option<String> {
        let root = self.root_url()?;
        Some(format!("{root}{}", path.trim_start_matches('/')))
    }

    /// Build an adapter bound to the current root.
    pub fn adapter(&self) -> VolumeResult<Box<dyn Backend>> {
        self.open("")
    }

    /// Build an adapter for an operation on `path`. A root that resolves to
    /// an empty or relative path is refused, so nothing lands outside a
    /// configured root.
    fn open(&self, path: &str) -> VolumeResult<Box<dyn Backend>> {
        let root = self.root_path();
        if root.is_empty() || !Path::new(&root).is_absolute() {
            return Err(VolumeError::failed(
                path,
                format!(
                    "volume '{}' has no usable root: {:?} did not resolve to an absolute path",
                    self.config.handle, self.config.path
                ),
            ));
        }

        match self.config.backend {
            BackendKind::Local => LocalBackend::new(&root)
                .map(|b| Box::new(b) as Box<dyn Backend>)
                .map_err(|e| VolumeError::from_backend(e, path)),
        }
    }

    pub async fn read(&self, path: &str) -> VolumeResult<Vec<u8>> {
        self.open(path)?
            .read(path)
            .await
            .map_err(|e| VolumeError::from_backend(e, path))
    }

    pub async fn write(&self, path: &str, data: &[u8]) -> VolumeResult<()> {
        self.open(path)?
            .write(path, data)
            .await
            .map_err(|e| VolumeError::from_backend(e, path))?;
        info!(volume = %self.config.handle, path, bytes = data.len(), "File written");
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> VolumeResult<()> {
        self.open(path)?
            .delete(path)
            .await
            .map_err(|e| VolumeError::from_backend(e, path))?;
        info!(volume = %self.config.handle, path, "File deleted");
        Ok(())
    }

    pub async fn exists(&self, path: &str) -> VolumeResult<bool> {
        self.open(path)?
            .exists(path)
            .await
            .map_err(|e| VolumeError::from_backend(e, path))
    }

    pub async fn list_contents(&self, path: &str, recursive: bool) -> VolumeResult<Vec<Entry>> {
        self.open(path)?
            .list_contents(path, recursive)
            .await
            .map_err(|e| VolumeError::from_backend(e, path))
    }

    pub async fn file_size(&self, path: &str) -> VolumeResult<u64> {
        self.open(path)?
            .file_size(path)
            .await
            .map_err(|e| VolumeError::from_backend(e, path))
    }

    /// Move a file to a new root-relative path.
    pub async fn rename(&self, old: &str, new: &str) -> VolumeResult<()> {
        self.open(old)?
            .rename(old, new)
            .await
            .map_err(|e| Self::destination_error(e, old, new))?;
        info!(volume = %self.config.handle, from = old, to = new, "File renamed");
        Ok(())
    }

    pub async fn copy(&self, src: &str, dst: &str) -> VolumeResult<()> {
        self.open(src)?
            .copy(src, dst)
            .await
            .map_err(|e| Self::destination_error(e, src, dst))?;
        info!(volume = %self.config.handle, from = src, to = dst, "File copied");
        Ok(())
    }

    pub async fn create_dir(&self, path: &str) -> VolumeResult<()> {
        self.open(path)?
            .create_dir(path)
            .await
            .map_err(|e| VolumeError::from_backend(e, path))?;
        info!(volume = %self.config.handle, path, "Folder created");
        Ok(())
    }

    pub async fn delete_dir(&self, path: &str) -> VolumeResult<()> {
        self.open(path)?
            .delete_dir(path)
            .await
            .map_err(|e| VolumeError::from_backend(e, path))?;
        info!(volume = %self.config.handle, path, "Folder deleted");
        Ok(())
    }

    /// Give the directory at `path` the leaf name `new_name`, keeping its parent.
    ///
    /// `new_name` must be a single path segment.
    pub async fn rename_dir(&self, path: &str, new_name: &str) -> VolumeResult<bool> {
        if !is_single_segment(new_name) {
            return Err(VolumeError::failed(
                path,
                format!("Invalid folder name {new_name:?} while attempting to rename {path}"),
            ));
        }

        let new_path = renamed_dir_path(path, new_name);
        let result = self.open(path)?.rename(path, &new_path).await;

        match result.map_err(|e| VolumeError::from_backend(e, path)) {
            Ok(()) => {
                info!(volume = %self.config.handle, path, new_path = %new_path, "Folder renamed");
                Ok(true)
            }
            Err(VolumeError::ObjectNotFound { .. }) => Err(VolumeError::not_found(
                path,
                format!("Folder was not found while attempting to rename {path}!"),
            )),
            Err(VolumeError::ObjectAlreadyExists { .. }) => Err(VolumeError::already_exists(
                path,
                format!("A folder already exists at {new_path}, cannot rename {path}"),
            )),
            Err(other) => Err(other),
        }
    }

    fn destination_error(err: anyhow::Error, src: &str, dst: &str) -> VolumeError {
        match VolumeError::from_backend(err, src) {
            VolumeError::ObjectAlreadyExists { .. } => {
                VolumeError::already_exists(dst, format!("object already exists: {dst}"))
            }
            other => other,
        }
    }
}
