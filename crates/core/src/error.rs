use std::io;

use thiserror::Error;

/// Backend-agnostic failure returned by every volume operation.
///
/// `path` is always the root-relative path the caller passed in, never the
/// adapter's resolved location.
#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("{message}")]
    ObjectNotFound { path: String, message: String },

    #[error("{message}")]
    ObjectAlreadyExists { path: String, message: String },

    #[error("{message}")]
    OperationFailed { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ObjectNotFound,
    ObjectAlreadyExists,
    OperationFailed,
}

pub type VolumeResult<T> = Result<T, VolumeError>;

impl VolumeError {
    pub fn not_found(path: &str, message: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn already_exists(path: &str, message: impl Into<String>) -> Self {
        Self::ObjectAlreadyExists {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn failed(path: &str, message: impl Into<String>) -> Self {
        Self::OperationFailed {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Map an adapter error onto the taxonomy by looking for an I/O cause.
    pub fn from_backend(err: anyhow::Error, path: &str) -> Self {
        let kind = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<io::Error>())
            .map(io::Error::kind);

        match kind {
            Some(io::ErrorKind::NotFound) => {
                Self::not_found(path, format!("object not found: {path}"))
            }
            Some(io::ErrorKind::AlreadyExists) => {
                Self::already_exists(path, format!("object already exists: {path}"))
            }
            _ => Self::failed(
                path,
                format!("operation failed on {path}: {}", err.root_cause()),
            ),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ObjectNotFound { .. } => ErrorKind::ObjectNotFound,
            Self::ObjectAlreadyExists { .. } => ErrorKind::ObjectAlreadyExists,
            Self::OperationFailed { .. } => ErrorKind::OperationFailed,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::ObjectNotFound { path, .. }
            | Self::ObjectAlreadyExists { path, .. }
            | Self::OperationFailed { path, .. } => path,
        }
    }
}

/// Rejected volume configuration. Raised by construction, never by an operation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("path is required")]
    MissingRootPath,

    #[error("unsupported backend: {0}")]
    UnsupportedBackend(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn io_causes_map_to_taxonomy() {
        let err = anyhow::Error::new(io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(
            VolumeError::from_backend(err, "a/b").kind(),
            ErrorKind::ObjectNotFound
        );

        let err = anyhow::Error::new(io::Error::from(io::ErrorKind::AlreadyExists));
        assert_eq!(
            VolumeError::from_backend(err, "a/b").kind(),
            ErrorKind::ObjectAlreadyExists
        );

        let err = anyhow::Error::new(io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(
            VolumeError::from_backend(err, "a/b").kind(),
            ErrorKind::OperationFailed
        );
    }

    #[test]
    fn context_does_not_hide_io_cause() {
        let err = Err::<(), _>(io::Error::from(io::ErrorKind::NotFound))
            .context("failed to read: /srv/files/x")
            .unwrap_err();
        let mapped = VolumeError::from_backend(err, "x");
        assert_eq!(mapped.kind(), ErrorKind::ObjectNotFound);
        assert_eq!(mapped.path(), "x");
        assert!(!mapped.to_string().contains("/srv/files"));
    }

    #[test]
    fn errors_without_io_cause_are_operation_failures() {
        let err = anyhow::anyhow!("connection reset");
        let mapped = VolumeError::from_backend(err, "remote/file");
        assert_eq!(mapped.kind(), ErrorKind::OperationFailed);
        assert!(mapped.to_string().contains("remote/file"));
    }
}
