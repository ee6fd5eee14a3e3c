use std::borrow::Cow;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{Backend, Entry, EntryKind};

/// Backend over a directory on the local filesystem.
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        Ok(Self { root })
    }

    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create directory: {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a relative path under the root. Paths that would leave the root
    /// are rejected before touching the filesystem.
    fn full_path(&self, path: &str) -> io::Result<PathBuf> {
        let mut full = self.root.clone();
        full.extend(relative_segments(path)?);
        Ok(full)
    }

    async fn ensure_parent(full: &Path) -> Result<()> {
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }

    async fn assert_present(full: &Path, path: &str) -> Result<()> {
        match tokio::fs::symlink_metadata(full).await {
            Ok(_) => Ok(()),
            Err(e) => Err(e).with_context(|| format!("source does not exist: {path}")),
        }
    }

    async fn assert_absent(full: &Path, path: &str) -> Result<()> {
        match tokio::fs::symlink_metadata(full).await {
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination already exists: {path}"),
            )
            .into()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to stat: {path}")),
        }
    }
}

/// Split a root-relative path on `/` or `\`, dropping empty and `.`
/// segments and folding `..`. A `..` that would climb above the root is an
/// error.
fn relative_segments(path: &str) -> io::Result<Vec<&str>> {
    let mut segments = Vec::new();

    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        format!("path escapes volume root: {path}"),
                    ));
                }
            }
            name => {
                let mut components = Path::new(name).components();
                if !matches!(
                    (components.next(), components.next()),
                    (Some(Component::Normal(_)), None)
                ) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("invalid path segment {name:?} in {path}"),
                    ));
                }
                segments.push(name);
            }
        }
    }

    Ok(segments)
}

fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn join_relative(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.full_path(path)?;
        tokio::fs::read(&full)
            .await
            .with_context(|| format!("failed to read: {}", full.display()))
    }

    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full = self.full_path(path)?;
        Self::ensure_parent(&full).await?;
        tokio::fs::write(&full, data)
            .await
            .with_context(|| format!("failed to write: {}", full.display()))?;
        debug!(path, bytes = data.len(), "wrote file");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full = self.full_path(path)?;
        tokio::fs::remove_file(&full)
            .await
            .with_context(|| format!("failed to delete: {}", full.display()))?;
        debug!(path, "deleted file");
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full = self.full_path(path)?;
        match tokio::fs::try_exists(&full).await {
            Ok(found) => Ok(found),
            Err(e) if is_missing(&e) => Ok(false),
            Err(e) => Err(e).with_context(|| format!("failed to stat: {}", full.display())),
        }
    }

    async fn list_contents(&self, path: &str, recursive: bool) -> Result<Vec<Entry>> {
        let segments = relative_segments(path)?;
        let mut dir = self.root.clone();
        dir.extend(&segments);
        match tokio::fs::metadata(&dir).await {
            Ok(m) if m.is_dir() => {}
            Ok(_) => return Ok(Vec::new()),
            Err(e) if is_missing(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("failed to stat: {}", dir.display())),
        }

        let prefix = segments.join("/");
        let mut pending = vec![(dir, prefix)];
        let mut entries = Vec::new();

        while let Some((dir, prefix)) = pending.pop() {
            let mut read_dir = tokio::fs::read_dir(&dir)
                .await
                .with_context(|| format!("failed to list: {}", dir.display()))?;
            while let Some(entry) = read_dir.next_entry().await? {
                let file_name = entry.file_name();
                let name = file_name.to_string_lossy();
                if let Cow::Owned(_) = name {
                    warn!(
                        path = %entry.path().display(),
                        "file name is not valid UTF-8, listing it with replacement characters"
                    );
                }
                let metadata = entry.metadata().await?;
                let relative = join_relative(&prefix, &name);
                let kind = if metadata.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                };

                if recursive && kind == EntryKind::Directory {
                    pending.push((entry.path(), relative.clone()));
                }

                entries.push(Entry {
                    path: relative,
                    kind,
                    size: if kind == EntryKind::File { metadata.len() } else { 0 },
                    modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                });
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn rename(&self, old: &str, new: &str) -> Result<()> {
        let from = self.full_path(old)?;
        let to = self.full_path(new)?;
        Self::assert_present(&from, old).await?;
        Self::assert_absent(&to, new).await?;
        Self::ensure_parent(&to).await?;

        tokio::fs::rename(&from, &to)
            .await
            .with_context(|| format!("failed to rename {} to {}", from.display(), to.display()))?;
        debug!(from = old, to = new, "renamed");
        Ok(())
    }

    async fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let from = self.full_path(src)?;
        let to = self.full_path(dst)?;
        Self::assert_present(&from, src).await?;
        Self::assert_absent(&to, dst).await?;
        Self::ensure_parent(&to).await?;

        let bytes = tokio::fs::copy(&from, &to)
            .await
            .with_context(|| format!("failed to copy {} to {}", from.display(), to.display()))?;
        debug!(from = src, to = dst, bytes, "copied file");
        Ok(())
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        let full = self.full_path(path)?;
        tokio::fs::create_dir_all(&full)
            .await
            .with_context(|| format!("failed to create directory: {}", full.display()))?;
        debug!(path, "created directory");
        Ok(())
    }

    async fn delete_dir(&self, path: &str) -> Result<()> {
        let full = self.full_path(path)?;
        if full == self.root {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "refusing to delete the volume root",
            )
            .into());
        }
        tokio::fs::remove_dir_all(&full)
            .await
            .with_context(|| format!("failed to delete directory: {}", full.display()))?;
        debug!(path, "deleted directory");
        Ok(())
    }

    async fn file_size(&self, path: &str) -> Result<u64> {
        let full = self.full_path(path)?;
        let metadata = tokio::fs::metadata(&full)
            .await
            .with_context(|| format!("failed to stat: {}", full.display()))?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_kind(err: &anyhow::Error) -> Option<io::ErrorKind> {
        err.chain()
            .find_map(|c| c.downcast_ref::<io::Error>())
            .map(io::Error::kind)
    }

    #[tokio::test]
    async fn local_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::init(dir.path()).unwrap();

        backend.write("test/hello.txt", b"world").await.unwrap();
        assert!(backend.exists("test/hello.txt").await.unwrap());
        assert_eq!(backend.file_size("test/hello.txt").await.unwrap(), 5);

        let data = backend.read("test/hello.txt").await.unwrap();
        assert_eq!(data, b"world");

        let list = backend.list_contents("test", false).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].path, "test/hello.txt");
        assert_eq!(list[0].kind, EntryKind::File);
        assert_eq!(list[0].size, 5);

        backend.delete("test/hello.txt").await.unwrap();
        assert!(!backend.exists("test/hello.txt").await.unwrap());
    }

    #[tokio::test]
    async fn delete_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).unwrap();

        let err = backend.delete("nope.txt").await.unwrap_err();
        assert_eq!(io_kind(&err), Some(io::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn list_contents_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).unwrap();
        backend.write("a/one.txt", b"1").await.unwrap();
        backend.write("a/b/two.txt", b"22").await.unwrap();
        backend.write("top.txt", b"333").await.unwrap();

        let shallow: Vec<_> = backend
            .list_contents("", false)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(shallow, vec!["a", "top.txt"]);

        let deep = backend.list_contents("a", true).await.unwrap();
        let paths: Vec<_> = deep.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a/b", "a/b/two.txt", "a/one.txt"]);
        assert_eq!(deep[0].kind, EntryKind::Directory);

        assert!(backend.list_contents("missing", true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rename_refuses_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).unwrap();
        backend.write("src.txt", b"source").await.unwrap();
        backend.write("dst.txt", b"dest").await.unwrap();

        let err = backend.rename("src.txt", "dst.txt").await.unwrap_err();
        assert_eq!(io_kind(&err), Some(io::ErrorKind::AlreadyExists));
        assert_eq!(backend.read("src.txt").await.unwrap(), b"source");
        assert_eq!(backend.read("dst.txt").await.unwrap(), b"dest");
    }

    #[tokio::test]
    async fn rename_missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).unwrap();

        let err = backend.rename("missing/dir", "missing/other").await.unwrap_err();
        assert_eq!(io_kind(&err), Some(io::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn copy_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).unwrap();
        backend.write("a.txt", b"data").await.unwrap();

        backend.copy("a.txt", "nested/b.txt").await.unwrap();
        assert_eq!(backend.read("a.txt").await.unwrap(), b"data");
        assert_eq!(backend.read("nested/b.txt").await.unwrap(), b"data");

        let err = backend.copy("a.txt", "nested/b.txt").await.unwrap_err();
        assert_eq!(io_kind(&err), Some(io::ErrorKind::AlreadyExists));
    }

    #[tokio::test]
    async fn paths_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("volume");
        let backend = LocalBackend::init(&root).unwrap();

        let err = backend.write("../outside.txt", b"x").await.unwrap_err();
        assert_eq!(io_kind(&err), Some(io::ErrorKind::PermissionDenied));
        assert!(!dir.path().join("outside.txt").exists());

        let err = backend.read("a/../../outside.txt").await.unwrap_err();
        assert_eq!(io_kind(&err), Some(io::ErrorKind::PermissionDenied));

        backend.write("a/../inside.txt", b"ok").await.unwrap();
        assert!(root.join("inside.txt").exists());
    }

    #[tokio::test]
    async fn delete_dir_removes_tree_but_not_root() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).unwrap();
        backend.create_dir("x/y").await.unwrap();
        backend.write("x/y/z.txt", b"z").await.unwrap();

        backend.delete_dir("x").await.unwrap();
        assert!(!backend.exists("x").await.unwrap());

        assert!(backend.delete_dir("").await.is_err());
        assert!(dir.path().exists());
    }

    #[tokio::test]
    async fn exists_below_a_file_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).unwrap();
        backend.write("a.txt", b"a").await.unwrap();

        assert!(!backend.exists("a.txt/b").await.unwrap());
        assert!(backend.list_contents("a.txt", false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listed_paths_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).unwrap();
        backend.write("a/b/x.txt", b"x").await.unwrap();

        for requested in ["a//b", "./a/b/", "a/./b", "a\\b", "a/c/../b"] {
            let paths: Vec<_> = backend
                .list_contents(requested, false)
                .await
                .unwrap()
                .into_iter()
                .map(|e| e.path)
                .collect();
            assert_eq!(paths, vec!["a/b/x.txt"], "listing {requested:?}");
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn non_utf8_names_are_listed() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(dir.path()).unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"bad\xff.txt")), b"x").unwrap();
        backend.write("good.txt", b"y").await.unwrap();

        let paths: Vec<_> = backend
            .list_contents("", false)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(paths, vec!["bad\u{FFFD}.txt", "good.txt"]);
    }
}
