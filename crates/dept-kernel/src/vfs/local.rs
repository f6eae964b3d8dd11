//! Local filesystem backend.
//!
//! Provides access to real filesystem paths, with optional read-only mode.

use super::traits::{Filesystem, Metadata};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem backend.
///
/// All operations are relative to `root`. The REPL roots it at `/` and lets
/// the session resolve relative paths against its working directory.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
    read_only: bool,
}

impl LocalFs {
    /// Create a new local filesystem rooted at the given path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: false,
        }
    }

    /// Create a read-only local filesystem.
    pub fn read_only(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: true,
        }
    }

    /// Resolve a path to an absolute path within the root.
    ///
    /// Returns an error if the path escapes the root (via `..` or symlinks).
    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        let path = path.strip_prefix("/").unwrap_or(path);
        let full = self.root.join(path);

        // Non-existent targets (write, rename destination) canonicalize
        // through their parent.
        let canonical = if full.exists() {
            full.canonicalize()?
        } else {
            let parent = full
                .parent()
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid path"))?;
            let filename = full
                .file_name()
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid path"))?;

            if parent.exists() {
                parent.canonicalize()?.join(filename)
            } else {
                full
            }
        };

        let canonical_root = self
            .root
            .canonicalize()
            .unwrap_or_else(|_| self.root.clone());
        if !canonical.starts_with(&canonical_root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!(
                    "path escapes root: {} is not under {}",
                    canonical.display(),
                    canonical_root.display()
                ),
            ));
        }

        Ok(canonical)
    }

    fn check_writable(&self) -> io::Result<()> {
        if self.read_only {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "filesystem is read-only",
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Filesystem for LocalFs {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let full_path = self.resolve(path)?;
        tracing::debug!(path = %full_path.display(), "read");
        fs::read(&full_path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.check_writable()?;
        let full_path = self.resolve(path)?;
        tracing::debug!(path = %full_path.display(), bytes = data.len(), "write");

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&full_path, data).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.check_writable()?;
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;
        tracing::debug!(from = %from.display(), to = %to.display(), "rename");
        fs::rename(&from, &to).await
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        self.check_writable()?;
        let full_path = self.resolve(path)?;
        tracing::debug!(path = %full_path.display(), "remove");
        let meta = fs::metadata(&full_path).await?;

        if meta.is_dir() {
            fs::remove_dir(&full_path).await
        } else {
            fs::remove_file(&full_path).await
        }
    }

    async fn stat(&self, path: &Path) -> io::Result<Metadata> {
        let full_path = self.resolve(path)?;
        let meta = fs::metadata(&full_path).await?;

        Ok(Metadata {
            modified: meta.modified().ok(),
            created: meta.created().ok(),
        })
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<String>> {
        let full_path = self.resolve(path)?;
        let mut names = Vec::new();
        let mut dir = fs::read_dir(&full_path).await?;

        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort();
        Ok(names)
    }

    fn read_only(&self) -> bool {
        self.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (LocalFs, TempDir) {
        let dir = TempDir::new().unwrap();
        (LocalFs::new(dir.path()), dir)
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (fs, _dir) = setup();

        fs.write(Path::new("test.txt"), b"hello").await.unwrap();
        let data = fs.read(Path::new("test.txt")).await.unwrap();
        assert_eq!(data, b"hello");
    }

    #[tokio::test]
    async fn test_nested_write() {
        let (fs, _dir) = setup();

        fs.write(Path::new("a/b/c.txt"), b"nested").await.unwrap();
        let data = fs.read(Path::new("a/b/c.txt")).await.unwrap();
        assert_eq!(data, b"nested");
    }

    #[tokio::test]
    async fn test_read_only() {
        let (_, dir) = setup();
        let fs = LocalFs::read_only(dir.path());

        let result = fs.write(Path::new("test.txt"), b"data").await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_rename() {
        let (fs, _dir) = setup();

        fs.write(Path::new("old.txt"), b"data").await.unwrap();
        fs.rename(Path::new("old.txt"), Path::new("new.txt")).await.unwrap();

        assert!(!fs.exists(Path::new("old.txt")).await);
        assert_eq!(fs.read(Path::new("new.txt")).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let (fs, _dir) = setup();

        fs.write(Path::new("b.txt"), b"b").await.unwrap();
        fs.write(Path::new("a.txt"), b"a").await.unwrap();
        fs.write(Path::new("sub/c.txt"), b"c").await.unwrap();

        let names = fs.list(Path::new("")).await.unwrap();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
    }

    #[tokio::test]
    async fn test_stat() {
        let (fs, _dir) = setup();

        fs.write(Path::new("file.txt"), b"content").await.unwrap();
        let meta = fs.stat(Path::new("file.txt")).await.unwrap();
        assert!(meta.modified.is_some());
    }

    #[tokio::test]
    async fn test_remove() {
        let (fs, _dir) = setup();

        fs.write(Path::new("file.txt"), b"data").await.unwrap();
        fs.remove(Path::new("file.txt")).await.unwrap();
        assert!(!fs.exists(Path::new("file.txt")).await);
    }

    #[tokio::test]
    async fn test_path_escape_blocked() {
        let (fs, _dir) = setup();

        let result = fs.read(Path::new("../../../etc/passwd")).await;
        assert!(result.is_err());
    }
}
