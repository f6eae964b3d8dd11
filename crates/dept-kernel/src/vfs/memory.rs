//! In-memory filesystem implementation.
//!
//! Used for testing and `fs_mode = "memory"` sessions. All data is ephemeral.

use super::traits::{Filesystem, Metadata};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

#[derive(Debug, Clone)]
enum Entry {
    File {
        data: Vec<u8>,
        created: SystemTime,
        modified: SystemTime,
    },
    Directory {
        created: SystemTime,
    },
}

/// In-memory filesystem.
///
/// Thread-safe via internal `RwLock`. All data is lost when dropped.
#[derive(Debug)]
pub struct MemoryFs {
    entries: RwLock<HashMap<PathBuf, Entry>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("not found: {}", path.display()),
    )
}

fn poisoned() -> io::Error {
    io::Error::other("lock poisoned")
}

impl MemoryFs {
    /// Create a new empty in-memory filesystem.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            PathBuf::new(),
            Entry::Directory {
                created: SystemTime::now(),
            },
        );
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Normalize a path: remove leading `/`, resolve `.` and `..`.
    fn normalize(path: &Path) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.components() {
            match component {
                Component::ParentDir => {
                    result.pop();
                }
                Component::Normal(s) => result.push(s),
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        result
    }

    /// Insert directory entries for every missing ancestor of `path`.
    fn ensure_parents(entries: &mut HashMap<PathBuf, Entry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.parent().into_iter().flat_map(|p| p.components()) {
            if let Component::Normal(s) = component {
                current.push(s);
                entries
                    .entry(current.clone())
                    .or_insert(Entry::Directory {
                        created: SystemTime::now(),
                    });
            }
        }
    }
}

#[async_trait]
impl Filesystem for MemoryFs {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let normalized = Self::normalize(path);
        let entries = self.entries.read().map_err(|_| poisoned())?;

        match entries.get(&normalized) {
            Some(Entry::File { data, .. }) => Ok(data.clone()),
            Some(Entry::Directory { .. }) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let normalized = Self::normalize(path);
        let mut entries = self.entries.write().map_err(|_| poisoned())?;

        let now = SystemTime::now();
        let created = match entries.get(&normalized) {
            Some(Entry::Directory { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::IsADirectory,
                    format!("is a directory: {}", path.display()),
                ));
            }
            Some(Entry::File { created, .. }) => *created,
            None => now,
        };

        Self::ensure_parents(&mut entries, &normalized);
        entries.insert(
            normalized,
            Entry::File {
                data: data.to_vec(),
                created,
                modified: now,
            },
        );
        Ok(())
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let from_norm = Self::normalize(from);
        let to_norm = Self::normalize(to);
        let mut entries = self.entries.write().map_err(|_| poisoned())?;

        match entries.get(&from_norm) {
            Some(Entry::File { .. }) => {}
            Some(Entry::Directory { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::IsADirectory,
                    format!("is a directory: {}", from.display()),
                ));
            }
            None => return Err(not_found(from)),
        }
        if let Some(Entry::Directory { .. }) = entries.get(&to_norm) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", to.display()),
            ));
        }

        let entry = entries.remove(&from_norm).ok_or_else(|| not_found(from))?;
        Self::ensure_parents(&mut entries, &to_norm);
        entries.insert(to_norm, entry);
        Ok(())
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        let normalized = Self::normalize(path);

        if normalized.as_os_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "cannot remove root directory",
            ));
        }

        let mut entries = self.entries.write().map_err(|_| poisoned())?;

        if let Some(Entry::Directory { .. }) = entries.get(&normalized) {
            let has_children = entries
                .keys()
                .any(|k| k.parent() == Some(normalized.as_path()));
            if has_children {
                return Err(io::Error::new(
                    io::ErrorKind::DirectoryNotEmpty,
                    format!("directory not empty: {}", path.display()),
                ));
            }
        }

        entries
            .remove(&normalized)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    async fn stat(&self, path: &Path) -> io::Result<Metadata> {
        let normalized = Self::normalize(path);
        let entries = self.entries.read().map_err(|_| poisoned())?;

        match entries.get(&normalized) {
            Some(Entry::File {
                created,
                modified,
                ..
            }) => Ok(Metadata {
                modified: Some(*modified),
                created: Some(*created),
            }),
            Some(Entry::Directory { created }) => Ok(Metadata {
                modified: Some(*created),
                created: Some(*created),
            }),
            None => Err(not_found(path)),
        }
    }

    async fn list(&self, path: &Path) -> io::Result<Vec<String>> {
        let normalized = Self::normalize(path);
        let entries = self.entries.read().map_err(|_| poisoned())?;

        match entries.get(&normalized) {
            Some(Entry::Directory { .. }) => {}
            Some(Entry::File { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("not a directory: {}", path.display()),
                ));
            }
            None => return Err(not_found(path)),
        }

        let mut names: Vec<String> = entries
            .keys()
            .filter(|k| k.parent() == Some(normalized.as_path()))
            .filter_map(|k| k.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();

        names.sort();
        Ok(names)
    }

    fn read_only(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read() {
        let fs = MemoryFs::new();
        fs.write(Path::new("test.txt"), b"hello world").await.unwrap();
        let data = fs.read(Path::new("test.txt")).await.unwrap();
        assert_eq!(data, b"hello world");
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let fs = MemoryFs::new();
        let result = fs.read(Path::new("nonexistent.txt")).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_nested_write_creates_parents() {
        let fs = MemoryFs::new();
        fs.write(Path::new("a/b/file.txt"), b"nested").await.unwrap();

        assert_eq!(fs.list(Path::new("a")).await.unwrap(), vec!["b"]);
        assert_eq!(fs.list(Path::new("a/b")).await.unwrap(), vec!["file.txt"]);
    }

    #[tokio::test]
    async fn test_list_direct_children_only() {
        let fs = MemoryFs::new();
        fs.write(Path::new("b.txt"), b"b").await.unwrap();
        fs.write(Path::new("a.txt"), b"a").await.unwrap();
        fs.write(Path::new("dir/inner.txt"), b"c").await.unwrap();

        assert_eq!(fs.list(Path::new("/")).await.unwrap(), vec!["a.txt", "b.txt", "dir"]);
        assert_eq!(fs.list(Path::new("dir")).await.unwrap(), vec!["inner.txt"]);
    }

    #[tokio::test]
    async fn test_rename_moves_contents() {
        let fs = MemoryFs::new();
        fs.write(Path::new("old.txt"), b"data").await.unwrap();
        fs.rename(Path::new("old.txt"), Path::new("moved/new.txt")).await.unwrap();

        assert!(!fs.exists(Path::new("old.txt")).await);
        assert_eq!(fs.read(Path::new("moved/new.txt")).await.unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_rename_missing_source() {
        let fs = MemoryFs::new();
        let err = fs
            .rename(Path::new("nope.txt"), Path::new("x.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_creation_time() {
        let fs = MemoryFs::new();
        fs.write(Path::new("file.txt"), b"first").await.unwrap();
        let first = fs.stat(Path::new("file.txt")).await.unwrap();
        fs.write(Path::new("file.txt"), b"second").await.unwrap();
        let second = fs.stat(Path::new("file.txt")).await.unwrap();

        assert_eq!(first.created, second.created);
        assert_eq!(fs.read(Path::new("file.txt")).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_remove_non_empty_directory_fails() {
        let fs = MemoryFs::new();
        fs.write(Path::new("dir/file.txt"), b"data").await.unwrap();

        let result = fs.remove(Path::new("dir")).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::DirectoryNotEmpty);
    }

    #[tokio::test]
    async fn test_path_normalization() {
        let fs = MemoryFs::new();
        fs.write(Path::new("/a/b/c.txt"), b"data").await.unwrap();

        let data1 = fs.read(Path::new("a/b/c.txt")).await.unwrap();
        let data2 = fs.read(Path::new("a/./b/../b/c.txt")).await.unwrap();
        assert_eq!(data1, data2);
    }
}
