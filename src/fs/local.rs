//! Listing of the local filesystem.

use std::io;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::Filesystem;

/// [`Filesystem`] backed by the local disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Relative path with `/` separators regardless of platform
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

impl Filesystem for LocalFilesystem {
    fn list(&self, path: &str, recursive: bool) -> io::Result<Vec<String>> {
        let root = Path::new(path);
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Not a directory: {}", root.display()),
            ));
        }

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = path, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(relative) = relative_path(root, entry.path()) {
                files.push(relative);
            }
        }

        debug!(path = path, files = files.len(), "Listed directory");
        Ok(files)
    }

    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_list_recursive_skips_hidden() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("2024/01/15")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join("2024/01/15/file"), b"").unwrap();
        fs::write(root.join("2024/01/15/.hidden"), b"").unwrap();
        fs::write(root.join(".cache/file"), b"").unwrap();
        fs::write(root.join("top"), b"").unwrap();

        let files = LocalFilesystem
            .list(root.to_str().unwrap(), true)
            .unwrap();
        assert_eq!(files, vec!["2024/01/15/file".to_string(), "top".to_string()]);
    }

    #[test]
    fn test_list_non_recursive() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub/deep"), b"").unwrap();
        fs::write(root.join("top"), b"").unwrap();

        let files = LocalFilesystem
            .list(root.to_str().unwrap(), false)
            .unwrap();
        assert_eq!(files, vec!["top".to_string()]);
    }

    #[test]
    fn test_list_missing_directory() {
        let result = LocalFilesystem.list("/nonexistent/archive/path", true);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_exists() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, b"").unwrap();
        assert!(LocalFilesystem.exists(file.to_str().unwrap()));
        assert!(!LocalFilesystem.exists(dir.path().join("g").to_str().unwrap()));
    }
}
