//! File-system capability layer.
//!
//! Every helper in this crate goes through the [`FileSystem`] trait instead of
//! touching `std::fs` directly, so the same code runs against the real disk
//! ([`OsFs`]) or an in-memory tree ([`MemFs`]) in tests.
//!
//! Contract shared by all implementations:
//! - `find` returns the root itself followed by every descendant, parents
//!   before children. A missing root yields an empty list, not an error.
//! - `copy_file` overwrites an existing destination file.
//! - `metadata` reports `io::ErrorKind::NotFound` for missing paths.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

mod memory;

pub use memory::MemFs;

/// What kind of entry a path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Anything else (sockets, devices, ...).
    Other,
}

impl EntryKind {
    pub fn is_file(self) -> bool {
        self == EntryKind::File
    }

    pub fn is_dir(self) -> bool {
        self == EntryKind::Dir
    }
}

/// The file-system operations staging needs.
pub trait FileSystem: Send + Sync {
    /// True iff the path resolves to a file or directory.
    fn exists(&self, path: &Path) -> bool;

    fn metadata(&self, path: &Path) -> io::Result<EntryKind>;

    /// Recursive listing of `root`, root included.
    fn find(&self, root: &Path) -> io::Result<Vec<PathBuf>>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Removes a file, or a directory and everything under it.
    fn remove_all(&self, path: &Path) -> io::Result<()>;
}

/// The host file system, backed by `std::fs` and `walkdir`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }

    fn metadata(&self, path: &Path) -> io::Result<EntryKind> {
        let meta = std::fs::metadata(path)?;
        Ok(if meta.is_file() {
            EntryKind::File
        } else if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::Other
        })
    }

    fn find(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.exists(root) {
            return Ok(Vec::new());
        }
        WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| entry.map(|e| e.into_path()).map_err(io::Error::from))
            .collect()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }

    fn remove_all(&self, path: &Path) -> io::Result<()> {
        if std::fs::symlink_metadata(path)?.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
    }
}

#[cfg(not(target_os = "windows"))]
/// Set POSIX permission bits on Unix.
pub fn set_unix_permissions(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(target_os = "windows")]
/// No-op on Windows: POSIX permission bits are not preserved.
pub fn set_unix_permissions(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Unix mode of a file, if the platform has one.
pub fn unix_mode(meta: &std::fs::Metadata) -> Option<u32> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        Some(meta.permissions().mode())
    }
    #[cfg(not(unix))]
    {
        let _ = meta;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn os_find_lists_root_then_children() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b").join("c.txt"), "c").unwrap();

        let found = OsFs.find(root).unwrap();
        assert_eq!(
            found,
            vec![
                root.to_path_buf(),
                root.join("a.txt"),
                root.join("b"),
                root.join("b").join("c.txt"),
            ]
        );
    }

    #[test]
    fn os_find_missing_root_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let found = OsFs.find(&tmp.path().join("nope")).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn os_metadata_kinds() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("f");
        fs::write(&file, "x").unwrap();

        assert_eq!(OsFs.metadata(tmp.path()).unwrap(), EntryKind::Dir);
        assert_eq!(OsFs.metadata(&file).unwrap(), EntryKind::File);
        let err = OsFs.metadata(&tmp.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn os_remove_all_handles_files_and_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("d");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("x"), "x").unwrap();
        let file = tmp.path().join("f");
        fs::write(&file, "f").unwrap();

        OsFs.remove_all(&dir).unwrap();
        OsFs.remove_all(&file).unwrap();
        assert!(!dir.exists());
        assert!(!file.exists());
    }
}
