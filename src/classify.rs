//! Path classification: does an input exist, and is it a file or a folder.

use std::io;
use std::path::Path;

use crate::error::{Result, StagingError};
use crate::fsx::FileSystem;

/// True iff the path resolves to a file or directory.
pub fn exists(fs: &dyn FileSystem, path: &Path) -> bool {
    fs.exists(path)
}

/// Checks whether the given path is a regular file.
///
/// A missing path is `Ok(false)`. Any other failure (permission denied, ...)
/// is returned as [`StagingError::FileSystem`].
pub fn is_file(fs: &dyn FileSystem, path: &Path) -> Result<bool> {
    match fs.metadata(path) {
        Ok(kind) => Ok(kind.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "stat failed");
            Err(StagingError::fs(path, e))
        }
    }
}

/// Validates the input package and reports whether it is a folder.
///
/// Fails with [`StagingError::InvalidInput`] when nothing exists at `path`.
pub fn is_folder_input(fs: &dyn FileSystem, path: &Path) -> Result<bool> {
    if !fs.exists(path) {
        return Err(StagingError::InvalidInput(path.to_path_buf()));
    }
    Ok(!is_file(fs, path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsx::MemFs;

    fn sample() -> MemFs {
        let fs = MemFs::new();
        fs.add_file("/pkg/site.zip", "PK");
        fs.add_dir("/pkg/site");
        fs
    }

    #[test]
    fn exists_for_files_and_dirs() {
        let fs = sample();
        assert!(exists(&fs, Path::new("/pkg/site.zip")));
        assert!(exists(&fs, Path::new("/pkg/site")));
        assert!(!exists(&fs, Path::new("/pkg/other")));
    }

    #[test]
    fn is_file_missing_is_false() {
        let fs = sample();
        assert!(!is_file(&fs, Path::new("/nope")).unwrap());
        assert!(!is_file(&fs, Path::new("/pkg/site")).unwrap());
        assert!(is_file(&fs, Path::new("/pkg/site.zip")).unwrap());
    }

    #[test]
    fn is_file_propagates_other_errors() {
        let fs = sample();
        fs.deny("/pkg/site.zip");
        let err = is_file(&fs, Path::new("/pkg/site.zip")).unwrap_err();
        assert!(matches!(err, StagingError::FileSystem { .. }), "{err:?}");
    }

    #[test]
    fn folder_input() {
        let fs = sample();
        assert!(is_folder_input(&fs, Path::new("/pkg/site")).unwrap());
        assert!(!is_folder_input(&fs, Path::new("/pkg/site.zip")).unwrap());

        let err = is_folder_input(&fs, Path::new("/pkg/missing")).unwrap_err();
        assert!(matches!(err, StagingError::InvalidInput(ref p) if p == Path::new("/pkg/missing")));
    }
}
