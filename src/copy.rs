//! Recursive directory copy.

use std::path::Path;

use crate::error::{IoResultExt, Result, StagingError};
use crate::fsx::FileSystem;

/// Copies every entry under `source` to the same relative location under
/// `destination`, overwriting files that already exist there.
///
/// Nothing at the destination is deleted.
pub fn copy_tree(fs: &dyn FileSystem, source: &Path, destination: &Path) -> Result<()> {
    if !fs.exists(destination) {
        fs.create_dir_all(destination).at(destination)?;
    }

    for entry in fs.find(source).at(source)? {
        let relative = entry.strip_prefix(source).map_err(|_| StagingError::StripPrefix {
            prefix: source.to_path_buf(),
            path: entry.clone(),
        })?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = destination.join(relative);

        if fs.metadata(&entry).at(&entry)?.is_dir() {
            fs.create_dir_all(&target).at(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            if !fs.exists(parent) {
                fs.create_dir_all(parent).at(parent)?;
            }
        }
        tracing::debug!(from = %entry.display(), to = %target.display(), "copy file");
        fs.copy_file(&entry, &target).at(&target)?;
    }

    Ok(())
}
