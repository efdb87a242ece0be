use std::io;
use std::path::{Path, PathBuf};

/// The primary error type for all operations in the `deploystage` crate.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    /// The supplied package or folder path does not exist.
    #[error("Invalid web app package or folder path provided: {}", .0.display())]
    InvalidInput(PathBuf),

    /// A declared set-parameters file does not exist.
    #[error("Set parameters file not found: {}", .0.display())]
    SetParametersFileNotFound(PathBuf),

    /// An unexpected file-system failure. Includes the path where the error happened.
    #[error("I/O error on path '{}': {source}", .path.display())]
    FileSystem {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// An error from the `zip` crate while reading or writing an archive.
    #[error("Archive error on '{}': {source}", .path.display())]
    Archive {
        #[source]
        source: zip::result::ZipError,
        path: PathBuf,
    },

    /// An enumerated entry was not located under the directory it was listed from.
    #[error("Could not strip prefix '{}' from path '{}'", .prefix.display(), .path.display())]
    StripPrefix { prefix: PathBuf, path: PathBuf },

    /// The pattern could not be compiled by the glob matcher.
    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        #[source]
        source: glob::PatternError,
        pattern: String,
    },

    /// A blocking archive task panicked or was cancelled.
    #[error("Archive task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StagingError>;

impl StagingError {
    pub(crate) fn fs(path: &Path, source: io::Error) -> Self {
        StagingError::FileSystem { source, path: path.to_path_buf() }
    }

    pub(crate) fn archive(path: &Path, source: zip::result::ZipError) -> Self {
        StagingError::Archive { source, path: path.to_path_buf() }
    }

    /// True for `InvalidInput` and `SetParametersFileNotFound`.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            StagingError::InvalidInput(_) | StagingError::SetParametersFileNotFound(_)
        )
    }
}

/// Attaches the offending path to a raw `io::Result`.
pub(crate) trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|e| StagingError::fs(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let err = StagingError::fs(
            Path::new("/data/pkg.zip"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/data/pkg.zip"), "{msg}");
        assert!(msg.contains("denied"), "{msg}");
    }

    #[test]
    fn invalid_input_classification() {
        assert!(StagingError::InvalidInput(PathBuf::from("x")).is_invalid_input());
        assert!(StagingError::SetParametersFileNotFound(PathBuf::from("x")).is_invalid_input());
        assert!(!StagingError::fs(Path::new("x"), io::ErrorKind::Other.into()).is_invalid_input());
    }
}
