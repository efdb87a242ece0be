//! # Archive Handling
//!
//! Zip wrap/unwrap for deployment packages.
//!
//! Archive I/O is the only suspending work in this crate: the [`Archiver`]
//! trait exposes async operations, and [`ZipArchiver`] runs the blocking
//! `zip` calls on tokio's blocking pool.
//!
//! Entry names always use `/` as the separator, regardless of platform.

use std::fs::{self, File};
use std::future::Future;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{IoResultExt, Result, StagingError};
use crate::fsx;

mod inspect;

pub use inspect::{entries_look_like_msdeploy, is_msdeploy_package};

/// Reads, unpacks and packs archives.
pub trait Archiver: Send + Sync {
    /// Names of every entry in the archive, in archive order.
    fn list_entries(&self, archive: &Path) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Extracts the archive into `dest_dir`, creating it if needed.
    fn unpack(&self, archive: &Path, dest_dir: &Path) -> impl Future<Output = Result<()>> + Send;

    /// Packs the contents of `source_dir` (not the directory itself) into
    /// `dest_zip` and returns the archive path.
    fn pack(
        &self,
        source_dir: &Path,
        filter: &PackFilter,
        dest_zip: &Path,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Selects which files go into a packed archive.
///
/// Patterns match entry names relative to the packed folder (`bin/*.dll`).
/// An empty filter includes everything.
#[derive(Debug, Clone, Default)]
pub struct PackFilter {
    patterns: Vec<Pattern>,
}

impl PackFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|source| StagingError::Pattern {
                    source,
                    pattern: p.as_ref().to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn includes(&self, entry_name: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(entry_name))
    }
}

/// [`Archiver`] backed by the `zip` crate, Deflate-compressed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn list_entries(&self, archive: &Path) -> impl Future<Output = Result<Vec<String>>> + Send {
        let archive = archive.to_path_buf();
        blocking(move || read_entry_names(&archive))
    }

    fn unpack(&self, archive: &Path, dest_dir: &Path) -> impl Future<Output = Result<()>> + Send {
        let (archive, dest_dir) = (archive.to_path_buf(), dest_dir.to_path_buf());
        blocking(move || extract_zip(&archive, &dest_dir))
    }

    fn pack(
        &self,
        source_dir: &Path,
        filter: &PackFilter,
        dest_zip: &Path,
    ) -> impl Future<Output = Result<PathBuf>> + Send {
        let (source_dir, dest_zip) = (source_dir.to_path_buf(), dest_zip.to_path_buf());
        let filter = filter.clone();
        blocking(move || {
            write_zip(&source_dir, &filter, &dest_zip)?;
            Ok(dest_zip)
        })
    }
}

/// Runs blocking zip work on tokio's blocking pool.
async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

/// Normalize a relative path to a zip entry name: forward slashes, no leading `./`.
pub(crate) fn entry_name(relative: &Path) -> String {
    let s = relative.to_string_lossy().replace('\\', "/");
    s.strip_prefix("./").unwrap_or(&s).to_string()
}

fn open_zip(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).at(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| StagingError::archive(path, e))
}

fn read_entry_names(archive_path: &Path) -> Result<Vec<String>> {
    let mut archive = open_zip(archive_path)?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| StagingError::archive(archive_path, e))?;
        names.push(entry.name().to_string());
    }
    Ok(names)
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let mut archive = open_zip(archive_path)?;
    fs::create_dir_all(dest_dir).at(dest_dir)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| StagingError::archive(archive_path, e))?;
        // Entries escaping the destination (`../x`, absolute paths) are skipped.
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::debug!(entry = entry.name(), "skipping unsafe archive entry");
            continue;
        };
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).at(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).at(parent)?;
        }
        let mut out = File::create(&out_path).at(&out_path)?;
        io::copy(&mut entry, &mut out).at(&out_path)?;

        if let Some(mode) = entry.unix_mode() {
            fsx::set_unix_permissions(&out_path, mode & 0o7777).at(&out_path)?;
        }
    }

    tracing::debug!(
        archive = %archive_path.display(),
        dest = %dest_dir.display(),
        entries = archive.len(),
        "unpacked archive"
    );
    Ok(())
}

fn write_zip(source_dir: &Path, filter: &PackFilter, dest_zip: &Path) -> Result<()> {
    if let Some(parent) = dest_zip.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    let out = File::create(dest_zip).at(dest_zip)?;
    let mut zip = ZipWriter::new(BufWriter::new(out));
    let base_options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut written = 0usize;
    for entry in WalkDir::new(source_dir).follow_links(true).sort_by_file_name().min_depth(1) {
        let entry = entry.map_err(|e| StagingError::fs(source_dir, io::Error::from(e)))?;
        let path = entry.path();
        let relative = path.strip_prefix(source_dir).map_err(|_| StagingError::StripPrefix {
            prefix: source_dir.to_path_buf(),
            path: path.to_path_buf(),
        })?;
        let name = entry_name(relative);

        if entry.file_type().is_dir() {
            if filter.patterns.is_empty() {
                zip.add_directory(format!("{name}/"), base_options)
                    .map_err(|e| StagingError::archive(dest_zip, e))?;
            }
            continue;
        }
        if !filter.includes(&name) {
            continue;
        }

        let meta = entry.metadata().map_err(|e| StagingError::fs(path, io::Error::from(e)))?;
        let options = match fsx::unix_mode(&meta) {
            Some(mode) => base_options.unix_permissions(mode),
            None => base_options,
        };
        zip.start_file(name, options).map_err(|e| StagingError::archive(dest_zip, e))?;
        let mut input = File::open(path).at(path)?;
        io::copy(&mut input, &mut zip).at(path)?;
        written += 1;
    }

    let mut out = zip.finish().map_err(|e| StagingError::archive(dest_zip, e))?;
    out.flush().at(dest_zip)?;
    tracing::debug!(
        source = %source_dir.display(),
        archive = %dest_zip.display(),
        files = written,
        "packed folder"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_use_forward_slashes() {
        assert_eq!(entry_name(Path::new("./bin/app.dll")), "bin/app.dll");
        assert_eq!(entry_name(Path::new(r"bin\app.dll")), "bin/app.dll");
    }

    #[test]
    fn filter_matches_relative_names() {
        let filter = PackFilter::new(&["bin/*.dll", "*.config"]).unwrap();
        assert!(filter.includes("bin/app.dll"));
        assert!(filter.includes("web.config"));
        assert!(!filter.includes("wwwroot/site.css"));
        assert!(PackFilter::all().includes("anything/at/all"));
    }

    #[test]
    fn filter_rejects_bad_pattern() {
        assert!(PackFilter::new(&["[oops"]).is_err());
    }

    #[tokio::test]
    async fn pack_list_unpack() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("site");
        fs::create_dir_all(src.join("bin")).unwrap();
        fs::write(src.join("web.config"), "<configuration/>").unwrap();
        fs::write(src.join("bin").join("app.dll"), [1u8, 2, 3]).unwrap();

        let zip_path = tmp.path().join("site.zip");
        let packed = ZipArchiver.pack(&src, &PackFilter::all(), &zip_path).await.unwrap();
        assert_eq!(packed, zip_path);

        let entries = ZipArchiver.list_entries(&zip_path).await.unwrap();
        assert_eq!(entries, vec!["bin/", "bin/app.dll", "web.config"]);

        let out = tmp.path().join("out");
        ZipArchiver.unpack(&zip_path, &out).await.unwrap();
        assert_eq!(fs::read(out.join("bin").join("app.dll")).unwrap(), vec![1u8, 2, 3]);
        assert_eq!(fs::read_to_string(out.join("web.config")).unwrap(), "<configuration/>");
    }

    #[tokio::test]
    async fn pack_with_filter_skips_directories_and_unmatched() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("site");
        fs::create_dir_all(src.join("bin")).unwrap();
        fs::write(src.join("web.config"), "c").unwrap();
        fs::write(src.join("bin").join("app.dll"), "d").unwrap();
        fs::write(src.join("bin").join("app.pdb"), "p").unwrap();

        let zip_path = tmp.path().join("site.zip");
        let filter = PackFilter::new(&["bin/*.dll"]).unwrap();
        ZipArchiver.pack(&src, &filter, &zip_path).await.unwrap();

        let entries = ZipArchiver.list_entries(&zip_path).await.unwrap();
        assert_eq!(entries, vec!["bin/app.dll"]);
    }

    #[tokio::test]
    async fn list_entries_rejects_non_zip() {
        let tmp = tempfile::tempdir().unwrap();
        let bogus = tmp.path().join("bogus.zip");
        fs::write(&bogus, "not a zip").unwrap();

        let err = ZipArchiver.list_entries(&bogus).await.unwrap_err();
        assert!(matches!(err, StagingError::Archive { .. }), "{err:?}");
    }
}
