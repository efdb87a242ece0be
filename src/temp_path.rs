//! Temporary folder/zip path generation.
//!
//! Candidates look like `temp_web_package_<digits>[.zip]`. A candidate is
//! only checked for existence; nothing is reserved, so another process can
//! still claim the path before the caller uses it.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::fsx::FileSystem;

pub const TEMP_PREFIX: &str = "temp_web_package_";

/// Short candidates tried before switching to a high-entropy name.
pub const MAX_TEMP_PATH_ATTEMPTS: usize = 16;

/// Returns a path under `base_dir` that does not exist at call time.
///
/// Folder targets get no extension, archive targets get `.zip`.
pub fn generate_temp_path(fs: &dyn FileSystem, base_dir: &Path, is_folder: bool) -> PathBuf {
    generate_temp_path_with(fs, base_dir, is_folder, &mut rand::thread_rng())
}

pub(crate) fn generate_temp_path_with<R: Rng>(
    fs: &dyn FileSystem,
    base_dir: &Path,
    is_folder: bool,
    rng: &mut R,
) -> PathBuf {
    let suffix = if is_folder { "" } else { ".zip" };

    for _ in 0..MAX_TEMP_PATH_ATTEMPTS {
        let candidate = base_dir.join(format!("{TEMP_PREFIX}{}{suffix}", rng.gen::<u64>()));
        if !fs.exists(&candidate) {
            return candidate;
        }
        tracing::debug!(path = %candidate.display(), "temp path collision, retrying");
    }

    // Random 128 bits plus the clock; only reachable with a degenerate RNG
    // or a directory full of our own leftovers.
    loop {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let candidate = base_dir.join(format!(
            "{TEMP_PREFIX}{}_{nanos}{suffix}",
            rng.gen::<u128>()
        ));
        if !fs.exists(&candidate) {
            tracing::debug!(path = %candidate.display(), "using high-entropy temp path");
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsx::MemFs;
    use rand::rngs::mock::StepRng;

    fn file_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn folder_and_zip_names() {
        let fs = MemFs::new();
        let folder = generate_temp_path(&fs, Path::new("/work"), true);
        let zip = generate_temp_path(&fs, Path::new("/work"), false);

        assert_eq!(folder.parent(), Some(Path::new("/work")));
        let folder_name = file_name(&folder);
        assert!(folder_name.starts_with(TEMP_PREFIX));
        assert!(folder_name[TEMP_PREFIX.len()..].chars().all(|c| c.is_ascii_digit()));

        let zip_name = file_name(&zip);
        assert!(zip_name.starts_with(TEMP_PREFIX) && zip_name.ends_with(".zip"));
    }

    #[test]
    fn skips_existing_candidate() {
        let fs = MemFs::new();
        fs.add_dir("/work/temp_web_package_7");

        // 7, 8, 9, ...
        let mut rng = StepRng::new(7, 1);
        let path = generate_temp_path_with(&fs, Path::new("/work"), true, &mut rng);
        assert_eq!(path, PathBuf::from("/work/temp_web_package_8"));
    }

    #[test]
    fn falls_back_after_bounded_attempts() {
        let fs = MemFs::new();
        fs.add_file("/work/temp_web_package_42.zip", "");

        let mut rng = StepRng::new(42, 0);
        let path = generate_temp_path_with(&fs, Path::new("/work"), false, &mut rng);

        assert!(!fs.exists(&path));
        let name = file_name(&path);
        assert_ne!(name, "temp_web_package_42.zip");
        let digits = name
            .strip_prefix(TEMP_PREFIX)
            .and_then(|rest| rest.strip_suffix(".zip"))
            .unwrap();
        let (random, nanos) = digits.split_once('_').unwrap();
        assert!(random.parse::<u128>().is_ok());
        assert!(nanos.parse::<u128>().is_ok());
    }
}
