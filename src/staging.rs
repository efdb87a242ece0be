//! # Deployment Staging
//!
//! Expands a deployment input (folder or zip) into a scratch working folder
//! under the configured working directory, and packs that folder back into a
//! zip once it is ready to ship.
//!
//! ```text
//! input ──materialize──▶ temp_web_package_N/ ──finalize──▶ temp_web_package_M.zip
//! ```
//!
//! Folder-based deployments are copied in and handed back unpacked.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::archive::{Archiver, PackFilter};
use crate::classify;
use crate::copy::copy_tree;
use crate::error::{IoResultExt, Result, StagingError};
use crate::fsx::FileSystem;
use crate::temp_path::generate_temp_path;

/// File name the set-parameters file is copied to inside the working directory.
pub const TEMP_SET_PARAMETERS_FILE: &str = "tempSetParameters.xml";

/// Settings shared by all staging operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingConfig {
    /// Directory that receives temporary folders, zips and parameter files.
    pub working_dir: PathBuf,
}

impl StagingConfig {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self { working_dir: working_dir.into() }
    }
}

/// Result of [`Stager::finalize`].
///
/// Both fields name the same path: the package to deploy is also the
/// temporary artifact the caller should clean up afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedPackage {
    pub package: PathBuf,
    pub temp_package_path: PathBuf,
}

impl StagedPackage {
    fn at(path: PathBuf) -> Self {
        Self { package: path.clone(), temp_package_path: path }
    }
}

/// Runs the materialize/finalize cycle against a file system and archiver.
///
/// Copies, existence checks and the working-folder removal go through `fs`,
/// while the archiver reads and writes wherever its own backend lives
/// ([`ZipArchiver`](crate::archive::ZipArchiver) uses the host disk). Pair
/// [`MemFs`](crate::fsx::MemFs) only with folder deployments, or with an
/// archiver that works on the same tree.
pub struct Stager<'a, A> {
    fs: &'a dyn FileSystem,
    archiver: &'a A,
    config: &'a StagingConfig,
}

impl<'a, A: Archiver> Stager<'a, A> {
    pub fn new(fs: &'a dyn FileSystem, archiver: &'a A, config: &'a StagingConfig) -> Self {
        Self { fs, archiver, config }
    }

    /// Copies or unpacks `input` into a fresh temporary folder and returns it.
    pub async fn materialize(&self, is_folder_deployment: bool, input: &Path) -> Result<PathBuf> {
        let folder = generate_temp_path(self.fs, &self.config.working_dir, true);

        if is_folder_deployment {
            tracing::debug!(
                from = %input.display(),
                to = %folder.display(),
                "copying web package to temporary location"
            );
            copy_tree(self.fs, input, &folder)?;
        } else {
            tracing::debug!(
                from = %input.display(),
                to = %folder.display(),
                "unpacking web package to temporary location"
            );
            self.archiver.unpack(input, &folder).await?;
        }

        tracing::info!(input = %input.display(), folder = %folder.display(), "materialized package");
        Ok(folder)
    }

    /// Packs `working_folder` into a temporary zip and removes the folder.
    ///
    /// Folder-based deployments are returned as-is.
    pub async fn finalize(&self, is_folder_deployment: bool, working_folder: &Path) -> Result<StagedPackage> {
        if is_folder_deployment {
            return Ok(StagedPackage::at(working_folder.to_path_buf()));
        }

        let zip_path = generate_temp_path(self.fs, &self.config.working_dir, false);
        let package = self
            .archiver
            .pack(working_folder, &PackFilter::all(), &zip_path)
            .await?;
        self.fs.remove_all(working_folder).at(working_folder)?;

        tracing::info!(folder = %working_folder.display(), package = %package.display(), "archived folder for deployment");
        Ok(StagedPackage::at(package))
    }

    /// Stages a user-supplied set-parameters file.
    ///
    /// `None`, or a path equal to the working directory (how an unset file
    /// input arrives from the agent), means no file. Otherwise the file must
    /// exist and is copied to [`TEMP_SET_PARAMETERS_FILE`].
    pub fn copy_set_parameters_file(&self, file: Option<&Path>) -> Result<Option<PathBuf>> {
        let Some(file) = file.filter(|f| *f != self.config.working_dir.as_path()) else {
            return Ok(None);
        };
        if !classify::is_file(self.fs, file)? {
            return Err(StagingError::SetParametersFileNotFound(file.to_path_buf()));
        }

        let target = self.config.working_dir.join(TEMP_SET_PARAMETERS_FILE);
        self.fs.copy_file(file, &target).at(&target)?;
        tracing::debug!(from = %file.display(), to = %target.display(), "staged set-parameters file");
        Ok(Some(target))
    }
}

/// Whether Web Deploy can be used: requested explicitly, or running on Windows.
///
/// `os_type` is the host OS name, e.g. `std::env::consts::OS` or an agent's
/// `Windows_NT`.
pub fn can_use_web_deploy(use_web_deploy: bool, os_type: &str) -> bool {
    use_web_deploy || os_type.starts_with("Win") || os_type.starts_with("win")
}
