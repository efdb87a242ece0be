//! # deploystage
//!
//! File-system and packaging helpers for staging web deployment packages.
//!
//! ## Key Modules
//!
//! - [`classify`]: existence and file-vs-folder checks for deployment inputs.
//! - [`find`]: glob-style file lookup rooted at a pattern's literal prefix.
//! - [`copy`]: recursive directory tree copy.
//! - [`temp_path`]: collision-free temporary folder and zip paths.
//! - [`archive`]: zip pack/unpack/list and MSDeploy package detection.
//! - [`staging`]: the materialize/finalize cycle around a working folder.
//! - [`fsx`]: the [`FileSystem`] capability every helper takes.
//!
//! ## Examples
//!
//! ```no_run
//! use deploystage::{find, fsx::OsFs};
//!
//! let zips = find::resolve(&OsFs, "/app/build/*.zip")?;
//! for zip in zips {
//!     println!("{}", zip.display());
//! }
//! # Ok::<(), deploystage::StagingError>(())
//! ```

pub mod archive;
pub mod classify;
pub mod cli;
pub mod copy;
pub mod error;
pub mod find;
pub mod staging;
pub mod temp_path;

// File-system capability layer
pub mod fsx;

pub use archive::{Archiver, PackFilter, ZipArchiver};
pub use error::{Result, StagingError};
pub use fsx::{FileSystem, MemFs, OsFs};
pub use staging::{can_use_web_deploy, StagedPackage, Stager, StagingConfig};
