use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable holding the agent's default working directory.
pub const WORKING_DIR_ENV: &str = "SYSTEM_DEFAULTWORKINGDIRECTORY";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory for temporary folders, zips and parameter files. Falls back to SYSTEM_DEFAULTWORKINGDIRECTORY, then the current directory.
    #[arg(long, global = true)]
    pub working_dir: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// List files matching a path pattern containing `*` or `?`.
    Find {
        /// Literal path or glob pattern (e.g. /app/build/*.zip).
        pattern: String,
    },

    /// Report whether an input package is a folder or a file.
    Classify {
        #[arg(required = true)]
        path: PathBuf,
    },

    /// Recursively copy a directory tree.
    #[command(alias = "cp")]
    Copy {
        source: PathBuf,
        destination: PathBuf,
    },

    /// Print a temporary path that does not exist yet.
    TempPath {
        /// Generate a `.zip` path instead of a folder path.
        #[arg(long)]
        zip: bool,

        /// Base directory. Defaults to the working directory.
        base: Option<PathBuf>,
    },

    /// Check whether a zip archive is a Web Deploy (MSDeploy) package.
    Inspect {
        #[arg(required = true)]
        archive: PathBuf,
    },

    /// Copy or unpack a package into a temporary working folder.
    Materialize {
        /// Package folder or zip archive. Folder vs. archive is detected from the path.
        #[arg(required = true)]
        input: PathBuf,
    },

    /// Pack a working folder into a temporary zip and remove the folder.
    Finalize {
        #[arg(required = true)]
        folder: PathBuf,

        /// Folder-based deployment: return the folder without packing.
        #[arg(long = "folder-deployment")]
        folder_deployment: bool,
    },

    /// Copy a set-parameters file into the working directory.
    SetParams {
        file: Option<PathBuf>,
    },
}

/// Resolves the working directory.
///
/// Priority:
/// 1. `--working-dir` command-line argument.
/// 2. `SYSTEM_DEFAULTWORKINGDIRECTORY` environment variable.
/// 3. The current directory.
pub fn working_dir_from_opt_or_env(working_dir: Option<PathBuf>) -> Result<PathBuf, std::io::Error> {
    if let Some(dir) = working_dir {
        return Ok(dir);
    }
    match std::env::var_os(WORKING_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => std::env::current_dir(),
    }
}

/// Parses command-line arguments using `clap`.
pub fn run() -> Args {
    Args::parse()
}
