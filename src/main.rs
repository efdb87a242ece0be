//! Main entry point for the deploystage CLI app

use deploystage::archive::{is_msdeploy_package, ZipArchiver};
use deploystage::cli::{self, Args, Commands};
use deploystage::fsx::OsFs;
use deploystage::{classify, copy, find, temp_path, Stager, StagingConfig};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let args = cli::run();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_app(args).await {
        eprintln!("Error: {}", e);
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn run_app(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let fs = OsFs;
    let config = StagingConfig::new(cli::working_dir_from_opt_or_env(args.working_dir)?);
    let stager = Stager::new(&fs, &ZipArchiver, &config);

    match args.command {
        Commands::Find { pattern } => {
            let files = find::resolve(&fs, &pattern)?;
            if args.json {
                println!("{}", serde_json::to_string(&files)?);
            } else {
                for file in files {
                    println!("{}", file.display());
                }
            }
        }
        Commands::Classify { path } => {
            let kind = if classify::is_folder_input(&fs, &path)? { "folder" } else { "file" };
            if args.json {
                println!("{}", json!({ "path": path, "kind": kind }));
            } else {
                println!("{kind}");
            }
        }
        Commands::Copy { source, destination } => {
            copy::copy_tree(&fs, &source, &destination)?;
            tracing::info!(from = %source.display(), to = %destination.display(), "copied tree");
        }
        Commands::TempPath { zip, base } => {
            let base = base.unwrap_or_else(|| config.working_dir.clone());
            let path = temp_path::generate_temp_path(&fs, &base, !zip);
            if args.json {
                println!("{}", json!({ "path": path }));
            } else {
                println!("{}", path.display());
            }
        }
        Commands::Inspect { archive } => {
            let is_msdeploy = is_msdeploy_package(&ZipArchiver, &archive).await?;
            if args.json {
                println!("{}", json!({ "archive": archive, "msdeploy": is_msdeploy }));
            } else {
                println!("{is_msdeploy}");
            }
        }
        Commands::Materialize { input } => {
            let is_folder = classify::is_folder_input(&fs, &input)?;
            let folder = stager.materialize(is_folder, &input).await?;
            if args.json {
                println!("{}", json!({ "folder": folder, "folderDeployment": is_folder }));
            } else {
                println!("{}", folder.display());
            }
        }
        Commands::Finalize { folder, folder_deployment } => {
            let staged = stager.finalize(folder_deployment, &folder).await?;
            if args.json {
                println!("{}", serde_json::to_string(&staged)?);
            } else {
                println!("{}", staged.package.display());
            }
        }
        Commands::SetParams { file } => {
            match stager.copy_set_parameters_file(file.as_deref())? {
                Some(staged) if args.json => println!("{}", json!({ "setParametersFile": staged })),
                Some(staged) => println!("{}", staged.display()),
                None if args.json => println!("{}", json!({ "setParametersFile": null })),
                None => {}
            }
        }
    }

    Ok(())
}
