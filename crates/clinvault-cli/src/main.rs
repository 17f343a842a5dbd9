//! clinvault CLI - upload, delete and purge clinical assets.
//!
//! Configuration comes from the environment (or `.env`); REGISTRY_BASE_URL is required.
//! Results are printed as JSON on stdout, failures as JSON on stderr.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clinvault_cli::{init_tracing, ErrorReport, Pipelines};
use clinvault_core::{AppError, Config, UploadRequest};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "clinvault", about = "Clinical asset store CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a file and register it with the document registry
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Subject reference, e.g. Patient/123
        #[arg(long)]
        subject: Option<String>,
        /// Author reference, e.g. Practitioner/7
        #[arg(long)]
        author: Option<String>,
        /// MIME type recorded for non-image files
        #[arg(long)]
        content_type: Option<String>,
        /// Original filename; defaults to the file's name
        #[arg(long)]
        filename: Option<String>,
    },
    /// Delete a registry record, detach its dependents and remove its files
    Delete {
        /// Registry id of the metadata record
        id: String,
    },
    /// Remove every stored file except the reserved marker
    Purge,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn run(command: Commands, pipelines: &Pipelines) -> anyhow::Result<()> {
    match command {
        Commands::Upload {
            file,
            subject,
            author,
            content_type,
            filename,
        } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read file: {}", file.display()))?;

            let mut request = UploadRequest::new(data);
            request.original_filename = filename.or_else(|| {
                file.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            });
            request.content_type = content_type;
            request.subject_ref = subject;
            request.author_ref = author;

            let response = pipelines.upload.upload(request).await?;
            print_json(&response)?;
        }
        Commands::Delete { id } => {
            let outcome = pipelines.delete.delete(&id).await?;
            print_json(&outcome)?;
        }
        Commands::Purge => {
            let report = pipelines.purge.purge().await?;
            print_json(&report)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let pipelines = Pipelines::from_config(&config).await?;

    if let Err(err) = run(cli.command, &pipelines).await {
        let Some(app_error) = err.downcast_ref::<AppError>() else {
            return Err(err);
        };
        let report = ErrorReport::new(app_error, config.is_production());
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&report).context("Serialize error")?
        );
        std::process::exit(1);
    }

    Ok(())
}
