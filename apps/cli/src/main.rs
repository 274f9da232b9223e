//! Kiln upload CLI.
//!
//! Pushes a trained model file, or a folder of model files, to the hub and
//! prints the resulting repository URL.

use clap::{ArgGroup, Parser};
use colored::Colorize;
use kiln_models::HubClient;
use kiln_training::{inspect_checkpoint, CheckpointFormat};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "kiln-upload",
    version,
    about = "Upload a trained model to the hub",
    group(ArgGroup::new("artifact").required(true).args(["model", "folder"]))
)]
struct Args {
    /// Hub write token
    #[arg(long)]
    token: String,

    /// Repository ID (username/model-name)
    #[arg(long)]
    repo: String,

    /// Path to a model file (.pth, .bin, .safetensors, .json)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Path to a folder containing model files
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Name for the model file on the hub
    #[arg(long, default_value = "pytorch_model.bin")]
    name: String,

    /// Hub endpoint, for self-hosted deployments
    #[arg(long, default_value = kiln_models::DEFAULT_HUB_URL, hide = true)]
    endpoint: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(url) => {
            println!();
            println!("{}", "Upload complete!".green().bold());
            println!("Your model is now available at: {}", url.cyan());
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<String> {
    let client = HubClient::with_base_url(&args.token, &args.endpoint);
    let url = if let Some(model) = &args.model {
        upload_model(&client, model, &args.repo, &args.name).await?
    } else if let Some(folder) = &args.folder {
        upload_folder(&client, folder, &args.repo).await?
    } else {
        // clap's artifact group guarantees one of the two is present.
        anyhow::bail!("either --model or --folder must be specified");
    };
    Ok(url)
}

async fn upload_model(
    client: &HubClient,
    model: &Path,
    repo: &str,
    name: &str,
) -> anyhow::Result<String> {
    println!("{}", "Uploading model to the hub...".bold());
    println!("  Model: {}", model.display().to_string().green());
    println!("  Repository: {}", repo.cyan());

    // Content verification is advisory only; the upload proceeds either way.
    if model.exists() {
        match inspect_checkpoint(model) {
            Ok(info) if info.format != CheckpointFormat::Unknown => {
                let tensors = info
                    .tensor_count
                    .map(|count| format!(", {count} entries"))
                    .unwrap_or_default();
                println!(
                    "  {} {:?} checkpoint ({} bytes{tensors})",
                    "✓".green(),
                    info.format,
                    info.size_bytes
                );
            }
            Ok(_) => {
                println!(
                    "  {}",
                    "Warning: unrecognized checkpoint format, continuing with upload".yellow()
                );
            }
            Err(e) => {
                println!(
                    "  {}",
                    format!("Warning: could not verify model: {e}. Continuing with upload.")
                        .yellow()
                );
            }
        }
    }

    let url = client.upload_file(model, repo, name).await?;
    println!("  {}", "Model uploaded successfully".green());
    Ok(url)
}

async fn upload_folder(client: &HubClient, folder: &Path, repo: &str) -> anyhow::Result<String> {
    println!("{}", "Uploading model folder to the hub...".bold());
    println!("  Folder: {}", folder.display().to_string().green());
    println!("  Repository: {}", repo.cyan());

    if folder.is_dir() {
        let files: Vec<String> = std::fs::read_dir(folder)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        println!("  Files to upload: {}", files.join(", ").dimmed());
    }

    let url = client.upload_folder(folder, repo).await?;
    println!("  {}", "Folder uploaded successfully".green());
    Ok(url)
}
