//! Models command - download and manage OCR models.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::debug;

use invscan_core::models::config::ModelConfig;

use super::{load_config, model_config};

/// Where the PaddleOCR latin models are fetched from unless configured otherwise.
const DEFAULT_BASE_URL: &str = "https://github.com/jakubmatias/incr/raw/main/models/mobile";

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    command: ModelsCommand,

    /// Model directory (default: from config)
    #[arg(short, long, global = true)]
    model_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// Check which model files are present
    Status,

    /// Download models
    Download(DownloadArgs),

    /// Remove downloaded models
    Clean,
}

#[derive(Args)]
struct DownloadArgs {
    /// Base URL the model files are fetched from
    #[arg(long)]
    url: Option<String>,

    /// Force re-download even if files exist
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let models = model_config(&config, args.model_dir);

    match args.command {
        ModelsCommand::Status => check_status(&models),
        ModelsCommand::Download(download_args) => download_models(&models, download_args).await,
        ModelsCommand::Clean => clean_models(&models),
    }
}

fn file_url(base: &str, filename: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), filename)
}

async fn download_models(models: &ModelConfig, args: DownloadArgs) -> anyhow::Result<()> {
    let base_url = args
        .url
        .or_else(|| models.download_base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    fs::create_dir_all(&models.model_dir)?;

    println!(
        "{} Downloading models to {}",
        style("ℹ").blue(),
        models.model_dir.display()
    );
    println!();

    let client = reqwest::Client::builder()
        .user_agent(concat!("invscan/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let multi_progress = MultiProgress::new();
    let mut success_count = 0;
    let mut skip_count = 0;
    let mut error_count = 0;

    for filename in models.files() {
        let path = models.model_dir.join(filename);

        if path.exists() && !args.force && fs::metadata(&path)?.len() > 0 {
            println!(
                "  {} {} (already exists, {})",
                style("✓").green(),
                filename,
                format_size(fs::metadata(&path)?.len())
            );
            skip_count += 1;
            continue;
        }

        let pb = multi_progress.add(ProgressBar::new(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} {msg:<30} [{bar:25.cyan/blue}] {bytes}/{total_bytes}")?
                .progress_chars("=>-"),
        );
        pb.set_message(filename.to_string());

        let url = file_url(&base_url, filename);
        debug!("Fetching {}", url);

        match download_file(&client, &url, &path, &pb).await {
            Ok(()) => {
                pb.finish_with_message(format!("{} {}", style("✓").green(), filename));
                success_count += 1;
            }
            Err(e) => {
                pb.finish_with_message(format!("{} {} - {}", style("✗").red(), filename, e));
                error_count += 1;
            }
        }
    }

    println!();

    if error_count == 0 {
        println!("{} Models ready!", style("✓").green().bold());
        if skip_count > 0 {
            println!(
                "   {} downloaded, {} already present",
                success_count, skip_count
            );
        }
    } else {
        println!(
            "{} Download completed with errors",
            style("⚠").yellow().bold()
        );
        println!(
            "   {} downloaded, {} skipped, {} failed",
            success_count, skip_count, error_count
        );
        println!();
        println!("Retry with: invscan models download --force [--url <base>]");
    }

    println!();
    check_status(models)?;

    if error_count > 0 {
        anyhow::bail!("{} model files failed to download", error_count);
    }

    Ok(())
}

async fn download_file(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    if let Some(content_length) = response.content_length() {
        pb.set_length(content_length);
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    Ok(())
}

fn check_status(models: &ModelConfig) -> anyhow::Result<()> {
    println!("{}", style("Model Status").bold());
    println!("{}", models.model_dir.display());

    let mut total_size: u64 = 0;

    for filename in models.files() {
        let path = models.model_dir.join(filename);
        let (status, size_str) = if path.is_file() {
            let size = fs::metadata(&path)?.len();
            total_size += size;
            (style("✓").green(), format_size(size))
        } else {
            (style("✗").red(), "missing".to_string())
        };

        println!("    {} {:<25} {:>10}", status, filename, size_str);
    }

    if models.is_complete() {
        println!(
            "    {} Ready ({} total)",
            style("✓").green(),
            format_size(total_size)
        );
    } else {
        println!(
            "    {} Run 'invscan models download' to download",
            style("⚠").yellow()
        );
    }

    Ok(())
}

fn clean_models(models: &ModelConfig) -> anyhow::Result<()> {
    let mut total_removed = 0;
    let mut total_freed: u64 = 0;

    for filename in models.files() {
        let path = models.model_dir.join(filename);
        if path.exists() {
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            fs::remove_file(&path)?;
            total_removed += 1;
            total_freed += size;
            println!("  {} Removed {}", style("✓").green(), filename);
        }
    }

    // Interrupted downloads
    if let Ok(entries) = fs::read_dir(&models.model_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "tmp") {
                let _ = fs::remove_file(&path);
            }
        }
    }

    if total_removed > 0 {
        println!(
            "{} Removed {} files, freed {}",
            style("✓").green(),
            total_removed,
            format_size(total_freed)
        );
    } else {
        println!("{} No model files to remove.", style("ℹ").blue());
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}
