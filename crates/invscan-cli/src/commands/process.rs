//! Process command - extract an invoice record from a single file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invscan_core::models::history::{image_data_url, ExtractionEntry, ExtractionHistory};

use super::{data_path, load_config, Extractor, InputKind};
use crate::output::{format_record, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (image or .txt with recognized text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Append the recognized text to the extraction history
    #[arg(long)]
    save: bool,

    /// Print extraction warnings
    #[arg(long)]
    show_warnings: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if InputKind::of(&args.input).is_none() {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message("Recognizing text...");

    let mut extractor = Extractor::new(&config, args.model_dir.clone());
    let extracted = extractor.extract(&args.input, &mut |p: f32| {
        pb.set_position((p * 100.0).round() as u64);
    })?;

    pb.finish_and_clear();

    let extraction = &extracted.extraction;

    if args.show_warnings && !extraction.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &extraction.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let output = format_record(&extraction.record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.save {
        let history_path = data_path(&config.history.path);
        let mut history = ExtractionHistory::load(&history_path)?;

        let file_name = args
            .input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let image_data = extracted
            .image
            .as_deref()
            .map(image_data_url)
            .unwrap_or_default();

        let now = Utc::now();
        let entry = ExtractionEntry::new(file_name, extraction.raw_text.clone(), image_data, now);
        let id = history.push(entry, now);
        history.save(&history_path)?;

        eprintln!(
            "{} Saved to history as {} ({})",
            style("✓").green(),
            id,
            history_path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
