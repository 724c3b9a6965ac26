//! History command - browse and manage saved extractions.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Args, Subcommand};
use console::style;

use invscan_core::models::history::{ExtractionEntry, ExtractionHistory};

use super::{data_path, load_config};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    command: HistoryCommand,
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// List saved extractions, newest first
    List,

    /// Find extractions whose text or file name contains a term
    Search {
        /// Search term (case-insensitive)
        term: String,
    },

    /// Print the text of one extraction
    Show {
        /// Entry id
        id: String,
    },

    /// Delete an extraction
    Delete {
        /// Entry id
        id: String,
    },

    /// Write the text of an extraction to a file
    Export {
        /// Entry id
        id: String,

        /// Output file (default: extracted-text-YYYY-MM-DD.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn run(args: HistoryArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let path = data_path(&config.history.path);
    let mut history = ExtractionHistory::load(&path)?;

    match args.command {
        HistoryCommand::List => {
            print_entries(&history.data.iter().rev().collect::<Vec<_>>());
        }
        HistoryCommand::Search { term } => {
            let found = history.search(&term);
            if found.is_empty() {
                println!("{} No extractions match {:?}", style("ℹ").blue(), term);
            } else {
                print_entries(&found);
            }
        }
        HistoryCommand::Show { id } => {
            let entry = find(&history, &id)?;
            println!("{}", entry.text);
        }
        HistoryCommand::Delete { id } => {
            if !history.remove(&id, Utc::now()) {
                anyhow::bail!("No history entry with id {}", id);
            }
            history.save(&path)?;
            println!("{} Deleted {}", style("✓").green(), id);
        }
        HistoryCommand::Export { id, output } => {
            let entry = find(&history, &id)?;
            let output = output.unwrap_or_else(|| PathBuf::from(entry.download_file_name()));
            fs::write(&output, &entry.text)?;
            println!(
                "{} Exported {} to {}",
                style("✓").green(),
                id,
                output.display()
            );
        }
    }

    Ok(())
}

fn find<'a>(history: &'a ExtractionHistory, id: &str) -> anyhow::Result<&'a ExtractionEntry> {
    history
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("No history entry with id {}", id))
}

fn print_entries(entries: &[&ExtractionEntry]) {
    if entries.is_empty() {
        println!("{} History is empty.", style("ℹ").blue());
        return;
    }

    for entry in entries {
        let preview: String = entry
            .text
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(50)
            .collect();
        println!(
            "{}  {}  {:<24} {}",
            style(&entry.id).cyan(),
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.file_name,
            style(preview).dim()
        );
    }
}
