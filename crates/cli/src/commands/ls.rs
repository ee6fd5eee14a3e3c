use std::path::Path;

use anyhow::Result;
use clap::Args;

use volumes_core::EntryKind;

use crate::config::AppConfig;

#[derive(Args)]
pub struct LsArgs {
    /// Volume handle
    volume: String,

    /// Folder to list, relative to the volume root
    #[arg(default_value = "")]
    path: String,

    /// Descend into subfolders
    #[arg(short, long)]
    recursive: bool,

    /// Print entries as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: LsArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let volume = config.open_volume(&args.volume)?;
    let entries = volume.list_contents(&args.path, args.recursive).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    println!("{:<5} {:<10} {:<20} {}", "TYPE", "SIZE", "MODIFIED", "PATH");
    println!("{}", "-".repeat(70));
    for entry in &entries {
        let kind = match entry.kind {
            EntryKind::Directory => "dir",
            EntryKind::File => "file",
        };
        let modified = entry
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let size = match entry.kind {
            EntryKind::Directory => "-".to_string(),
            EntryKind::File => format_bytes(entry.size),
        };
        println!("{:<5} {:<10} {:<20} {}", kind, size, modified, entry.path);
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
