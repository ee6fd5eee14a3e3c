use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct RmArgs {
    /// Volume handle
    volume: String,

    /// Path to delete, relative to the volume root
    path: String,

    /// Delete a folder and everything in it
    #[arg(short, long)]
    recursive: bool,
}

pub async fn run(args: RmArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let volume = config.open_volume(&args.volume)?;
    if args.recursive {
        volume.delete_dir(&args.path).await?;
    } else {
        volume.delete(&args.path).await?;
    }
    println!("Deleted {}.", args.path);
    Ok(())
}
