use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct RmdirArgs {
    /// Volume handle
    volume: String,

    /// Folder to delete with everything in it, relative to the volume root
    path: String,
}

pub async fn run(args: RmdirArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let volume = config.open_volume(&args.volume)?;
    volume.delete_dir(&args.path).await?;
    println!("Deleted folder {}.", args.path);
    Ok(())
}
