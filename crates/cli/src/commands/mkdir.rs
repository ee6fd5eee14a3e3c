use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct MkdirArgs {
    /// Volume handle
    volume: String,

    /// Folder to create, relative to the volume root
    path: String,
}

pub async fn run(args: MkdirArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let volume = config.open_volume(&args.volume)?;
    volume.create_dir(&args.path).await?;
    println!("Created {}.", args.path);
    Ok(())
}
