use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct MvArgs {
    /// Volume handle
    volume: String,

    /// Source path, relative to the volume root
    src: String,

    /// Destination path, relative to the volume root
    dst: String,
}

pub async fn run(args: MvArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let volume = config.open_volume(&args.volume)?;
    volume.rename(&args.src, &args.dst).await?;
    println!("Moved {} to {}.", args.src, args.dst);
    Ok(())
}
