use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;
use crate::progress;

#[derive(Args)]
pub struct CpArgs {
    /// Volume handle
    volume: String,

    /// Source file, relative to the volume root
    src: String,

    /// Destination path, relative to the volume root
    dst: String,
}

pub async fn run(args: CpArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let volume = config.open_volume(&args.volume)?;

    let spinner = progress::create_spinner(&format!("Copying {}...", args.src));
    let result = volume.copy(&args.src, &args.dst).await;
    spinner.finish_and_clear();
    result?;

    println!("Copied {} to {}.", args.src, args.dst);
    Ok(())
}
