use std::io::Write;
use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct CatArgs {
    /// Volume handle
    volume: String,

    /// File path, relative to the volume root
    path: String,
}

pub async fn run(args: CatArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let volume = config.open_volume(&args.volume)?;
    let data = volume.read(&args.path).await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&data)?;
    stdout.flush()?;
    Ok(())
}
