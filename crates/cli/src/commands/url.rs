use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::config::AppConfig;

#[derive(Args)]
pub struct UrlArgs {
    /// Volume handle
    volume: String,

    /// File path, relative to the volume root. Omit for the base URL.
    #[arg(default_value = "")]
    path: String,
}

pub async fn run(args: UrlArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let volume = config.open_volume(&args.volume)?;
    let Some(url) = volume.public_url(&args.path) else {
        anyhow::bail!("volume '{}' has no public URL", args.volume);
    };
    println!("{url}");
    Ok(())
}
