use std::path::Path;

use anyhow::Result;
use clap::Args;

use volumes_core::volume::renamed_dir_path;

use crate::config::AppConfig;

#[derive(Args)]
pub struct RenameDirArgs {
    /// Volume handle
    volume: String,

    /// Folder to rename, relative to the volume root
    path: String,

    /// New name for the folder (a single path segment)
    new_name: String,
}

pub async fn run(args: RenameDirArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let volume = config.open_volume(&args.volume)?;
    volume.rename_dir(&args.path, &args.new_name).await?;
    println!(
        "Renamed {} to {}.",
        args.path,
        renamed_dir_path(&args.path, &args.new_name)
    );
    Ok(())
}
