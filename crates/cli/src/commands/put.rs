use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::AsyncReadExt;

use crate::config::AppConfig;
use crate::progress;

#[derive(Args)]
pub struct PutArgs {
    /// Volume handle
    volume: String,

    /// Local file to upload, or - for stdin
    source: PathBuf,

    /// Destination path, relative to the volume root
    path: String,

    /// Replace an existing file
    #[arg(short, long)]
    force: bool,
}

pub async fn run(args: PutArgs, config_path: &Path) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let volume = config.open_volume(&args.volume)?;

    if !args.force && volume.exists(&args.path).await? {
        anyhow::bail!("'{}' already exists (use --force to replace)", args.path);
    }

    let data = if args.source.as_os_str() == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        buf
    } else {
        tokio::fs::read(&args.source)
            .await
            .with_context(|| format!("failed to read {}", args.source.display()))?
    };

    let spinner = progress::create_spinner(&format!("Uploading {}...", args.path));
    let result = volume.write(&args.path, &data).await;
    spinner.finish_and_clear();
    result?;

    println!("Uploaded {} ({} bytes).", args.path, data.len());
    Ok(())
}
