use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use volumes_core::{BackendKind, VolumeConfig};

use crate::config::AppConfig;

#[derive(Args)]
pub struct VolumeArgs {
    #[command(subcommand)]
    action: VolumeAction,
}

#[derive(Subcommand)]
enum VolumeAction {
    /// Add a new volume
    Add {
        /// Display name
        #[arg(long)]
        name: String,
        /// Short handle used to address the volume
        #[arg(long)]
        handle: String,
        /// Storage root, may contain $VAR or ${VAR} placeholders
        #[arg(long)]
        path: String,
        /// Public base URL, if files are publicly served
        #[arg(long)]
        url: Option<String>,
        /// Backend type
        #[arg(long = "type", default_value = "local")]
        backend: String,
    },
    /// List configured volumes
    List,
    /// Show the resolved root path and URL of a volume
    Info {
        /// Volume handle
        handle: String,
    },
    /// Remove a volume from the config. Stored files are left in place.
    Remove {
        /// Volume handle
        handle: String,
    },
}

pub async fn run(args: VolumeArgs, config_path: &Path) -> Result<()> {
    match args.action {
        VolumeAction::Add {
            name,
            handle,
            path,
            url,
            backend,
        } => {
            let mut config = AppConfig::load_or_default(config_path)?;
            if config.find_volume(&handle).is_some() {
                anyhow::bail!("volume '{handle}' already exists");
            }
            let backend: BackendKind = backend.parse()?;
            let mut volume = VolumeConfig::local(&name, &handle, &path);
            volume.backend = backend;
            volume.url = url;
            volumes_core::volume::validate(&volume)?;

            config.volumes.push(volume);
            config.save(config_path)?;
            info!(
                handle = %handle,
                config_path = %config_path.display(),
                "Volume added. Config saved."
            );
            println!("Volume '{handle}' added.");
        }
        VolumeAction::List => {
            let config = AppConfig::load_or_default(config_path)?;
            if config.volumes.is_empty() {
                println!("No volumes configured.");
            } else {
                println!("{:<16} {:<24} {:<14} {:<40}", "HANDLE", "NAME", "TYPE", "PATH");
                println!("{}", "-".repeat(94));
                for v in &config.volumes {
                    println!(
                        "{:<16} {:<24} {:<14} {:<40}",
                        v.handle,
                        v.name,
                        v.backend.display_name(),
                        v.path
                    );
                }
            }
        }
        VolumeAction::Info { handle } => {
            let config = AppConfig::load(config_path)?;
            let volume = config.open_volume(&handle)?;
            let cfg = volume.config();
            println!("Volume:    {}", cfg.name);
            println!("Handle:    {}", cfg.handle);
            println!("UID:       {}", cfg.uid);
            println!("Type:      {}", volume.display_name());
            println!("Path:      {}", cfg.path);
            println!("Root:      {}", volume.root_path());
            println!(
                "URL:       {}",
                volume.root_url().as_deref().unwrap_or("-")
            );
        }
        VolumeAction::Remove { handle } => {
            let mut config = AppConfig::load(config_path)?;
            let before = config.volumes.len();
            config
                .volumes
                .retain(|v| !v.handle.eq_ignore_ascii_case(&handle));
            if config.volumes.len() == before {
                anyhow::bail!("volume '{handle}' not found");
            }
            config.save(config_path)?;
            println!("Volume '{handle}' removed.");
        }
    }
    Ok(())
}
