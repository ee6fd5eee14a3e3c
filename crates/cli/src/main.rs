mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "volumes",
    version,
    about = "File operations on configured storage volumes"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Path to the volumes config file
    #[arg(long, global = true, env = "VOLUMES_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);

    match cli.command {
        commands::Command::Volume(args) => commands::volume::run(args, &config_path).await,
        commands::Command::Ls(args) => commands::ls::run(args, &config_path).await,
        commands::Command::Cat(args) => commands::cat::run(args, &config_path).await,
        commands::Command::Put(args) => commands::put::run(args, &config_path).await,
        commands::Command::Cp(args) => commands::cp::run(args, &config_path).await,
        commands::Command::Mv(args) => commands::mv::run(args, &config_path).await,
        commands::Command::Rm(args) => commands::rm::run(args, &config_path).await,
        commands::Command::Rmdir(args) => commands::rmdir::run(args, &config_path).await,
        commands::Command::Url(args) => commands::url::run(args, &config_path).await,
        commands::Command::Mkdir(args) => commands::mkdir::run(args, &config_path).await,
        commands::Command::RenameDir(args) => commands::rename_dir::run(args, &config_path).await,
    }
}
