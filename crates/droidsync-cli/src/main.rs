//! droidsync CLI - sync a local audio library to an Android device
//!
//! Provides commands for:
//! - Scanning the LAN for devices with bridge networking enabled
//! - Connecting to a device over USB or Wi-Fi
//! - Syncing new tracks, clearing-and-syncing, and deleting device music
//! - Viewing and editing the persisted settings

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    config::ConfigCommand,
    connect::ConnectCommand,
    scan::ScanCommand,
    status::StatusCommand,
    sync::SyncCommand,
    wipe::{ClearSyncCommand, DeleteCommand},
};
use droidsync_core::settings::Settings;
use output::{Output, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "droidsync",
    version,
    about = "Keep a local audio library in sync with an Android device"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use an alternate settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan the configured range for devices with bridge networking enabled
    Scan(ScanCommand),
    /// Connect to a device by address or serial, or replay stored endpoints
    Connect(ConnectCommand),
    /// Show the connected device, its IP and model
    Status(StatusCommand),
    /// Push local tracks missing from the device
    Sync(SyncCommand),
    /// Delete all device music, then sync everything
    ClearSync(ClearSyncCommand),
    /// Delete all music files from the device
    Delete(DeleteCommand),
    /// View and manage settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing; formatter output is the primary surface, so tracing
    // stays quiet unless asked for.
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let out = Output::new(if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    });

    let settings_path = cli.settings.unwrap_or_else(Settings::default_path);

    match cli.command {
        Commands::Scan(cmd) => cmd.execute(&out, &settings_path).await,
        Commands::Connect(cmd) => cmd.execute(&out, &settings_path).await,
        Commands::Status(cmd) => cmd.execute(&out).await,
        Commands::Sync(cmd) => cmd.execute(&out, &settings_path).await,
        Commands::ClearSync(cmd) => cmd.execute(&out, &settings_path).await,
        Commands::Delete(cmd) => cmd.execute(&out).await,
        Commands::Config(cmd) => cmd.execute(&out, &settings_path).await,
    }
}
