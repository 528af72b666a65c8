//! gdrive CLI - Path-addressed command-line client for Google Drive
//!
//! Provides commands for:
//! - Authentication with Google (OAuth2 PKCE, tokens in the system keyring)
//! - Listing folders and the trash
//! - Removing, sharing, renaming, copying and moving objects by path
//! - Uploading and downloading files with progress
//!
//! Exit status: 0 on success, 2 for missing paths, 3 for authentication
//! failures, 4 for network failures, 1 for anything else.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gdrive_core::config::Config;
use gdrive_core::domain::DriveError;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    auth::AuthCommand,
    config::ConfigCommand,
    list::ListCommand,
    objects::{
        CopyCommand, MakeFolderCommand, MoveCommand, PrivateCommand, RemoveCommand,
        RenameCommand, ShareCommand,
    },
    transfer::{DownloadCommand, UploadCommand},
    trash::TrashCommand,
    Context,
};
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "gdrive", version, about = "Google Drive from the command line")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output; suppresses progress
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Authentication commands
    #[command(subcommand)]
    Auth(AuthCommand),
    /// List a folder
    Ls(ListCommand),
    /// Move an object to the trash, or delete it permanently
    Rm(RemoveCommand),
    /// Make an object readable by anyone with the link
    Share(ShareCommand),
    /// Revoke link sharing for an object
    Private(PrivateCommand),
    /// Rename an object in place
    Rename(RenameCommand),
    /// Copy a file into a folder
    Cp(CopyCommand),
    /// Move an object into a folder
    Mv(MoveCommand),
    /// Create a folder
    Mkdir(MakeFolderCommand),
    /// Inspect, empty, or restore from the trash
    #[command(subcommand)]
    Trash(TrashCommand),
    /// Download a file or export a document
    Download(DownloadCommand),
    /// Upload a file or directory tree
    Upload(UploadCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Commands {
    async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            Commands::Auth(cmd) => cmd.execute(ctx).await,
            Commands::Ls(cmd) => cmd.execute(ctx).await,
            Commands::Rm(cmd) => cmd.execute(ctx).await,
            Commands::Share(cmd) => cmd.execute(ctx).await,
            Commands::Private(cmd) => cmd.execute(ctx).await,
            Commands::Rename(cmd) => cmd.execute(ctx).await,
            Commands::Cp(cmd) => cmd.execute(ctx).await,
            Commands::Mv(cmd) => cmd.execute(ctx).await,
            Commands::Mkdir(cmd) => cmd.execute(ctx).await,
            Commands::Trash(cmd) => cmd.execute(ctx).await,
            Commands::Download(cmd) => cmd.execute(ctx).await,
            Commands::Upload(cmd) => cmd.execute(ctx).await,
            Commands::Config(cmd) => cmd.execute(ctx).await,
        }
    }
}

/// Log filter directive for the `-v` count, or `None` to use the config level
fn verbosity_filter(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Process exit status for a failed command
fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<DriveError>() {
        Some(DriveError::NotFound(_) | DriveError::NotAFolder(_)) => 2,
        Some(DriveError::Auth(_)) => 3,
        Some(DriveError::Network(_)) => 4,
        _ => 1,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // Logs go to stderr so JSON output on stdout stays parseable
    let level = verbosity_filter(cli.verbose).unwrap_or(config.logging.level.as_str());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = Context {
        format,
        quiet: cli.quiet,
        config_path,
        config,
    };

    if let Err(e) = cli.command.execute(&ctx).await {
        get_formatter(cli.json).error(&format!("{e:#}"));
        std::process::exit(exit_code(&e));
    }
}
