//! # rix CLI entry point
//!
//! Parses command-line arguments, initialises logging, resolves the
//! configuration and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rix_cli::config::RixConfig;
use rix_cli::endpoint::{run_dest, run_source, DestArgs, SourceArgs};
use rix_cli::hash::{run_hash, HashArgs};
use rix_cli::init::{run_init, InitArgs};
use rix_cli::migrate::{run_migrate, MigrateArgs};
use rix_cli::query::{run_export, run_show, run_stats, ExportArgs, ShowArgs, StatsArgs};
use rix_cli::record::{run_record, RecordArgs};
use rix_cli::Workspace;

/// rix: a reference index for archived content.
///
/// Tracks which content exists, where it was found and where it was
/// stored, keyed by content fingerprint.
#[derive(Parser, Debug)]
#[command(name = "rix", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (default: ./rix.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the index file, overriding the configuration.
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty index file.
    Init(InitArgs),

    /// Register, list and remove sources.
    Source(SourceArgs),

    /// Register, list and remove destinations.
    Dest(DestArgs),

    /// Print the fingerprint of files.
    Hash(HashArgs),

    /// Fingerprint a file and record where it was found and stored.
    Record(RecordArgs),

    /// Print everything known about a fingerprint.
    Show(ShowArgs),

    /// Print every reference as JSON lines.
    Export(ExportArgs),

    /// Upgrade an index or metadata document to the current schema.
    Migrate(MigrateArgs),

    /// Print index counts.
    Stats(StatsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("rix CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = RixConfig::load(cli.config.as_deref()).and_then(|config| {
        let ws = Workspace::new(config, cli.index);
        tracing::debug!(index = %ws.index_path().display(), "resolved index path");
        dispatch(cli.command, &ws)
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn dispatch(command: Commands, ws: &Workspace) -> anyhow::Result<u8> {
    match command {
        Commands::Init(args) => run_init(&args, ws),
        Commands::Source(args) => run_source(&args, ws),
        Commands::Dest(args) => run_dest(&args, ws),
        Commands::Hash(args) => run_hash(&args, ws),
        Commands::Record(args) => run_record(&args, ws),
        Commands::Show(args) => run_show(&args, ws),
        Commands::Export(args) => run_export(&args, ws),
        Commands::Migrate(args) => run_migrate(&args),
        Commands::Stats(args) => run_stats(&args, ws),
    }
}
