//! Parlor CLI
//!
//! Inspect and reset the configuration and session state of the parlor
//! chat client.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use parlor_core::{Config, RootDirs};

mod commands;
mod logging;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "parlor")]
#[command(about = "Parlor - configuration and session maintenance")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    roots: RootArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Root directory overrides (take precedence over PARLOR_* variables)
#[derive(Args)]
struct RootArgs {
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    download_dir: Option<PathBuf>,
}

impl RootArgs {
    fn resolve(self) -> RootDirs {
        let defaults = RootDirs::from_env();
        RootDirs {
            config: self.config_dir.unwrap_or(defaults.config),
            data: self.data_dir.unwrap_or(defaults.data),
            cache: self.cache_dir.unwrap_or(defaults.cache),
            download: self.download_dir.unwrap_or(defaults.download),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the directory layout
    Paths,
    /// Show the stored session and settings
    Show,
    /// Create directories and write default settings
    Init,
    /// Delete the login session and all cached state
    Logout,
    /// Clear cached room state and history
    Clear,
    /// Clear persistent session data
    ClearData,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_file.as_deref())?;

    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let roots = cli.roots.resolve();
    debug!(?roots, "Resolved root directories");

    let mut config = Config::new(&roots);

    match cli.command {
        Commands::Paths => commands::paths::show(&config, &output),
        Commands::Show => commands::show::show(&mut config, &output),
        Commands::Init => commands::session::init(&mut config, &output),
        Commands::Logout => commands::session::logout(&mut config, &output),
        Commands::Clear => commands::session::clear(&mut config, &output),
        Commands::ClearData => commands::session::clear_data(&config, &output),
    }
}
