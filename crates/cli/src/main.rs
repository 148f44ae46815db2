mod cmd;
mod logging;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "vaultsync",
    version,
    about = "Publish notes from a markdown vault into a site content tree"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    profile: Option<String>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print resolved paths
    Doctor,

    /// Publish every eligible note and referenced image once, then exit
    Sync,

    /// Publish everything, then keep the output current as the vault changes
    Watch,

    /// Report ambiguous note names and unresolved wikilinks without writing
    Check,
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let profile = cli.profile.as_deref();
    let level = logging::cli_level(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Doctor => cmd::doctor::run(config, profile),
        Commands::Sync => cmd::sync::run(config, profile, level),
        Commands::Watch => cmd::watch::run(config, profile, level),
        Commands::Check => cmd::check::run(config, profile, level),
    }
}
