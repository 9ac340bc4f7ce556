use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nowplaying")]
#[command(version)]
#[command(about = "Now-playing status for LaMetric, reconciled from Plex and Home Assistant")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Serve the LaMetric polling endpoint (default)
    Serve {
        /// Listening port, overrides config and PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the current status line once and exit
    Status,
    /// Check connectivity to Plex and Home Assistant
    Check,
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the config file location
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
