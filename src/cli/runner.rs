use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use super::{Cli, Commands, ConfigAction};
use crate::cli_cmds::*;
use crate::config::Config;
use crate::server;

pub(crate) async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config_path = cli.config.unwrap_or_else(Config::config_path);

    match cli.command {
        Some(Commands::Config { action }) => match action {
            ConfigAction::Path => cmd_config_path(&config_path),
            ConfigAction::Init { force } => cmd_config_init(&config_path, force)?,
        },
        Some(Commands::Status) => {
            let config = Config::load(Some(&config_path))?;
            cmd_status(&config).await?;
        }
        Some(Commands::Check) => {
            let config = Config::load(Some(&config_path))?;
            cmd_check(&config).await?;
        }
        Some(Commands::Serve { port }) => {
            let mut config = Config::load(Some(&config_path))?;
            if let Some(port) = port {
                config.server.port = port;
            }
            server::run(config).await?;
        }
        None => {
            let config = Config::load(Some(&config_path))?;
            server::run(config).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
