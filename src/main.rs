mod api;
mod cli;
mod cli_cmds;
mod config;
mod notification;
mod now_playing;
mod reconcile;
mod server;
mod state;
mod upstream;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
