//! franchise CLI: look up every part of a film franchise from one title.
//!
//! Serves the lookup over HTTP (`franchise serve`) or runs it once from the
//! command line (`franchise search`).

mod commands;
mod server;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
