use anyhow::{Context, Result};
use clap::Parser;

use pdfmerge::cli::Cli;
use pdfmerge::config::Config;
use pdfmerge::{logging, server};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    let config = Config::try_from(&cli).context("Invalid configuration")?;
    let addr = config.bind_addr();

    server::serve(config)
        .await
        .with_context(|| format!("Server on {addr} failed"))
}
