//! leadenrich CLI: enrich person records and research forum threads.
//!
//! Routes each record through the enrichment pipeline and prints the
//! enriched record as JSON.

mod commands;
mod input;

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
