//! Daily brief CLI — multi-agent intelligence brief generator.
//!
//! Runs the agent roster, assembles the composite brief, patches it into
//! the host README between the sentinel markers, and archives a dated copy.

mod commands;

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
