//! sectioner CLI — expandable-section rewriter for static HTML.
//!
//! Rewrites marker regions into collapsible sections with toggle controls,
//! entirely offline: read a file, rewrite the markup, write it back out.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
