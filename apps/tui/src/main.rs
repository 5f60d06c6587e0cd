//! sectioner TUI — interactive section browser for a single HTML file.
//!
//! Opens a file, rewrites its marker regions, and lets you flip sections
//! between collapsed and expanded before writing the result back, built
//! with `ratatui` + `crossterm`.

mod app;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

use sectioner_shared::{WidgetOptions, load_config, load_config_from};

/// Browse and flip the expandable sections of an HTML file.
#[derive(Parser)]
#[command(name = "sectioner-tui", version, about = "Interactive section browser for HTML files.")]
struct Args {
    /// HTML file to open.
    file: PathBuf,

    /// Config file to use instead of ~/.sectioner/sectioner.toml.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let options = WidgetOptions::from(&config);

    app::run(args.file, options)
}
