//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use sectioner_core::Document;
use sectioner_shared::{
    AppConfig, SectionId, WidgetOptions, init_config, load_config, load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// sectioner — rewrite marker regions into expandable sections.
#[derive(Parser)]
#[command(
    name = "sectioner",
    version,
    about = "Rewrite HTML marker regions into collapsible sections with toggle controls.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.sectioner/sectioner.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Rewrite one HTML file and write the result.
    Apply {
        /// Input HTML file (`-` reads stdin).
        input: PathBuf,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Rewrite the input file in place.
        #[arg(long)]
        in_place: bool,

        /// Expand every section after the rewrite.
        #[arg(long)]
        expand_all: bool,

        /// Render a collapse button inside each section.
        #[arg(long)]
        collapse_button: bool,
    },

    /// Rewrite every HTML file under a directory.
    Batch {
        /// Directory to scan for .html files.
        dir: PathBuf,

        /// Directory for rewritten files (mirrors the input layout).
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Rewrite the files in place.
        #[arg(long)]
        in_place: bool,

        /// Expand every section after the rewrite.
        #[arg(long)]
        expand_all: bool,

        /// Render a collapse button inside each section.
        #[arg(long)]
        collapse_button: bool,
    },

    /// List the sections a file yields after a rewrite pass.
    Sections {
        /// Input HTML file (`-` reads stdin).
        input: PathBuf,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Flip sections between collapsed and expanded, then write the result.
    Toggle {
        /// Input HTML file (`-` reads stdin).
        input: PathBuf,

        /// Section id (`expandable-3`) or bare index (`3`); repeat to
        /// simulate several clicks.
        #[arg(long = "id", value_name = "ID", required = true)]
        ids: Vec<String>,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Rewrite the input file in place.
        #[arg(long)]
        in_place: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    let config_path = config_path.as_deref();

    match cli.command {
        Command::Apply {
            input,
            out,
            in_place,
            expand_all,
            collapse_button,
        } => cmd_apply(
            &input,
            out.as_deref(),
            in_place,
            expand_all,
            collapse_button,
            config_path,
        ),
        Command::Batch {
            dir,
            out_dir,
            in_place,
            expand_all,
            collapse_button,
        } => cmd_batch(
            &dir,
            out_dir,
            in_place,
            expand_all,
            collapse_button,
            config_path,
        ),
        Command::Sections { input, json } => cmd_sections(&input, json, config_path),
        Command::Toggle {
            input,
            ids,
            out,
            in_place,
        } => cmd_toggle(&input, &ids, out.as_deref(), in_place, config_path),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_apply(
    input: &Path,
    out: Option<&Path>,
    in_place: bool,
    expand_all: bool,
    collapse_button: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let destination = resolve_destination(input, out, in_place)?;
    let options = resolve_options(config_path, collapse_button)?;

    let html = read_file(input)?;
    let mut doc = Document::setup(&html, options)?;
    if expand_all {
        doc.expand_all();
    }

    let section_count = doc.sections().len();
    let toggle_count = doc.sections().iter().filter(|s| s.has_toggle).count();
    info!(
        path = %input.display(),
        sections = section_count,
        toggles = toggle_count,
        "file rewritten"
    );

    match destination {
        Some(path) => {
            write_file(&path, doc.html())?;
            println!();
            println!("  Sections: {section_count}");
            println!("  Toggles:  {toggle_count}");
            println!("  Output:   {}", path.display());
            println!();
        }
        None => print!("{}", doc.html()),
    }

    Ok(())
}

fn cmd_batch(
    dir: &Path,
    out_dir: Option<PathBuf>,
    in_place: bool,
    expand_all: bool,
    collapse_button: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let out_dir = match (out_dir, in_place) {
        (Some(_), true) => {
            return Err(eyre!("--out-dir and --in-place are mutually exclusive"));
        }
        (None, false) => {
            return Err(eyre!("pass --out-dir or --in-place to choose where results go"));
        }
        (out_dir, _) => out_dir,
    };

    if !dir.is_dir() {
        return Err(eyre!("'{}' is not a directory", dir.display()));
    }

    let options = resolve_options(config_path, collapse_button)?;

    let mut files = Vec::new();
    collect_html_files(dir, &mut files)?;
    files.sort();

    if files.is_empty() {
        println!("no .html files under '{}'", dir.display());
        return Ok(());
    }

    info!(files = files.len(), "batch rewrite starting");
    let started = Instant::now();

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(ProgressStyle::with_template("{bar:30.cyan} {pos}/{len} {msg}").unwrap());

    let mut sections = 0usize;
    let mut toggles = 0usize;
    let mut errors = 0usize;

    for path in &files {
        bar.set_message(path.display().to_string());
        match rewrite_file(path, dir, out_dir.as_deref(), expand_all, &options) {
            Ok((s, t)) => {
                sections += s;
                toggles += t;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "file skipped");
                errors += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!();
    println!("  Files:    {}", files.len());
    println!("  Sections: {sections}");
    println!("  Toggles:  {toggles}");
    println!("  Errors:   {errors}");
    println!("  Time:     {:.1}s", started.elapsed().as_secs_f64());
    println!();

    Ok(())
}

fn cmd_sections(input: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    let options = resolve_options(config_path, false)?;
    let html = read_file(input)?;
    let doc = Document::setup(&html, options)?;
    let summaries = doc.summaries();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("no sections in '{}'", input.display());
        return Ok(());
    }

    println!();
    for summary in &summaries {
        println!(
            "  {:<16} {:<10} {:<7} {} bytes",
            summary.id.to_string(),
            summary.state.to_string(),
            if summary.has_toggle { "toggle" } else { "-" },
            summary.content_bytes,
        );
    }
    println!();

    Ok(())
}

fn cmd_toggle(
    input: &Path,
    ids: &[String],
    out: Option<&Path>,
    in_place: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let destination = resolve_destination(input, out, in_place)?;
    let options = resolve_options(config_path, false)?;

    let html = read_file(input)?;
    let mut doc = Document::setup(&html, options)?;

    let mut outcomes = Vec::with_capacity(ids.len());
    for raw in ids {
        let id = parse_section_id(raw)?;
        let state = doc.toggle(&id)?;
        info!(id = %id, state = %state, "section toggled");
        outcomes.push((id, state));
    }

    match destination {
        Some(path) => {
            write_file(&path, doc.html())?;
            println!();
            for (id, state) in &outcomes {
                println!("  {id} is now {state}");
            }
            println!("  Output: {}", path.display());
            println!();
        }
        None => print!("{}", doc.html()),
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = load_app_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Where rewritten text goes: a file, or stdout when `None`.
fn resolve_destination(
    input: &Path,
    out: Option<&Path>,
    in_place: bool,
) -> Result<Option<PathBuf>> {
    match (out, in_place) {
        (Some(_), true) => Err(eyre!("--out and --in-place are mutually exclusive")),
        (Some(path), false) => Ok(Some(path.to_path_buf())),
        (None, true) if input == Path::new("-") => {
            Err(eyre!("--in-place cannot be used with stdin input"))
        }
        (None, true) => Ok(Some(input.to_path_buf())),
        (None, false) => Ok(None),
    }
}

fn load_app_config(config_path: Option<&Path>) -> Result<AppConfig> {
    match config_path {
        Some(path) => Ok(load_config_from(path)?),
        None => Ok(load_config()?),
    }
}

fn resolve_options(config_path: Option<&Path>, collapse_button: bool) -> Result<WidgetOptions> {
    let config = load_app_config(config_path)?;
    let mut options = WidgetOptions::from(&config);
    if collapse_button {
        options.collapse_button = true;
    }
    options.validate()?;
    Ok(options)
}

/// Accept either a full section id or a bare index.
fn parse_section_id(raw: &str) -> Result<SectionId> {
    if let Ok(number) = raw.parse::<u32>() {
        return Ok(SectionId::numbered(number));
    }
    raw.parse::<SectionId>()
        .map_err(|e| eyre!("invalid section id '{raw}': {e}"))
}

fn read_file(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin().lock())
            .map_err(|e| eyre!("cannot read stdin: {e}"));
    }
    std::fs::read_to_string(path).map_err(|e| eyre!("cannot read '{}': {e}", path.display()))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| eyre!("cannot create '{}': {e}", parent.display()))?;
        }
    }
    std::fs::write(path, content).map_err(|e| eyre!("cannot write '{}': {e}", path.display()))
}

/// Collect `.html`/`.htm` files under `dir`, recursively.
fn collect_html_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| eyre!("cannot read directory '{}': {e}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_html_files(&path, files)?;
        } else if matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("html" | "htm")
        ) {
            files.push(path);
        }
    }

    Ok(())
}

fn rewrite_file(
    path: &Path,
    root: &Path,
    out_dir: Option<&Path>,
    expand_all: bool,
    options: &WidgetOptions,
) -> Result<(usize, usize)> {
    let html = read_file(path)?;
    let mut doc = Document::setup(&html, options.clone())?;
    if expand_all {
        doc.expand_all();
    }

    let sections = doc.sections().len();
    let toggles = doc.sections().iter().filter(|s| s.has_toggle).count();

    let target = match out_dir {
        Some(out) => {
            let relative = path.strip_prefix(root).unwrap_or(path);
            out.join(relative)
        }
        None => path.to_path_buf(),
    };
    write_file(&target, doc.html())?;

    Ok((sections, toggles))
}
