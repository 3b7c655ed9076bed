//! dirmirror CLI - keeps a target directory identical to a source directory
//!
//! Runs one reconciliation pass immediately, then one every `-t` minutes
//! until interrupted. With `--once` it runs a single pass and prints a
//! summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dirmirror_core::{config::Config, domain::action::LogDetail};
use tracing_subscriber::EnvFilter;

mod driver;
mod output;
mod settings;

use output::OutputFormat;
use settings::Settings;

#[derive(Debug, Parser)]
#[command(
    name = "dirmirror",
    version,
    about = "One-way directory mirroring on a fixed interval"
)]
pub struct Cli {
    /// Directory to mirror from
    #[arg(short, long, value_name = "SOURCE")]
    source: Option<PathBuf>,

    /// Directory to mirror into (created if missing)
    #[arg(short = 'd', long = "destination", value_name = "DESTINATION")]
    destination: Option<PathBuf>,

    /// Log file, or directory to hold log.txt
    #[arg(short, long, value_name = "LOG")]
    log: Option<PathBuf>,

    /// Minutes between passes
    #[arg(short = 't', long = "interval", value_name = "MINUTES")]
    interval: Option<f64>,

    /// Action log granularity: coarse or fine
    #[arg(long)]
    detail: Option<LogDetail>,

    /// Skip symbolic links in the source tree instead of following them
    #[arg(long)]
    no_follow_symlinks: bool,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Use alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Loads the config file named by `--config`, or the default one if present
    fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => Ok(Config::load_or_default(&Config::default_path())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.load_config()?;
    let settings = Settings::resolve(settings::merge(config, &cli))?;

    // Setup tracing
    let filter = match cli.verbose {
        0 => settings.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    driver::run(settings, cli.once, format).await
}
