//! Effective runtime settings
//!
//! Command-line flags override the YAML config; the merged config is then
//! validated and turned into the values the driver needs.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use dirmirror_core::config::{Config, ConfigBuilder};
use dirmirror_sync::engine::ReconcilerOptions;
use dirmirror_sync::scheduler::interval_from_minutes;

use crate::Cli;

/// Applies command-line overrides on top of `config`
pub fn merge(config: Config, cli: &Cli) -> Config {
    let mut builder = ConfigBuilder::from_config(config);

    if let Some(source) = &cli.source {
        builder = builder.source(source.clone());
    }
    if let Some(target) = &cli.destination {
        builder = builder.target(target.clone());
    }
    if let Some(log) = &cli.log {
        builder = builder.logging_destination(log.clone());
    }
    if let Some(minutes) = cli.interval {
        builder = builder.interval_minutes(minutes);
    }
    if let Some(detail) = cli.detail {
        builder = builder.detail(detail);
    }
    if cli.no_follow_symlinks {
        builder = builder.follow_symlinks(false);
    }

    builder.build()
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub source: PathBuf,
    pub target: PathBuf,
    pub interval: Duration,
    pub options: ReconcilerOptions,
    /// Requested log destination, resolved later against the working directory
    pub log_destination: Option<PathBuf>,
    pub log_level: String,
}

impl Settings {
    /// Validates a merged config
    ///
    /// # Errors
    /// Fails when source or destination is missing, or when validation
    /// reports any error.
    pub fn resolve(config: Config) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            let list: Vec<String> = errors.iter().map(ToString::to_string).collect();
            bail!("Invalid configuration:\n  {}", list.join("\n  "));
        }

        let options = ReconcilerOptions::from(&config.sync);
        let interval = interval_from_minutes(config.sync.interval_minutes)?;

        let source = config
            .sync
            .source
            .ok_or_else(|| anyhow!("A source directory is required (-s/--source)"))?;
        let target = config
            .sync
            .target
            .ok_or_else(|| anyhow!("A destination directory is required (-d/--destination)"))?;

        Ok(Self {
            source,
            target,
            interval,
            options,
            log_destination: config.logging.destination,
            log_level: config.logging.level,
        })
    }
}
