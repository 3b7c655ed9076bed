//! Configuration module for dirmirror.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.
//! Command-line flags are layered on top of this by the CLI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::action::LogDetail;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for dirmirror.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Synchronization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Directory tree to mirror from.
    pub source: Option<PathBuf>,
    /// Directory tree kept identical to `source`.
    pub target: Option<PathBuf>,
    /// Minutes to sleep between the end of one pass and the start of the next.
    pub interval_minutes: f64,
    /// Granularity of the action log.
    pub detail: LogDetail,
    /// Whether symbolic links in the source are followed.
    pub follow_symlinks: bool,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Diagnostic level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Action log file, or a directory to hold `log.txt`.
    pub destination: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/dirmirror/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("dirmirror")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: None,
            target: None,
            interval_minutes: 1.0,
            detail: LogDetail::default(),
            follow_symlinks: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            destination: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.interval_minutes"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. Missing source or
    /// target is not an error here because the CLI may still supply them.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        let interval = self.sync.interval_minutes;
        if !interval.is_finite() || interval <= 0.0 {
            errors.push(ValidationError {
                field: "sync.interval_minutes".into(),
                message: format!("must be a positive number of minutes, got {interval}"),
            });
        }

        if let (Some(source), Some(target)) = (&self.sync.source, &self.sync.target) {
            if source == target {
                errors.push(ValidationError {
                    field: "sync.target".into(),
                    message: "must differ from sync.source".into(),
                });
            } else if target.starts_with(source) {
                errors.push(ValidationError {
                    field: "sync.target".into(),
                    message: format!(
                        "must not be inside the source tree ({})",
                        source.display()
                    ),
                });
            }
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use dirmirror_core::config::ConfigBuilder;
/// use dirmirror_core::domain::LogDetail;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .source(PathBuf::from("/data/source"))
///     .target(PathBuf::from("/backup/mirror"))
///     .interval_minutes(5.0)
///     .detail(LogDetail::Coarse)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Start from an existing configuration, e.g. one loaded from disk.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // --- sync ---

    pub fn source(mut self, source: PathBuf) -> Self {
        self.config.sync.source = Some(source);
        self
    }

    pub fn target(mut self, target: PathBuf) -> Self {
        self.config.sync.target = Some(target);
        self
    }

    pub fn interval_minutes(mut self, minutes: f64) -> Self {
        self.config.sync.interval_minutes = minutes;
        self
    }

    pub fn detail(mut self, detail: LogDetail) -> Self {
        self.config.sync.detail = detail;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.sync.follow_symlinks = follow;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_destination(mut self, destination: PathBuf) -> Self {
        self.config.logging.destination = Some(destination);
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
