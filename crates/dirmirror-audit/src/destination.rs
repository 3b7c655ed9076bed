//! Log destination resolution
//!
//! The log path is resolved once at startup:
//!
//! | Requested            | Resolved                        |
//! |----------------------|---------------------------------|
//! | existing file        | that file                       |
//! | existing directory   | `<dir>/log.txt`                 |
//! | nothing              | `<cwd>/log.txt`                 |
//! | anything else        | `<cwd>/log.txt` + warning       |
//!
//! An invalid destination is never fatal.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name used when only a directory (or nothing) is given
pub const DEFAULT_LOG_FILE_NAME: &str = "log.txt";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogDestinationError {
    #[error("Invalid log destination {requested}; logging to {fallback} instead")]
    InvalidLogDestination { requested: PathBuf, fallback: PathBuf },
}

/// A resolved log file path plus the warning produced while resolving it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDestination {
    path: PathBuf,
    warning: Option<LogDestinationError>,
}

impl LogDestination {
    /// Resolves `requested` against the filesystem
    ///
    /// Relative paths are taken relative to `cwd`.
    pub fn resolve(requested: Option<&Path>, cwd: &Path) -> Self {
        let fallback = cwd.join(DEFAULT_LOG_FILE_NAME);

        let Some(requested) = requested else {
            return Self {
                path: fallback,
                warning: None,
            };
        };

        let candidate = cwd.join(requested);
        if candidate.is_file() {
            Self {
                path: candidate,
                warning: None,
            }
        } else if candidate.is_dir() {
            Self {
                path: candidate.join(DEFAULT_LOG_FILE_NAME),
                warning: None,
            }
        } else {
            Self {
                warning: Some(LogDestinationError::InvalidLogDestination {
                    requested: requested.to_path_buf(),
                    fallback: fallback.clone(),
                }),
                path: fallback,
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set when the requested destination was unusable
    pub fn warning(&self) -> Option<&LogDestinationError> {
        self.warning.as_ref()
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_file_is_used_as_is() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("custom.log");
        std::fs::write(&file, "").unwrap();

        let dest = LogDestination::resolve(Some(&file), Path::new("/unused"));
        assert_eq!(dest.path(), file);
        assert!(dest.warning().is_none());
    }

    #[test]
    fn test_directory_gets_default_file_name() {
        let dir = TempDir::new().unwrap();

        let dest = LogDestination::resolve(Some(dir.path()), Path::new("/unused"));
        assert_eq!(dest.path(), dir.path().join("log.txt"));
        assert!(dest.warning().is_none());
    }

    #[test]
    fn test_absent_falls_back_to_cwd_silently() {
        let cwd = TempDir::new().unwrap();

        let dest = LogDestination::resolve(None, cwd.path());
        assert_eq!(dest.path(), cwd.path().join("log.txt"));
        assert!(dest.warning().is_none());
    }

    #[test]
    fn test_nonexistent_path_falls_back_with_warning() {
        let cwd = TempDir::new().unwrap();
        let bogus = cwd.path().join("no/such/place");

        let dest = LogDestination::resolve(Some(&bogus), cwd.path());
        assert_eq!(dest.path(), cwd.path().join("log.txt"));
        assert_eq!(
            dest.warning(),
            Some(&LogDestinationError::InvalidLogDestination {
                requested: bogus,
                fallback: cwd.path().join("log.txt"),
            })
        );
    }

    #[test]
    fn test_relative_path_resolved_against_cwd() {
        let cwd = TempDir::new().unwrap();
        std::fs::create_dir(cwd.path().join("logs")).unwrap();

        let dest = LogDestination::resolve(Some(Path::new("logs")), cwd.path());
        assert_eq!(dest.into_path(), cwd.path().join("logs").join("log.txt"));
    }

    #[test]
    fn test_warning_display() {
        let err = LogDestinationError::InvalidLogDestination {
            requested: PathBuf::from("/bad"),
            fallback: PathBuf::from("/cwd/log.txt"),
        };
        assert_eq!(
            err.to_string(),
            "Invalid log destination /bad; logging to /cwd/log.txt instead"
        );
    }
}
