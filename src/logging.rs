//! Log output setup
//!
//! While the terminal UI owns the screen, logs are written to a file. One-shot
//! commands log to stderr. `RUST_LOG` overrides the configured level.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Log file target for the terminal UI
    ///
    /// Uses the configured file, else `genreshelf.log` in the XDG data directory.
    /// Returns `None` when neither is available.
    pub fn for_tui(config: &LoggingConfig) -> Option<Self> {
        config
            .file
            .clone()
            .or_else(default_log_path)
            .map(LogTarget::File)
    }
}

/// Returns the default log file path, if a home directory exists
pub fn default_log_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "genreshelf").map(|dirs| dirs.data_dir().join("genreshelf.log"))
}

/// Builds the filter from `RUST_LOG`, falling back to `level`
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("genreshelf={},warn", level)))
}

/// Installs the global subscriber
///
/// Does nothing if a subscriber is already installed.
pub fn init(config: &LoggingConfig, target: &LogTarget) -> io::Result<()> {
    let filter = env_filter(&config.level);

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .try_init();
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;

            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
    }

    Ok(())
}
