//! Logging configuration for the battle admin backend.
//!
//! Logs go to stderr by default. A log file can be requested on the command
//! line for hosts where stderr is not collected.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Where log output is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Picks the target from an optional `--log-file` argument.
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Stderr, Self::File)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` overrides the default `info` level. If the log file cannot be
/// opened, logging falls back to stderr.
pub fn init_logging(target: &LogTarget) {
    if let LogTarget::File(path) = target {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Warning: Could not create log directory: {e}");
                return init_stderr_logging();
            }
        }

        // Append so restarts keep earlier request history
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(log_file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter())
                    .with_writer(log_file)
                    .with_ansi(false)
                    .init();
                return;
            }
            Err(e) => eprintln!("Warning: Could not open log file: {e}"),
        }
    }

    init_stderr_logging();
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}
