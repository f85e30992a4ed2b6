//! File-backed tracing setup.
//!
//! The alternate screen owns stdout, so all diagnostics go to a log file.
//! Verbosity follows `OSTOP_LOG` (an `EnvFilter` directive), defaulting to
//! `info`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_ENV: &str = "OSTOP_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Build the filter from `OSTOP_LOG`, falling back to `info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber, appending to `path`.
pub fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    Registry::default()
        .with(env_filter())
        .with(layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(log_file = %path.display(), "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritable_log_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending
        assert!(init_logging(dir.path()).is_err());
    }
}
