use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Where log lines go. The TUI owns the terminal, so it logs to a file.
pub(crate) enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

/// Build the filter from a directive such as `info` or `expensesink=debug`,
/// falling back to `info` when the directive does not parse.
pub(crate) fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Call once at startup.
pub(crate) fn init(directive: &str, target: LogTarget<'_>) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(directive))
        .with_target(false);

    match target {
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?,
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?
        }
    }

    tracing::debug!(filter = directive, "logging initialized");
    Ok(())
}
