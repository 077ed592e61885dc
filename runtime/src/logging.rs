//! Tracing setup: human-readable lines on stderr and in a per-run log file.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn,opticron_scraper=debug,opticron=debug";

/// Keeps the subscriber installed until dropped.
pub struct LogGuard {
    _guard: DefaultGuard,
}

/// Install the subscriber for the current thread.
///
/// The log file is truncated, so it only ever holds the latest run.
pub fn init(log_file: &Path) -> Result<LogGuard> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(DEFAULT_FILTER)?,
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        );

    Ok(LogGuard {
        _guard: tracing::subscriber::set_default(subscriber),
    })
}
