// File: ./src/logging.rs
// File logger setup. The terminal belongs to the TUI, so logs go to the cache dir.
use crate::context::AppContext;
use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::OpenOptions;

/// Installs a global file logger at `ctx.get_log_path()`.
/// Calling it twice is harmless; the second call leaves the first logger in place.
pub fn init(ctx: &dyn AppContext, level: LevelFilter) -> Result<()> {
    let path = ctx
        .get_log_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine log file location"))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {:?}", path))?;

    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Off)
        // Only this crate's records; hyper and rustls are noisy at debug.
        .add_filter_allow_str("taskboard")
        .build();

    if WriteLogger::init(level, config, file).is_err() {
        log::debug!("Logger already initialized");
    }
    Ok(())
}
