use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::default_log_path;

/// Filter variable, read like `RUST_LOG`.
pub const LOG_ENV: &str = "SABLE_LOG";

/// Send logs to a file so they never draw over the terminal UI.
///
/// Returns the log path, or `None` when logging could not be set up; the
/// player runs fine without it.
pub fn init_logging() -> Option<PathBuf> {
    let path = default_log_path()?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).ok()?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .ok()?;
    Some(path)
}
