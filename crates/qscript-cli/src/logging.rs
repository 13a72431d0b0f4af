//! Tracing subscriber setup.
//!
//! Logs go to stderr so that `--format json` output on stdout stays
//! parseable. `RUST_LOG`, when set, replaces the computed filter.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Filter directive for `-v` count, falling back to the configured level.
pub fn level_for(verbose: u8, configured: &str) -> &str {
    match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init(verbose: u8, settings: &LoggingSettings) -> anyhow::Result<()> {
    let level = level_for(verbose, &settings.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if settings.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to install logger: {e}"))
}
