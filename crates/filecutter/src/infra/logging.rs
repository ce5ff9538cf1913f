//! Diagnostics output.

use std::str::FromStr;

use tracing::Level;

/// Parse a level name, falling back to `info` for anything unrecognized.
pub fn parse_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::INFO)
}

/// Install the global `tracing` subscriber. Later calls are ignored.
pub fn init(level: &str) {
    let level = parse_level(level);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
