pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;

/// Install the diagnostics subscriber at the given level.
pub fn init(level: &str) {
    infra::logging::init(level);
}
