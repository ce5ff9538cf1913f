//! Infrastructure adapters for config, logging, Finder, and the keyboard hook.

pub mod config;
pub mod finder;
pub mod hook;
pub mod logging;
