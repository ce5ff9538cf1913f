//! Application layer: the cut set, chord handling, moving files, and the service lifecycle.

pub mod chord;
pub mod commands;
pub mod cut;
pub mod interceptor;
pub mod lifecycle;
pub mod mover;
pub mod worker;
