// Library root for the `topteam` binary; exposed so tests can drive the
// pipeline without spawning a process.

pub mod app;
pub mod config;
pub mod output;
