//! Tracks how long each application stays in the foreground, day by day.
//! A small daemon samples the focused window once a second and keeps a running log on disk,
//! while the cli renders monthly and daily summaries out of that log.

pub mod cli;
pub mod daemon;
pub mod fs;
pub mod query;
pub mod utils;
pub mod window_api;
