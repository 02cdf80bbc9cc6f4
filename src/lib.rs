//! Pinion Configuration Library
//!
//! Typed configuration fields resolved from environment variables, command
//! line flags, layered INI files and defaults, plus the bootstrap that wires
//! the result into logging and the active profile.

pub mod app;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod format;
pub mod logging;
pub mod profile;
