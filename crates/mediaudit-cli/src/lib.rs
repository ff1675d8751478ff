//! Mediaudit CLI library.
//!
//! Command-line front end for the campaign extraction pipeline:
//! configuration, local record persistence and the command
//! implementations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
