//! CLI module
//!
//! Command-line interface for running collectors.
//!
//! # Commands
//!
//! - `validate` - Check collector settings
//! - `discover` - List the work items discovery produces
//! - `collect` - Discover and collect every item

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
