//! CLI layer for rummage.
//!
//! Provides the command-line interface using clap, with one subcommand
//! per engine operation.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
