//! CLI module for jsonkv
//!
//! One-shot commands against a store file in the current directory:
//! get, set, delete, list, size, empty, dump.

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, KEY_ENV};
pub use commands::{execute, parse_value, run, run_command};
pub use errors::{CliError, CliResult};
