//! CLI argument definitions using clap
//!
//! Commands:
//! - jsonkv get <key>
//! - jsonkv set <key> <value>
//! - jsonkv delete <key>
//! - jsonkv list | size | empty | dump

use clap::{Parser, Subcommand};

/// Environment variable consulted when `--key` is not given
pub const KEY_ENV: &str = "JSONKV_KEY";

/// jsonkv - a single-file JSON key-value store
#[derive(Parser, Debug)]
#[command(name = "jsonkv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Store file, relative to the current directory
    #[arg(long, short, default_value = "jsonkv.json")]
    pub file: String,

    /// 64-character hex key for encryption at rest (defaults to $JSONKV_KEY)
    #[arg(long)]
    pub key: Option<String>,

    /// Log store events to stderr
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the value stored at a key
    Get { key: String },

    /// Store a value; parsed as JSON, otherwise stored as a string
    Set { key: String, value: String },

    /// Remove a key
    Delete { key: String },

    /// Print all keys
    List,

    /// Print the number of keys
    Size,

    /// Remove every key
    Empty,

    /// Print the whole document
    Dump,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// The encryption key from `--key` or the environment
    pub fn resolve_key(&self) -> Option<String> {
        self.key
            .clone()
            .or_else(|| std::env::var(KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}
