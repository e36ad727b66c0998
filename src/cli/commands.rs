//! CLI command implementations
//!
//! Each command opens the store, runs one operation and prints the result
//! as JSON on stdout. Log lines go to stderr only.

use std::io::Write;
use std::path::Path;

use serde_json::Value;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use crate::observability::{Logger, Severity};
use crate::store::{JsonStore, StoreConfig};

/// Run the CLI with process arguments
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let root = std::env::current_dir()?;
    runtime.block_on(run_command(cli, &root, &mut std::io::stdout()))
}

/// Execute a parsed command against a store under `root`, writing its
/// output to `out`
pub async fn run_command<W: Write>(cli: Cli, root: &Path, out: &mut W) -> CliResult<()> {
    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    }

    let mut config = StoreConfig::new(root, cli.file.clone());
    if let Some(key) = cli.resolve_key() {
        config = config.with_encryption_key(key);
    }
    let store = JsonStore::open(config)?;

    let output = execute(&store, cli.command).await?;
    if let Some(value) = output {
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    }
    Ok(())
}

/// Run one command against an open store
pub async fn execute(store: &JsonStore, command: Command) -> CliResult<Option<Value>> {
    match command {
        Command::Get { key } => Ok(Some(store.get(&key).await?.into_result()?)),
        Command::Set { key, value } => {
            store.set(key, parse_value(&value)).await?;
            Ok(None)
        }
        Command::Delete { key } => {
            store.delete(&key).await?.into_result()?;
            Ok(None)
        }
        Command::List => Ok(Some(Value::from(store.list().await?))),
        Command::Size => Ok(Some(Value::from(store.size().await?))),
        Command::Empty => {
            store.empty().await?;
            Ok(None)
        }
        Command::Dump => Ok(Some(Value::Object(store.get_all().await?))),
    }
}

/// Parse a CLI value as JSON, falling back to a plain string
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
