//! CLI-specific error types

use std::fmt;
use std::io;

use crate::store::StoreError;

/// CLI error
#[derive(Debug)]
pub enum CliError {
    /// Store operation failed
    Store(StoreError),
    /// Runtime could not start or stdout failed
    Io(io::Error),
}

impl CliError {
    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Store(e) => e.code(),
            CliError::Io(_) => "JSONKV_CLI_IO_ERROR",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Store(e) => write!(f, "{}: {}", e.code(), e),
            CliError::Io(e) => write!(f, "{}: {}", self.code_str(), e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Store(e.into())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
