//! Console error types
//!
//! Two layers:
//! - `CommandError`: one rejected command line. Its `Display` is exactly
//!   the line printed to the user; the loop continues.
//! - `CliError`: the process cannot start or keep running (config, boot,
//!   terminal I/O). `main` prints it to stderr and exits non-zero.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::storage::StorageError;

/// User-facing command failures
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("** class name missing **")]
    ClassNameMissing,

    #[error("** class doesn't exist **")]
    ClassDoesntExist,

    #[error("** instance id missing **")]
    InstanceIdMissing,

    #[error("** no instance found **")]
    NoInstanceFound,

    #[error("** attribute name missing **")]
    AttributeNameMissing,

    #[error("** value missing **")]
    ValueMissing,

    #[error("** invalid dictionary syntax **")]
    InvalidDictionarySyntax,

    #[error("** invalid value for {0} **")]
    InvalidValue(String),

    #[error("** invalid syntax **")]
    InvalidSyntax,

    #[error("*** Unknown syntax: {0}")]
    UnknownSyntax(String),

    #[error("*** No help on {0}")]
    NoHelp(String),

    /// The table changed but the data file could not be rewritten
    #[error("** persistence failed: {0} **")]
    Persistence(#[from] StorageError),
}

impl CommandError {
    /// Returns whether the in-memory table and the data file now disagree
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, CommandError::Persistence(_))
    }
}

/// Result type for a single command
pub type CommandResult<T> = Result<T, CommandError>;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Storage could not be loaded at startup
    BootFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "HBNB_CLI_CONFIG_ERROR",
            Self::IoError => "HBNB_CLI_IO_ERROR",
            Self::BootFailed => "HBNB_CLI_BOOT_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::boot_failed(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_messages_are_exact() {
        assert_eq!(CommandError::ClassNameMissing.to_string(), "** class name missing **");
        assert_eq!(CommandError::ClassDoesntExist.to_string(), "** class doesn't exist **");
        assert_eq!(CommandError::InstanceIdMissing.to_string(), "** instance id missing **");
        assert_eq!(CommandError::NoInstanceFound.to_string(), "** no instance found **");
        assert_eq!(
            CommandError::AttributeNameMissing.to_string(),
            "** attribute name missing **"
        );
        assert_eq!(CommandError::ValueMissing.to_string(), "** value missing **");
        assert_eq!(
            CommandError::InvalidDictionarySyntax.to_string(),
            "** invalid dictionary syntax **"
        );
        assert_eq!(
            CommandError::UnknownSyntax("frobnicate".into()).to_string(),
            "*** Unknown syntax: frobnicate"
        );
    }

    #[test]
    fn test_persistence_failure_flag() {
        let err = CommandError::from(StorageError::write_failed_no_source("disk full"));
        assert!(err.is_persistence_failure());
        assert!(err.to_string().contains("HBNB_STORAGE_WRITE_FAILED"));
        assert!(!CommandError::InvalidSyntax.is_persistence_failure());
    }

    #[test]
    fn test_cli_error_display() {
        let err = CliError::config_error("bad level");
        assert_eq!(err.to_string(), "HBNB_CLI_CONFIG_ERROR: bad level");
    }
}
