//! Storage error types
//!
//! Error codes:
//! - HBNB_STORAGE_READ_FAILED (ERROR severity)
//! - HBNB_STORAGE_WRITE_FAILED (ERROR severity)
//! - HBNB_DATA_CORRUPTION (FATAL severity)
//! - HBNB_SCHEMA_DRIFT (FATAL severity)

use std::fmt;
use std::io;

use crate::model::ModelError;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the console continues
    Error,
    /// The triggering operation cannot proceed; data would be lost
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Data file exists but could not be read
    HbnbStorageReadFailed,
    /// Data file could not be written; the durable copy is stale
    HbnbStorageWriteFailed,
    /// Data file is not a valid record document
    HbnbDataCorruption,
    /// A stored kind tag is not in the registry
    HbnbSchemaDrift,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::HbnbStorageReadFailed => "HBNB_STORAGE_READ_FAILED",
            StorageErrorCode::HbnbStorageWriteFailed => "HBNB_STORAGE_WRITE_FAILED",
            StorageErrorCode::HbnbDataCorruption => "HBNB_DATA_CORRUPTION",
            StorageErrorCode::HbnbSchemaDrift => "HBNB_SCHEMA_DRIFT",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::HbnbStorageReadFailed => Severity::Error,
            StorageErrorCode::HbnbStorageWriteFailed => Severity::Error,
            StorageErrorCode::HbnbDataCorruption => Severity::Fatal,
            StorageErrorCode::HbnbSchemaDrift => Severity::Fatal,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with code, message, and optional context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    /// Create a read failure
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::HbnbStorageReadFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a write failure
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::HbnbStorageWriteFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a write failure without IO source (serialization)
    pub fn write_failed_no_source(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::HbnbStorageWriteFailed,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a data corruption error for the whole document
    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::HbnbDataCorruption,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a data corruption error for one stored entry
    pub fn corruption_for_key(key: &str, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::HbnbDataCorruption,
            message: reason.into(),
            details: Some(format!("key: {}", key)),
            source: None,
        }
    }

    /// Create a schema drift error for an unregistered kind tag
    pub fn schema_drift(key: &str, kind_tag: &str) -> Self {
        Self {
            code: StorageErrorCode::HbnbSchemaDrift,
            message: format!("unknown kind tag '{}'", kind_tag),
            details: Some(format!("key: {}", key)),
            source: None,
        }
    }

    /// Wraps a model error raised while decoding an entry
    pub fn from_model(key: &str, err: ModelError) -> Self {
        Self::corruption_for_key(key, err.to_string())
    }

    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
