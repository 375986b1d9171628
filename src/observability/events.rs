//! Observable events for hbnb
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Console startup begins
    BootStart,
    /// Configuration loaded
    ConfigLoaded,
    /// Console loop ended
    ShutdownComplete,

    // Storage
    /// Data file loaded into the table
    StorageLoaded,
    /// Table written to the data file
    StoragePersisted,
    /// Table could not be written; the data file is stale
    StoragePersistFailed,
    /// Data file names a kind the registry doesn't know (FATAL)
    SchemaDrift,

    // Commands
    /// Record created
    RecordCreated,
    /// Record fields reassigned
    RecordUpdated,
    /// Record removed
    RecordDestroyed,
    /// Command line rejected with a user-facing message
    CommandRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::StorageLoaded => "STORAGE_LOADED",
            Event::StoragePersisted => "STORAGE_PERSISTED",
            Event::StoragePersistFailed => "STORAGE_PERSIST_FAILED",
            Event::SchemaDrift => "SCHEMA_DRIFT",

            Event::RecordCreated => "RECORD_CREATED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordDestroyed => "RECORD_DESTROYED",
            Event::CommandRejected => "COMMAND_REJECTED",
        }
    }

    /// Returns the severity this event is logged at
    pub fn severity(&self) -> super::Severity {
        use super::Severity;
        match self {
            Event::SchemaDrift => Severity::Fatal,
            Event::StoragePersistFailed => Severity::Error,
            Event::CommandRejected => Severity::Trace,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::SchemaDrift)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
