//! Storage subsystem for hbnb
//!
//! The storage engine owns the canonical table of all live records and
//! mirrors it to a single JSON document.
//!
//! # Design Principles
//!
//! - In-memory table is the authority, the file is a mirror
//! - Whole-file rewrite on every persist, atomically replaced
//! - Kind tags resolve through the closed `Kind` registry
//! - Unknown kind tags halt the load (no silent drops)

mod document;
mod engine;
mod errors;

pub use document::{decode_record, encode_record, encode_table};
pub use engine::StorageEngine;
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
