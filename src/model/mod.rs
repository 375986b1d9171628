//! Record model for hbnb
//!
//! Records are flat bags of typed, defaulted fields plus identity and
//! timestamp bookkeeping. The set of kinds is closed: `Kind` is the only
//! registry, and every name-to-kind resolution goes through it.

mod errors;
mod kind;
mod record;
mod value;

pub use errors::{ModelError, ModelResult};
pub use kind::{FieldSpec, Kind};
pub use record::{
    format_timestamp, is_protected, now, parse_timestamp, Record, KIND_TAG, PROTECTED_FIELDS,
    TIMESTAMP_FORMAT,
};
pub use value::{FieldType, FieldValue};
