//! Record base contract
//!
//! A record is an id, two timestamps, the declared fields of its kind, and
//! an explicit side mapping for undeclared fields.
//!
//! # Invariants
//!
//! - `id` never changes after construction
//! - `created_at <= updated_at`
//! - declared fields always hold a value of their declared type

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{ModelError, ModelResult};
use super::kind::Kind;
use super::value::FieldValue;

/// Fields that only the record itself may set
pub const PROTECTED_FIELDS: &[&str] = &["id", "created_at", "updated_at", KIND_TAG];

/// Name of the kind tag injected into persisted documents
pub const KIND_TAG: &str = "__class__";

/// Textual timestamp format (microsecond precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Returns true if `name` may not be assigned through `set_field`
pub fn is_protected(name: &str) -> bool {
    PROTECTED_FIELDS.contains(&name)
}

/// Current UTC time truncated to the persisted precision
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

/// Renders a timestamp in its persisted form
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a persisted timestamp. The fractional part is optional.
pub fn parse_timestamp(field: &str, text: &str) -> ModelResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_PARSE_FORMAT).map_err(|_| {
        ModelError::InvalidTimestamp {
            field: field.to_string(),
            value: text.to_string(),
        }
    })
}

/// One live record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: Kind,
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    fields: BTreeMap<String, FieldValue>,
    extra: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates a fresh record with a new id and both timestamps set to now
    pub fn new(kind: Kind) -> Self {
        let created_at = now();
        Self::restore(kind, Uuid::new_v4().to_string(), created_at, created_at)
    }

    /// Rebuilds a record from stored identity and timestamps.
    ///
    /// Declared fields start at their defaults; callers assign the stored
    /// values afterwards. `updated_at` is raised to `created_at` if the
    /// stored pair is out of order.
    pub fn restore(
        kind: Kind,
        id: impl Into<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    ) -> Self {
        let fields = kind
            .fields()
            .iter()
            .map(|spec| (spec.name.to_string(), spec.field_type.default_value()))
            .collect();

        Self {
            kind,
            id: id.into(),
            created_at,
            updated_at: updated_at.max(created_at),
            fields,
            extra: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Table key: `Kind.id`
    pub fn key(&self) -> String {
        self.kind.key_for(&self.id)
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Returns a field value, declared or extra
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).or_else(|| self.extra.get(name))
    }

    /// Undeclared fields held in the side mapping
    pub fn extra(&self) -> &BTreeMap<String, FieldValue> {
        &self.extra
    }

    /// Checks whether `value` may be assigned to `name` without applying it.
    ///
    /// Returns the value as it would be stored.
    pub fn check_field(&self, name: &str, value: FieldValue) -> ModelResult<FieldValue> {
        if is_protected(name) {
            return Err(ModelError::ProtectedField(name.to_string()));
        }
        match self.kind.field_type(name) {
            Some(field_type) => value.conform(name, field_type),
            None => Ok(value),
        }
    }

    /// Assigns a field by name.
    ///
    /// Declared fields are type-checked; undeclared names go to the side
    /// mapping. Does not touch `updated_at`.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> ModelResult<()> {
        let value = self.check_field(name, value)?;
        if self.kind.field_type(name).is_some() {
            self.fields.insert(name.to_string(), value);
        } else {
            self.extra.insert(name.to_string(), value);
        }
        Ok(())
    }

    /// Bumps `updated_at` to now, never moving it backwards
    pub fn touch(&mut self) {
        self.updated_at = now().max(self.updated_at);
    }

    /// Full field set: declared, extra, id, and both timestamps as text.
    ///
    /// The kind tag is not included.
    pub fn to_fields_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (name, value) in self.fields.iter().chain(self.extra.iter()) {
            map.insert(name.clone(), value.to_json());
        }
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert(
            "created_at".into(),
            Value::String(format_timestamp(&self.created_at)),
        );
        map.insert(
            "updated_at".into(),
            Value::String(format_timestamp(&self.updated_at)),
        );
        map
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] ({}) {}",
            self.kind,
            self.id,
            Value::Object(self.to_fields_map())
        )
    }
}
