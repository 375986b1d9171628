//! Persisted document codec
//!
//! The data file is one JSON object:
//!
//! ```text
//! {
//!   "City.<id>": {
//!     "__class__": "City",
//!     "id": "<id>",
//!     "created_at": "2026-10-15T09:30:00.123456",
//!     "updated_at": "2026-10-15T09:31:12.000042",
//!     "name": "Austin",
//!     "state_id": "<state id>"
//!   },
//!   ...
//! }
//! ```

use serde_json::{Map, Value};

use super::errors::{StorageError, StorageResult};
use crate::model::{is_protected, parse_timestamp, FieldValue, Kind, Record, KIND_TAG};

/// Encodes one record: its full field set plus the kind tag.
pub fn encode_record(record: &Record) -> Map<String, Value> {
    let mut map = record.to_fields_map();
    map.insert(
        KIND_TAG.to_string(),
        Value::String(record.kind().as_str().to_string()),
    );
    map
}

/// Encodes a whole table into the document object.
pub fn encode_table<'a, I>(records: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'a String, &'a Record)>,
{
    records
        .into_iter()
        .map(|(key, record)| (key.clone(), Value::Object(encode_record(record))))
        .collect()
}

/// Decodes one stored entry back into a record.
///
/// The kind tag is resolved against the registry and then discarded. An
/// unknown tag is a schema drift error, never skipped.
pub fn decode_record(key: &str, entry: &Value) -> StorageResult<Record> {
    let map = entry
        .as_object()
        .ok_or_else(|| StorageError::corruption_for_key(key, "entry is not an object"))?;

    let tag = string_field(key, map, KIND_TAG)?;
    let kind = Kind::from_name(tag).ok_or_else(|| StorageError::schema_drift(key, tag))?;

    let id = string_field(key, map, "id")?;
    let created_at = parse_timestamp("created_at", string_field(key, map, "created_at")?)
        .map_err(|e| StorageError::from_model(key, e))?;
    let updated_at = parse_timestamp("updated_at", string_field(key, map, "updated_at")?)
        .map_err(|e| StorageError::from_model(key, e))?;

    let mut record = Record::restore(kind, id, created_at, updated_at);

    for (name, value) in map {
        if is_protected(name) {
            continue;
        }
        let value =
            FieldValue::from_json(name, value).map_err(|e| StorageError::from_model(key, e))?;
        record
            .set_field(name, value)
            .map_err(|e| StorageError::from_model(key, e))?;
    }

    Ok(record)
}

fn string_field<'a>(key: &str, map: &'a Map<String, Value>, name: &str) -> StorageResult<&'a str> {
    match map.get(name) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(StorageError::corruption_for_key(
            key,
            format!("field '{}' is not a string", name),
        )),
        None => Err(StorageError::corruption_for_key(
            key,
            format!("missing field '{}'", name),
        )),
    }
}
