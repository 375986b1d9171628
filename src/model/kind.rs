//! Closed registry of record kinds
//!
//! Each kind is a fixed tag plus a static field schema. Name lookup is a
//! plain match over the registry; there is no other way to obtain a `Kind`
//! from text.

use std::fmt;

use super::value::FieldType;

/// Field definition in a kind's schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name
    pub name: &'static str,
    /// Declared type
    pub field_type: FieldType,
}

const fn field(name: &'static str, field_type: FieldType) -> FieldSpec {
    FieldSpec { name, field_type }
}

const BASE_MODEL_FIELDS: &[FieldSpec] = &[];

const USER_FIELDS: &[FieldSpec] = &[
    field("email", FieldType::Str),
    field("password", FieldType::Str),
    field("first_name", FieldType::Str),
    field("last_name", FieldType::Str),
];

const STATE_FIELDS: &[FieldSpec] = &[field("name", FieldType::Str)];

const CITY_FIELDS: &[FieldSpec] = &[
    field("state_id", FieldType::Str),
    field("name", FieldType::Str),
];

const AMENITY_FIELDS: &[FieldSpec] = &[field("name", FieldType::Str)];

const PLACE_FIELDS: &[FieldSpec] = &[
    field("city_id", FieldType::Str),
    field("user_id", FieldType::Str),
    field("name", FieldType::Str),
    field("description", FieldType::Str),
    field("number_rooms", FieldType::Int),
    field("number_bathrooms", FieldType::Int),
    field("max_guest", FieldType::Int),
    field("price_by_night", FieldType::Int),
    field("latitude", FieldType::Float),
    field("longitude", FieldType::Float),
    field("amenity_ids", FieldType::List),
];

const REVIEW_FIELDS: &[FieldSpec] = &[
    field("place_id", FieldType::Str),
    field("user_id", FieldType::Str),
    field("text", FieldType::Str),
];

/// A record kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

impl Kind {
    /// Every registered kind, in registry order
    pub const ALL: [Kind; 7] = [
        Kind::BaseModel,
        Kind::User,
        Kind::State,
        Kind::City,
        Kind::Amenity,
        Kind::Place,
        Kind::Review,
    ];

    /// Returns the kind's name as used in keys, commands, and the kind tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::BaseModel => "BaseModel",
            Kind::User => "User",
            Kind::State => "State",
            Kind::City => "City",
            Kind::Amenity => "Amenity",
            Kind::Place => "Place",
            Kind::Review => "Review",
        }
    }

    /// Resolves a kind name. Case-sensitive; unknown names return `None`.
    pub fn from_name(name: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Returns the declared fields of this kind
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Kind::BaseModel => BASE_MODEL_FIELDS,
            Kind::User => USER_FIELDS,
            Kind::State => STATE_FIELDS,
            Kind::City => CITY_FIELDS,
            Kind::Amenity => AMENITY_FIELDS,
            Kind::Place => PLACE_FIELDS,
            Kind::Review => REVIEW_FIELDS,
        }
    }

    /// Returns the declared type of a field, if this kind declares it
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.fields()
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.field_type)
    }

    /// Builds the table key for a record of this kind
    pub fn key_for(&self, id: &str) -> String {
        format!("{}.{}", self.as_str(), id)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_every_kind_by_name() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_name(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_and_miscased_names() {
        assert_eq!(Kind::from_name("MyModel"), None);
        assert_eq!(Kind::from_name("city"), None);
        assert_eq!(Kind::from_name(""), None);
    }

    #[test]
    fn test_place_schema_types() {
        assert_eq!(Kind::Place.field_type("number_rooms"), Some(FieldType::Int));
        assert_eq!(Kind::Place.field_type("latitude"), Some(FieldType::Float));
        assert_eq!(Kind::Place.field_type("amenity_ids"), Some(FieldType::List));
        assert_eq!(Kind::Place.field_type("name"), Some(FieldType::Str));
        assert_eq!(Kind::Place.field_type("email"), None);
    }

    #[test]
    fn test_base_model_declares_nothing() {
        assert!(Kind::BaseModel.fields().is_empty());
    }

    #[test]
    fn test_key_format() {
        assert_eq!(Kind::City.key_for("abc"), "City.abc");
    }
}
