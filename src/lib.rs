//! hbnb - a command console over a JSON-backed object store
//!
//! Records of seven kinds (BaseModel, User, State, City, Amenity, Place,
//! Review) live in one in-memory table that is mirrored to a JSON file after
//! every mutation.

pub mod config;
pub mod console;
pub mod model;
pub mod observability;
pub mod storage;
