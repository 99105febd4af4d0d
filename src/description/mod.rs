//! Declarative state machine descriptions.
//!
//! - [`model`]: the serde data model and its validation
//! - [`json`]: parsing from strings, bytes and files

pub mod json;
pub mod model;

pub use json::{from_bytes, from_file, from_json_str, to_json_string};
pub use model::{ActionSpec, Description, RegionSpec, StateSpec, TransitionSpec, WILDCARD};
