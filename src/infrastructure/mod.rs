//! Infrastructure utilities for the local file system.
//!
//! - [`paths`]: tilde expansion and location resolution

pub mod paths;

pub use paths::{expand_tilde, resolve_location};
