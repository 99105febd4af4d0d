//! Error types for the hotspot engine.
//!
//! This module defines the centralized error type [`HotspotError`] and a type alias
//! [`Result`] used throughout the crate. Only a few variants are fatal to a dispatch
//! (see [`HotspotError::is_fatal`]); the rest are surfaced through the
//! [`Diagnostics`](crate::domain::Diagnostics) channel and never unwind past the
//! call that produced them.

use thiserror::Error;

/// The main error type for hotspot operations.
///
/// # Examples
///
/// ```
/// use hotspot::HotspotError;
///
/// let err = HotspotError::UnknownAction("explode".to_string());
/// assert!(err.is_fatal());
/// assert_eq!(err.to_string(), "Unknown action type: explode");
/// ```
#[derive(Debug, Error)]
pub enum HotspotError {
    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The declarative FSM description could not be parsed.
    #[error("Description error: {0}")]
    Description(String),

    /// A transition names a target state that is not declared.
    #[error("Transition from state '{from}' targets unknown state '{target}'")]
    UnknownState {
        /// State owning the transition.
        from: String,
        /// Undeclared target state.
        target: String,
    },

    /// An action references a region that does not exist in its FSM.
    #[error("Action '{action}' references unknown region '{region}'")]
    UnboundRegion {
        /// Action type name.
        action: String,
        /// Region name that failed to resolve.
        region: String,
    },

    /// An action type outside the closed vocabulary was executed.
    ///
    /// Fatal: it means the transition table is corrupt.
    #[error("Unknown action type: {0}")]
    UnknownAction(String),

    /// An action parameter could not be parsed.
    ///
    /// Fatal for the same reason as [`HotspotError::UnknownAction`].
    #[error("Malformed parameter '{param}' for action '{action}'")]
    ActionParam {
        /// Action type name.
        action: String,
        /// The offending parameter.
        param: String,
    },

    /// An image or description could not be fetched.
    #[error("Fetch error for '{location}': {message}")]
    Fetch {
        /// Location that was requested.
        location: String,
        /// Failure reported by the fetch capability.
        message: String,
    },

    /// Fetched bytes could not be decoded as an image.
    #[error("Decode error for '{location}': {message}")]
    Decode {
        /// Location the payload came from.
        location: String,
        /// Decoder failure message.
        message: String,
    },

    /// Configuration is invalid or unreadable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HotspotError {
    /// Returns `true` for errors that abort a dispatch in progress.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownAction(_) | Self::ActionParam { .. })
    }
}

/// A specialized `Result` type for hotspot operations.
pub type Result<T> = std::result::Result<T, HotspotError>;
