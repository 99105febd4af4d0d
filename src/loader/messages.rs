//! Request and completion types for the two-phase image load protocol.
//!
//! A region that misses the cache queues a [`LoadRequest`] and remembers its
//! [`LoadTicket`]. Whoever services the queue answers with a [`LoadCompletion`]
//! carrying the same ticket, which is how a completion finds its way back to the
//! region that asked for it (and how stale completions are recognized).

use crate::domain::ImageHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier pairing a load request with its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadTicket(pub u64);

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A queued request to fetch and decode one image location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    /// Ticket the completion must echo back.
    pub ticket: LoadTicket,
    /// Location to fetch, exactly as the region holds it.
    pub location: String,
}

/// Final result of servicing a [`LoadRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The image was fetched and decoded.
    Loaded(ImageHandle),
    /// Fetching or decoding failed; the message says why.
    Failed(String),
}

impl LoadOutcome {
    /// The image on success, `None` on failure.
    #[must_use]
    pub fn image(&self) -> Option<ImageHandle> {
        match self {
            Self::Loaded(image) => Some(image.clone()),
            Self::Failed(_) => None,
        }
    }

    /// Returns `true` for [`LoadOutcome::Failed`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Answer to a [`LoadRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadCompletion {
    /// Ticket from the originating request.
    pub ticket: LoadTicket,
    /// Location from the originating request.
    pub location: String,
    /// What happened.
    pub outcome: LoadOutcome,
    /// Answered from an outcome already in the cache, without fetching.
    pub cached: bool,
}

impl LoadCompletion {
    /// Builds a successful completion for `request`.
    #[must_use]
    pub fn loaded(request: &LoadRequest, image: ImageHandle) -> Self {
        Self {
            ticket: request.ticket,
            location: request.location.clone(),
            outcome: LoadOutcome::Loaded(image),
            cached: false,
        }
    }

    /// Builds a failed completion for `request`.
    #[must_use]
    pub fn failed(request: &LoadRequest, message: impl Into<String>) -> Self {
        Self {
            ticket: request.ticket,
            location: request.location.clone(),
            outcome: LoadOutcome::Failed(message.into()),
            cached: false,
        }
    }

    /// Marks the completion as answered from the cache.
    #[must_use]
    pub fn from_cache(mut self) -> Self {
        self.cached = true;
        self
    }
}
