//! Core domain types shared by every layer of the engine.
//!
//! Nothing here knows about descriptions, the interactor or the host; these are
//! the building blocks the state machine is assembled from.
//!
//! # Organization
//!
//! - [`error`]: error type and result alias
//! - [`event`]: raw pointer events and semantic event types
//! - [`damage`]: upward redraw notification
//! - [`diagnostic`]: the non-fatal diagnostic channel
//! - [`image`]: decoded image handles
//! - [`region`]: named, positioned boxes with an optional image
//!
//! # Examples
//!
//! ```
//! use hotspot::domain::{EventType, RawEvent, RawEventKind};
//!
//! let raw = RawEvent::new(RawEventKind::Press, 4.0, 2.0);
//! assert_eq!(raw.position(), (4.0, 2.0));
//! assert_eq!(EventType::ReleaseNone.as_str(), "release_none");
//! ```

pub mod damage;
pub mod diagnostic;
pub mod error;
pub mod event;
pub mod image;
pub mod region;

pub use damage::{DamageHandle, DamageRelay, DamageSink};
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{HotspotError, Result};
pub use event::{EventType, RawEvent, RawEventKind};
pub use self::image::ImageHandle;
pub use region::{Behavior, Region};
