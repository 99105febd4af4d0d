//! Pointer input and the semantic events derived from it.
//!
//! Hosts feed [`RawEvent`]s into the [`Interactor`](crate::Interactor), which
//! translates them into region-scoped [`EventType`]s for the state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of low-level pointer input delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawEventKind {
    /// Primary button went down.
    Press,
    /// Pointer moved (button state irrelevant).
    Move,
    /// Primary button went up.
    Release,
    /// Secondary button click.
    #[serde(rename = "rightClick", alias = "right_click")]
    RightClick,
}

/// A raw pointer event in host coordinates.
///
/// # Examples
///
/// ```
/// use hotspot::{RawEvent, RawEventKind};
///
/// let event = RawEvent::new(RawEventKind::Press, 12.0, 4.5);
/// assert_eq!(event.position(), (12.0, 4.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// What happened.
    pub kind: RawEventKind,
    /// Horizontal position in host coordinates.
    pub x: f64,
    /// Vertical position in host coordinates.
    pub y: f64,
}

impl RawEvent {
    /// Creates a raw event at the given host position.
    #[must_use]
    pub const fn new(kind: RawEventKind, x: f64, y: f64) -> Self {
        Self { kind, x, y }
    }

    /// Returns the `(x, y)` position.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Region-scoped semantic event consumed by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Pointer entered a region since the previous frame.
    Enter,
    /// Pointer left a region since the previous frame.
    Exit,
    /// Press over a region.
    Press,
    /// Movement while over a region.
    MoveInside,
    /// Release over a region.
    Release,
    /// Release with no region under the pointer.
    ReleaseNone,
    /// Secondary click over a region.
    #[serde(rename = "rightClick", alias = "right_click")]
    RightClick,
}

impl EventType {
    /// Name used in descriptions and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::Press => "press",
            Self::MoveInside => "move_inside",
            Self::Release => "release",
            Self::ReleaseNone => "release_none",
            Self::RightClick => "rightClick",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
