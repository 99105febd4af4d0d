//! Actions fired by transitions.
//!
//! An [`Action`] is built from a description entry, bound once to a region of its
//! state machine with [`Action::bind_region`], then executed any number of times.
//! The vocabulary is closed; anything else parses to [`ActionType::Unknown`] and
//! fails hard when executed.

use crate::domain::error::{HotspotError, Result};
use crate::domain::{EventType, RawEvent, Region};
use crate::fsm::RegionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed action vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionType {
    /// Set the target's image location to the parameter.
    SetImage,
    /// Remove the target's image.
    ClearImage,
    /// Do nothing.
    None,
    /// Log the parameter.
    Print,
    /// Log a description of the triggering event.
    PrintEvent,
    /// Move the target to `"x,y"`.
    MoveTo,
    /// Offset the target by `"dx,dy"`.
    MoveBy,
    /// Give the target an explicit `"w,h"` size.
    Resize,
    /// Center the target on the pointer position.
    CenterOnPointer,
    /// Run the target's attached behavior.
    Invoke,
    /// Anything outside the vocabulary.
    Unknown(String),
}

impl ActionType {
    /// Parses a vocabulary name. Never fails; unknown names are kept verbatim.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "set_image" => Self::SetImage,
            "clear_image" => Self::ClearImage,
            "none" => Self::None,
            "print" => Self::Print,
            "print_event" => Self::PrintEvent,
            "move_to" => Self::MoveTo,
            "move_by" => Self::MoveBy,
            "resize" => Self::Resize,
            "center_on_pointer" => Self::CenterOnPointer,
            "invoke" => Self::Invoke,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Vocabulary name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::SetImage => "set_image",
            Self::ClearImage => "clear_image",
            Self::None => "none",
            Self::Print => "print",
            Self::PrintEvent => "print_event",
            Self::MoveTo => "move_to",
            Self::MoveBy => "move_by",
            Self::Resize => "resize",
            Self::CenterOnPointer => "center_on_pointer",
            Self::Invoke => "invoke",
            Self::Unknown(name) => name,
        }
    }

    /// Whether the action cannot run without a target region.
    ///
    /// Unknown types report `false` so binding stays quiet about them; they fail
    /// when executed instead.
    #[must_use]
    pub const fn requires_region(&self) -> bool {
        !matches!(
            self,
            Self::None | Self::Print | Self::PrintEvent | Self::Unknown(_)
        )
    }
}

impl From<String> for ActionType {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<ActionType> for String {
    fn from(action: ActionType) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an action's target resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// [`Action::bind_region`] has not run yet.
    Pending,
    /// Bound to a region of the owning state machine.
    Region(RegionId),
    /// Region-optional action with no target.
    NoRegion,
    /// A required target could not be found; the action is a no-op.
    Unbound,
}

/// The semantic event an action is executed for.
///
/// `raw` is in interactor-local coordinates.
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    /// Event type that fired the transition.
    pub event: EventType,
    /// Region the event was dispatched for, if any.
    pub region: Option<RegionId>,
    /// Pointer event that caused it, if any.
    pub raw: Option<&'a RawEvent>,
}

/// A single effect bound to a region by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    action_type: ActionType,
    target_name: Option<String>,
    param: String,
    binding: Binding,
}

impl Action {
    /// Creates an unbound action.
    #[must_use]
    pub fn new(action_type: ActionType, target_name: Option<String>, param: impl Into<String>) -> Self {
        Self {
            action_type,
            target_name,
            param: param.into(),
            binding: Binding::Pending,
        }
    }

    /// Action type.
    #[must_use]
    pub const fn action_type(&self) -> &ActionType {
        &self.action_type
    }

    /// Name of the target region as written in the description.
    #[must_use]
    pub fn target_name(&self) -> Option<&str> {
        self.target_name.as_deref()
    }

    /// Free-form parameter.
    #[must_use]
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Current binding.
    #[must_use]
    pub const fn binding(&self) -> Binding {
        self.binding
    }

    /// Resolves the target region by name.
    ///
    /// The first region with a matching name wins. Region-optional actions with no
    /// match bind to nothing silently.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::UnboundRegion`] when a region-required action has
    /// no match. The action stays usable and simply does nothing when executed.
    pub fn bind_region(&mut self, regions: &[Region]) -> Result<()> {
        if let Some(name) = &self.target_name {
            if let Some(index) = regions.iter().position(|r| r.name() == name) {
                self.binding = Binding::Region(RegionId(index));
                return Ok(());
            }
        }

        if !self.action_type.requires_region() {
            self.binding = Binding::NoRegion;
            return Ok(());
        }

        self.binding = Binding::Unbound;
        Err(HotspotError::UnboundRegion {
            action: self.action_type.to_string(),
            region: self.target_name.clone().unwrap_or_default(),
        })
    }

    /// Performs the action's effect.
    ///
    /// Lines produced by `print` and `print_event` are logged and appended to
    /// `console`.
    ///
    /// # Errors
    ///
    /// [`HotspotError::UnknownAction`] for types outside the vocabulary and
    /// [`HotspotError::ActionParam`] for unparseable numeric parameters. Both are
    /// fatal to the dispatch in progress.
    pub fn execute(
        &self,
        context: &EventContext<'_>,
        regions: &mut [Region],
        console: &mut Vec<String>,
    ) -> Result<()> {
        tracing::trace!(action = %self.action_type, param = %self.param, "executing action");

        match &self.action_type {
            ActionType::Unknown(name) => return Err(HotspotError::UnknownAction(name.clone())),
            ActionType::None => return Ok(()),
            ActionType::Print => {
                tracing::info!(target: "hotspot::print", "{}", self.param);
                console.push(self.param.clone());
                return Ok(());
            }
            ActionType::PrintEvent => {
                let line = self.describe_event(context, regions);
                tracing::info!(target: "hotspot::print", "{line}");
                console.push(line);
                return Ok(());
            }
            _ => {}
        }

        let Binding::Region(id) = self.binding else {
            tracing::trace!(action = %self.action_type, "action has no bound region, skipping");
            return Ok(());
        };
        let Some(region) = regions.get_mut(id.0) else {
            return Ok(());
        };

        match &self.action_type {
            ActionType::SetImage => region.set_image_location(self.param.as_str()),
            ActionType::ClearImage => region.set_image_location(""),
            ActionType::MoveTo => {
                let (x, y) = self.numeric_pair()?;
                region.set_position(x, y);
            }
            ActionType::MoveBy => {
                let (dx, dy) = self.numeric_pair()?;
                region.set_position(region.x() + dx, region.y() + dy);
            }
            ActionType::Resize => {
                let (w, h) = self.numeric_pair()?;
                region.set_size(w, h);
            }
            ActionType::CenterOnPointer => {
                if let Some(raw) = context.raw {
                    region.set_position(raw.x - region.w() / 2.0, raw.y - region.h() / 2.0);
                }
            }
            ActionType::Invoke => {
                if !region.invoke_behavior(&self.param, context.event, context.raw) {
                    tracing::debug!(region = %region.name(), "invoke on region without behavior");
                }
            }
            ActionType::None | ActionType::Print | ActionType::PrintEvent | ActionType::Unknown(_) => {}
        }
        Ok(())
    }

    fn describe_event(&self, context: &EventContext<'_>, regions: &[Region]) -> String {
        let region = context
            .region
            .and_then(|id| regions.get(id.0))
            .map_or("<none>", Region::name);
        let mut line = if self.param.is_empty() {
            format!("{} on {region}", context.event)
        } else {
            format!("{}{} on {region}", self.param, context.event)
        };
        if let Some(raw) = context.raw {
            line.push_str(&format!(" at ({}, {})", raw.x, raw.y));
        }
        line
    }

    fn numeric_pair(&self) -> Result<(f64, f64)> {
        let malformed = || HotspotError::ActionParam {
            action: self.action_type.to_string(),
            param: self.param.clone(),
        };
        let (a, b) = self.param.split_once(',').ok_or_else(malformed)?;
        let a = a.trim().parse::<f64>().map_err(|_| malformed())?;
        let b = b.trim().parse::<f64>().map_err(|_| malformed())?;
        Ok((a, b))
    }
}
