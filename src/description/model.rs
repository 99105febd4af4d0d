//! Serde model of the declarative state machine description.
//!
//! Field names are snake_case; the camelCase spellings used by older
//! descriptions (`imageLocation`, `nextState`, ...) are accepted as aliases.

use crate::domain::error::{HotspotError, Result};
use crate::domain::EventType;
use crate::fsm::StateId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Region name that matches any region (or none) in a transition.
pub const WILDCARD: &str = "*";

/// A complete state machine description.
///
/// # File Format
///
/// ```json
/// {
///   "initial_state": "idle",
///   "regions": [
///     {"name": "btn", "x": 0, "y": 0, "w": 10, "h": 10, "image_location": "btn.png"}
///   ],
///   "states": [
///     {
///       "name": "idle",
///       "transitions": [
///         {
///           "event": "press",
///           "region": "btn",
///           "actions": [{"type": "set_image", "region": "btn", "param": "down.png"}],
///           "next_state": "down"
///         }
///       ]
///     },
///     {"name": "down"}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Starting state. Defaults to the first listed state.
    #[serde(default, alias = "initialState", skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<String>,

    /// Regions in draw order; later entries are on top.
    #[serde(default)]
    pub regions: Vec<RegionSpec>,

    /// Declared states with their outgoing transitions.
    pub states: Vec<StateSpec>,
}

/// One region of a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Unique name within the description.
    pub name: String,

    #[serde(default)]
    pub x: f64,

    #[serde(default)]
    pub y: f64,

    /// Width; missing or negative means "size to the image".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,

    /// Height; missing or negative means "size to the image".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,

    /// Image to show, `""` for none.
    #[serde(default, alias = "imageLocation")]
    pub image_location: String,
}

impl RegionSpec {
    /// The explicit size, or `None` when the region should auto-size.
    #[must_use]
    pub fn explicit_size(&self) -> Option<(f64, f64)> {
        match (self.w, self.h) {
            (Some(w), Some(h)) if w >= 0.0 && h >= 0.0 => Some((w, h)),
            _ => None,
        }
    }
}

/// A declared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
    pub name: String,

    #[serde(default)]
    pub transitions: Vec<TransitionSpec>,
}

/// A transition out of its enclosing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
    #[serde(alias = "eventType")]
    pub event: EventType,

    /// Region the event must concern; missing or `"*"` matches anything.
    #[serde(default, alias = "regionName", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default)]
    pub actions: Vec<ActionSpec>,

    #[serde(alias = "nextState")]
    pub next_state: String,
}

impl TransitionSpec {
    /// The region to match on, `None` for the wildcard.
    #[must_use]
    pub fn region_key(&self) -> Option<&str> {
        self.region.as_deref().filter(|name| *name != WILDCARD)
    }
}

/// An action inside a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Vocabulary name, kept as written so unknown types survive loading.
    #[serde(rename = "type", alias = "actionType")]
    pub action_type: String,

    #[serde(default, alias = "regionName", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default)]
    pub param: String,
}

impl Description {
    /// Name of the starting state.
    #[must_use]
    pub fn initial_state_id(&self) -> StateId {
        self.initial_state
            .clone()
            .or_else(|| self.states.first().map(|s| s.name.clone()))
            .map(StateId::from)
            .unwrap_or_else(|| StateId::new(""))
    }

    /// Looks up a declared state.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&StateSpec> {
        self.states.iter().find(|s| s.name == name)
    }

    /// Checks the structural invariants a state machine needs.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::Description`] when there are no states, a state
    /// or region name repeats, or the initial state is undeclared, and
    /// [`HotspotError::UnknownState`] when a transition targets an undeclared
    /// state.
    pub fn validate(&self) -> Result<()> {
        if self.states.is_empty() {
            return Err(HotspotError::Description("no states declared".to_string()));
        }

        let mut states = HashSet::new();
        for state in &self.states {
            if !states.insert(state.name.as_str()) {
                return Err(HotspotError::Description(format!(
                    "duplicate state '{}'",
                    state.name
                )));
            }
        }

        let mut regions = HashSet::new();
        for region in &self.regions {
            if !regions.insert(region.name.as_str()) {
                return Err(HotspotError::Description(format!(
                    "duplicate region name '{}'",
                    region.name
                )));
            }
        }

        let initial = self.initial_state_id();
        if !states.contains(initial.as_str()) {
            return Err(HotspotError::Description(format!(
                "initial state '{initial}' is not declared"
            )));
        }

        for state in &self.states {
            if let Some(t) = state
                .transitions
                .iter()
                .find(|t| !states.contains(t.next_state.as_str()))
            {
                return Err(HotspotError::UnknownState {
                    from: state.name.clone(),
                    target: t.next_state.clone(),
                });
            }
        }

        Ok(())
    }
}
