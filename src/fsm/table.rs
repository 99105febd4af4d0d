//! State identifiers and the transition table.

use crate::domain::error::{HotspotError, Result};
use crate::domain::{DiagnosticKind, Diagnostics, EventType, Region};
use crate::fsm::Action;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque state identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    /// Creates a state identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The identifier as written in the description.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Ordered actions plus the state to enter afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Actions run in order when the transition fires.
    pub actions: Vec<Action>,
    /// State entered after the actions complete.
    pub next: StateId,
}

impl Transition {
    /// Creates a transition.
    #[must_use]
    pub fn new(actions: Vec<Action>, next: impl Into<StateId>) -> Self {
        Self {
            actions,
            next: next.into(),
        }
    }
}

impl From<String> for StateId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

#[derive(Debug, Clone, Default)]
struct StateRules {
    exact: HashMap<(EventType, String), Transition>,
    wildcard: HashMap<EventType, Transition>,
}

/// Maps `(state, event, region-or-wildcard)` to a [`Transition`].
///
/// # Examples
///
/// ```
/// use hotspot::fsm::{StateId, Transition, TransitionTable};
/// use hotspot::EventType;
///
/// let mut table = TransitionTable::new();
/// table.add_state("idle");
/// table.add_state("armed");
/// table.insert("idle", EventType::Press, None, Transition::new(vec![], "armed"));
/// table.insert("idle", EventType::Press, Some("btn"), Transition::new(vec![], "idle"));
///
/// let idle = StateId::new("idle");
/// assert_eq!(table.lookup(&idle, EventType::Press, Some("btn")).unwrap().next.as_str(), "idle");
/// assert_eq!(table.lookup(&idle, EventType::Press, Some("other")).unwrap().next.as_str(), "armed");
/// assert_eq!(table.lookup(&idle, EventType::Press, None).unwrap().next.as_str(), "armed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    order: Vec<StateId>,
    states: HashMap<StateId, StateRules>,
}

impl TransitionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a state. Returns `false` if it already existed.
    pub fn add_state(&mut self, state: impl Into<StateId>) -> bool {
        let state = state.into();
        if self.states.contains_key(&state) {
            return false;
        }
        self.order.push(state.clone());
        self.states.insert(state, StateRules::default());
        true
    }

    /// Whether `state` is declared.
    #[must_use]
    pub fn contains(&self, state: &StateId) -> bool {
        self.states.contains_key(state)
    }

    /// Declared states in declaration order.
    #[must_use]
    pub fn states(&self) -> &[StateId] {
        &self.order
    }

    /// Adds a transition out of `from`, declaring the state if needed.
    ///
    /// `region: None` is the wildcard. The first transition for a key wins;
    /// returns `false` when the key was already taken.
    pub fn insert(
        &mut self,
        from: impl Into<StateId>,
        event: EventType,
        region: Option<&str>,
        transition: Transition,
    ) -> bool {
        let from = from.into();
        self.add_state(from.clone());
        let Some(rules) = self.states.get_mut(&from) else {
            return false;
        };

        match region {
            Some(name) => {
                let key = (event, name.to_string());
                if rules.exact.contains_key(&key) {
                    return false;
                }
                rules.exact.insert(key, transition);
            }
            None => {
                if rules.wildcard.contains_key(&event) {
                    return false;
                }
                rules.wildcard.insert(event, transition);
            }
        }
        true
    }

    /// Finds the most specific transition for an event.
    ///
    /// An exact region match beats the wildcard; region-less events only match
    /// the wildcard.
    #[must_use]
    pub fn lookup(&self, state: &StateId, event: EventType, region: Option<&str>) -> Option<&Transition> {
        let rules = self.states.get(state)?;
        region
            .and_then(|name| rules.exact.get(&(event, name.to_string())))
            .or_else(|| rules.wildcard.get(&event))
    }

    /// Whether `state` has no outgoing transitions.
    #[must_use]
    pub fn is_terminal(&self, state: &StateId) -> bool {
        self.states
            .get(state)
            .map_or(true, |rules| rules.exact.is_empty() && rules.wildcard.is_empty())
    }

    /// Checks that every transition targets a declared state.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::UnknownState`] for the first dangling target, in
    /// declaration order of the source states.
    pub fn validate(&self) -> Result<()> {
        for from in &self.order {
            let Some(rules) = self.states.get(from) else {
                continue;
            };
            let dangling = rules
                .exact
                .values()
                .chain(rules.wildcard.values())
                .find(|t| !self.states.contains_key(&t.next));
            if let Some(transition) = dangling {
                return Err(HotspotError::UnknownState {
                    from: from.to_string(),
                    target: transition.next.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Binds every action against `regions`, reporting failures to `diagnostics`.
    ///
    /// Returns the number of actions that failed to bind.
    pub fn bind(&mut self, regions: &[Region], diagnostics: &Diagnostics) -> usize {
        let mut failures = 0;
        for from in &self.order {
            let Some(rules) = self.states.get_mut(from) else {
                continue;
            };
            let transitions = rules.exact.values_mut().chain(rules.wildcard.values_mut());
            for transition in transitions {
                for action in &mut transition.actions {
                    if let Err(e) = action.bind_region(regions) {
                        failures += 1;
                        diagnostics.report(DiagnosticKind::Binding, format!("in state '{from}': {e}"));
                    }
                }
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_transition_for_a_key_wins() {
        let mut table = TransitionTable::new();
        assert!(table.insert("s", EventType::Enter, Some("r"), Transition::new(vec![], "s")));
        assert!(!table.insert("s", EventType::Enter, Some("r"), Transition::new(vec![], "t")));
        let found = table.lookup(&StateId::new("s"), EventType::Enter, Some("r")).unwrap();
        assert_eq!(found.next, StateId::new("s"));
    }

    #[test]
    fn unmatched_lookup_is_none() {
        let mut table = TransitionTable::new();
        table.insert("s", EventType::Enter, Some("r"), Transition::new(vec![], "s"));
        let s = StateId::new("s");
        assert!(table.lookup(&s, EventType::Exit, Some("r")).is_none());
        assert!(table.lookup(&s, EventType::Enter, None).is_none());
        assert!(table.lookup(&StateId::new("missing"), EventType::Enter, Some("r")).is_none());
    }

    #[test]
    fn validate_rejects_dangling_targets() {
        let mut table = TransitionTable::new();
        table.insert("a", EventType::Press, None, Transition::new(vec![], "b"));
        let err = table.validate().unwrap_err();
        assert!(matches!(err, HotspotError::UnknownState { ref target, .. } if target == "b"));

        table.add_state("b");
        table.validate().unwrap();
        assert!(table.is_terminal(&StateId::new("b")));
        assert!(!table.is_terminal(&StateId::new("a")));
    }
}
