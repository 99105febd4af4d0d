//! The state machine: regions, current state and transition execution.
//!
//! [`Fsm`] owns its regions (in draw order) and its transition table. Regions
//! point back at the machine through a [`DamageRelay`] rather than a reference to
//! the machine itself, so ownership stays a tree while damage still flows upward.

use crate::description::Description;
use crate::domain::error::{HotspotError, Result};
use crate::domain::{
    DamageHandle, DamageRelay, DamageSink, DiagnosticKind, Diagnostics, EventType, RawEvent, Region,
};
use crate::fsm::{Action, ActionType, EventContext, StateId, Transition, TransitionTable};
use crate::loader::{ImageLoader, LoadCompletion, LoadOutcome, LoadTicket};
use std::collections::HashSet;
use std::rc::Rc;

/// Index of a region in its state machine's draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub usize);

/// A finite state machine driving a set of regions.
#[derive(Debug)]
pub struct Fsm {
    regions: Vec<Region>,
    table: TransitionTable,
    initial: StateId,
    current: StateId,
    relay: Rc<DamageRelay>,
    loader: ImageLoader,
    diagnostics: Diagnostics,
    console: Vec<String>,
    report_unmatched: bool,
}

impl Fsm {
    /// Assembles a state machine from parts.
    ///
    /// Regions are adopted in draw order and re-parented onto the machine. Every
    /// action is bound once; binding failures go to `diagnostics` and do not stop
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::Description`] for duplicate region names or an
    /// undeclared initial state, and [`HotspotError::UnknownState`] for dangling
    /// transition targets.
    pub fn new(
        mut regions: Vec<Region>,
        mut table: TransitionTable,
        initial: StateId,
        loader: ImageLoader,
        diagnostics: Diagnostics,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = regions.iter().find(|r| !seen.insert(r.name().to_string())) {
            return Err(HotspotError::Description(format!(
                "duplicate region name '{}'",
                dup.name()
            )));
        }
        if !table.contains(&initial) {
            return Err(HotspotError::Description(format!(
                "initial state '{initial}' is not declared"
            )));
        }
        table.validate()?;

        let relay = DamageRelay::new();
        for region in &mut regions {
            region.set_parent(Some(relay.handle()));
        }

        let unbound = table.bind(&regions, &diagnostics);

        tracing::debug!(
            regions = regions.len(),
            states = table.states().len(),
            initial = %initial,
            unbound_actions = unbound,
            "state machine assembled"
        );

        Ok(Self {
            regions,
            table,
            current: initial.clone(),
            initial,
            relay,
            loader,
            diagnostics,
            console: Vec::new(),
            report_unmatched: false,
        })
    }

    /// Builds a state machine from a declarative description.
    ///
    /// Regions with an image location start loading immediately through `loader`.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`Description::validate`] and [`Fsm::new`].
    pub fn from_description(
        description: &Description,
        loader: ImageLoader,
        diagnostics: Diagnostics,
    ) -> Result<Self> {
        let _span = tracing::debug_span!("fsm_from_description").entered();
        description.validate()?;

        let regions = description
            .regions
            .iter()
            .map(|spec| {
                let mut region = Region::new(spec.name.clone(), loader.clone()).at(spec.x, spec.y);
                if let Some((w, h)) = spec.explicit_size() {
                    region = region.sized(w, h);
                }
                if !spec.image_location.is_empty() {
                    region = region.with_image(spec.image_location.clone());
                }
                region
            })
            .collect();

        let mut table = TransitionTable::new();
        for state in &description.states {
            table.add_state(state.name.as_str());
        }
        for state in &description.states {
            for spec in &state.transitions {
                let actions = spec
                    .actions
                    .iter()
                    .map(|a| Action::new(ActionType::parse(&a.action_type), a.region.clone(), a.param.clone()))
                    .collect();
                let transition = Transition::new(actions, spec.next_state.as_str());
                if !table.insert(state.name.as_str(), spec.event, spec.region_key(), transition) {
                    diagnostics.report(
                        DiagnosticKind::Description,
                        format!(
                            "duplicate transition in state '{}' for {} on {}; keeping the first",
                            state.name,
                            spec.event,
                            spec.region_key().unwrap_or("*")
                        ),
                    );
                }
            }
        }

        Self::new(regions, table, description.initial_state_id(), loader, diagnostics)
    }

    /// Enables reporting of unmatched events to the diagnostic channel.
    pub fn set_report_unmatched(&mut self, enabled: bool) {
        self.report_unmatched = enabled;
    }

    /// Regions in draw order (last is topmost).
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region by id.
    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    /// Mutable region by id.
    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.get_mut(id.0)
    }

    /// Looks a region up by name.
    #[must_use]
    pub fn find_region(&self, name: &str) -> Option<RegionId> {
        self.regions.iter().position(|r| r.name() == name).map(RegionId)
    }

    /// Region by name.
    #[must_use]
    pub fn region_named(&self, name: &str) -> Option<&Region> {
        self.find_region(name).and_then(|id| self.region(id))
    }

    /// Adds a standalone region on top of the draw order.
    ///
    /// Transitions match the region by name right away. Actions were bound at
    /// construction, so actions naming this region stay unbound.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::Description`] if the name is already taken.
    pub fn attach_region(&mut self, mut region: Region) -> Result<RegionId> {
        if self.find_region(region.name()).is_some() {
            return Err(HotspotError::Description(format!(
                "duplicate region name '{}'",
                region.name()
            )));
        }
        region.set_parent(Some(self.relay.handle()));
        self.regions.push(region);
        Ok(RegionId(self.regions.len() - 1))
    }

    /// The transition table.
    #[must_use]
    pub const fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Current state.
    #[must_use]
    pub const fn current_state(&self) -> &StateId {
        &self.current
    }

    /// Initial state.
    #[must_use]
    pub const fn initial_state(&self) -> &StateId {
        &self.initial
    }

    /// Whether the current state has no outgoing transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.table.is_terminal(&self.current)
    }

    /// The diagnostic channel this machine reports to.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The loader regions queue image requests on.
    #[must_use]
    pub const fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// Lines emitted by `print` and `print_event` actions so far.
    #[must_use]
    pub fn console(&self) -> &[String] {
        &self.console
    }

    /// Removes and returns the emitted lines.
    pub fn take_console(&mut self) -> Vec<String> {
        std::mem::take(&mut self.console)
    }

    /// Points the machine's damage at `parent`.
    pub fn set_parent(&self, parent: Option<DamageHandle>) {
        if self.relay.set_upstream(parent) {
            self.relay.damage();
        }
    }

    /// Forwards damage to the parent, if any.
    pub fn damage(&self) {
        self.relay.damage();
    }

    /// Returns to the initial state.
    pub fn reset(&mut self) {
        tracing::debug!(from = %self.current, to = %self.initial, "state machine reset");
        self.current = self.initial.clone();
    }

    /// Feeds one semantic event to the machine.
    ///
    /// On a match, the transition's actions run in declared order (each sees the
    /// effects of the previous ones) and then the machine enters the target
    /// state. Returns whether a transition fired; unmatched events change nothing.
    ///
    /// # Errors
    ///
    /// Fatal action errors abort the transition before the state changes.
    pub fn act_on_event(
        &mut self,
        event: EventType,
        region: Option<RegionId>,
        raw: Option<&RawEvent>,
    ) -> Result<bool> {
        let region_name = region.and_then(|id| self.regions.get(id.0)).map(Region::name);
        let _span = tracing::debug_span!(
            "act_on_event",
            state = %self.current,
            event = %event,
            region = region_name.unwrap_or("<none>")
        )
        .entered();

        let Some(transition) = self.table.lookup(&self.current, event, region_name) else {
            if self.report_unmatched {
                self.diagnostics.report(
                    DiagnosticKind::Unmatched,
                    format!(
                        "no transition in state '{}' for {} on {}",
                        self.current,
                        event,
                        region_name.unwrap_or("<none>")
                    ),
                );
            }
            return Ok(false);
        };

        let context = EventContext { event, region, raw };
        for action in &transition.actions {
            action.execute(&context, &mut self.regions, &mut self.console)?;
        }

        let next = transition.next.clone();
        tracing::debug!(from = %self.current, to = %next, actions = transition.actions.len(), "transition fired");
        self.current = next;
        Ok(true)
    }

    /// Whether one of the regions is waiting on `ticket`.
    #[must_use]
    pub fn is_waiting_on(&self, ticket: LoadTicket) -> bool {
        self.regions.iter().any(|r| r.pending_ticket() == Some(ticket))
    }

    /// Routes an image-load completion to the region waiting for it.
    ///
    /// The outcome is cached whether or not a region still wants it. Fetch
    /// failures are reported as load diagnostics once; failures answered from
    /// the cache were reported when they happened. Returns `true` if a region applied it.
    pub fn complete_load(&mut self, completion: &LoadCompletion) -> bool {
        let _span = tracing::debug_span!(
            "complete_load",
            ticket = %completion.ticket,
            location = %completion.location
        )
        .entered();

        if let (LoadOutcome::Failed(message), false) = (&completion.outcome, completion.cached) {
            self.diagnostics.report(
                DiagnosticKind::Load,
                format!("image '{}' failed to load: {message}", completion.location),
            );
        }

        let waiting = self
            .regions
            .iter_mut()
            .find(|r| r.pending_ticket() == Some(completion.ticket));

        match waiting {
            Some(region) => region.finish_load(completion),
            None => {
                tracing::debug!("no region waiting for completion, caching only");
                self.loader.resolve(completion);
                false
            }
        }
    }
}
