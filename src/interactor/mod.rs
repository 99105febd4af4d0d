//! The interactor: an on-screen object driven by a state machine.
//!
//! An [`Interactor`] owns at most one [`Fsm`], places it at a position in host
//! coordinates, turns raw pointer input into semantic events (see [`dispatch`])
//! and forwards damage from its regions to the host.
//!
//! # Description Lifecycle
//!
//! ```text
//! Empty ──install / install_description──► Ready ──install──► Ready
//!   │                                        
//!   └──── failed load or validation ───► Failed (permanent)
//! ```
//!
//! A failed interactor reports one diagnostic and ignores all further input
//! and installs.

pub mod dispatch;

pub use dispatch::{pick_regions, plan_events, DispatchedEvent};

use crate::description::{self, Description};
use crate::domain::error::Result;
use crate::domain::{DamageHandle, DamageRelay, DamageSink, DiagnosticKind, Diagnostics};
use crate::fsm::{Fsm, RegionId};
use crate::host::FrameView;
use crate::loader::{Fetch, ImageLoader, LoadCompletion, LoadTicket};
use std::rc::Rc;

#[derive(Debug)]
enum FsmSlot {
    Empty,
    Ready(Fsm),
    Failed(String),
}

/// A positioned, state-machine-driven interactive object.
///
/// # Examples
///
/// ```
/// use hotspot::{Diagnostics, EventType, ImageCache, ImageLoader, Interactor, RawEventKind};
///
/// let description = hotspot::description::from_json_str(r#"{
///     "regions": [{"name": "btn", "w": 10, "h": 10}],
///     "states": [
///         {"name": "up", "transitions": [{"event": "press", "region": "btn", "next_state": "down"}]},
///         {"name": "down"}
///     ]
/// }"#);
///
/// let mut interactor = Interactor::new(ImageLoader::new(ImageCache::new()), Diagnostics::new());
/// assert!(interactor.install_description(description));
/// interactor.set_position(100.0, 100.0);
///
/// let events = interactor.dispatch_raw_event(RawEventKind::Press, 105.0, 105.0)?;
/// assert_eq!(events[0].event, EventType::Enter);
/// assert_eq!(events[1].event, EventType::Press);
/// assert_eq!(interactor.current_state(), Some("down"));
/// # Ok::<(), hotspot::HotspotError>(())
/// ```
#[derive(Debug)]
pub struct Interactor {
    slot: FsmSlot,
    x: f64,
    y: f64,
    bookkeeping: Vec<RegionId>,
    relay: Rc<DamageRelay>,
    loader: ImageLoader,
    diagnostics: Diagnostics,
    report_unmatched: bool,
}

impl Interactor {
    /// Creates an interactor with no state machine yet.
    #[must_use]
    pub fn new(loader: ImageLoader, diagnostics: Diagnostics) -> Self {
        Self {
            slot: FsmSlot::Empty,
            x: 0.0,
            y: 0.0,
            bookkeeping: Vec::new(),
            relay: DamageRelay::new(),
            loader,
            diagnostics,
            report_unmatched: false,
        }
    }

    /// Creates an interactor around an existing state machine, sharing its
    /// loader and diagnostic channel.
    #[must_use]
    pub fn with_fsm(fsm: Fsm) -> Self {
        let mut interactor = Self::new(fsm.loader().clone(), fsm.diagnostics().clone());
        interactor.install(fsm);
        interactor
    }

    /// Installs a state machine, replacing any previous one.
    ///
    /// Returns `false` (and drops `fsm`) if the interactor has permanently
    /// failed.
    pub fn install(&mut self, mut fsm: Fsm) -> bool {
        if let FsmSlot::Failed(reason) = &self.slot {
            tracing::debug!(reason = %reason, "interactor failed earlier, refusing state machine");
            return false;
        }

        fsm.set_report_unmatched(self.report_unmatched);
        fsm.set_parent(Some(self.relay.handle()));
        tracing::debug!(
            regions = fsm.regions().len(),
            initial = %fsm.initial_state(),
            "state machine installed"
        );
        self.slot = FsmSlot::Ready(fsm);
        self.bookkeeping.clear();
        self.damage();
        true
    }

    /// Builds and installs a state machine from a description load result.
    ///
    /// Load and validation failures are reported as description diagnostics
    /// and leave the interactor permanently failed. Returns whether a state
    /// machine was installed.
    pub fn install_description(&mut self, description: Result<Description>) -> bool {
        if matches!(self.slot, FsmSlot::Failed(_)) {
            return false;
        }

        let built = description.and_then(|d| {
            Fsm::from_description(&d, self.loader.clone(), self.diagnostics.clone())
        });
        match built {
            Ok(fsm) => self.install(fsm),
            Err(e) => {
                self.fail(e.to_string());
                false
            }
        }
    }

    /// Fetches, parses and installs a description from `location`.
    pub fn load_description(&mut self, fetcher: &mut dyn Fetch, location: &str) -> bool {
        let _span = tracing::debug_span!("load_description", location = %location).entered();
        let description = fetcher
            .fetch(location)
            .and_then(|bytes| description::from_bytes(&bytes));
        self.install_description(description)
    }

    fn fail(&mut self, reason: String) {
        self.diagnostics.report(
            DiagnosticKind::Description,
            format!("state machine unavailable: {reason}"),
        );
        self.slot = FsmSlot::Failed(reason);
        self.bookkeeping.clear();
    }

    /// The installed state machine.
    #[must_use]
    pub fn fsm(&self) -> Option<&Fsm> {
        match &self.slot {
            FsmSlot::Ready(fsm) => Some(fsm),
            FsmSlot::Empty | FsmSlot::Failed(_) => None,
        }
    }

    /// Mutable access to the installed state machine.
    pub fn fsm_mut(&mut self) -> Option<&mut Fsm> {
        match &mut self.slot {
            FsmSlot::Ready(fsm) => Some(fsm),
            FsmSlot::Empty | FsmSlot::Failed(_) => None,
        }
    }

    /// Why the interactor failed, if it did.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match &self.slot {
            FsmSlot::Failed(reason) => Some(reason),
            FsmSlot::Empty | FsmSlot::Ready(_) => None,
        }
    }

    /// Whether the interactor has permanently failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.slot, FsmSlot::Failed(_))
    }

    /// Name of the current state, if a state machine is installed.
    #[must_use]
    pub fn current_state(&self) -> Option<&str> {
        self.fsm().map(|fsm| fsm.current_state().as_str())
    }

    /// Position in host coordinates.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Moves the interactor, damaging the host if the position changed.
    pub fn set_position(&mut self, x: f64, y: f64) {
        if self.x == x && self.y == y {
            return;
        }
        self.x = x;
        self.y = y;
        self.damage();
    }

    /// Sets the damage sink at the top of the hierarchy.
    ///
    /// Changing the host damages the new one.
    pub fn set_host(&self, host: Option<DamageHandle>) {
        if self.relay.set_upstream(host) {
            self.damage();
        }
    }

    /// Current host handle.
    #[must_use]
    pub fn host(&self) -> Option<DamageHandle> {
        self.relay.upstream()
    }

    /// Forwards damage to the host, if any.
    pub fn damage(&self) {
        self.relay.damage();
    }

    /// The loader this interactor's regions queue requests on.
    #[must_use]
    pub const fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// The diagnostic channel.
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Regions picked by the previous raw event, topmost first.
    #[must_use]
    pub fn bookkeeping(&self) -> &[RegionId] {
        &self.bookkeeping
    }

    /// Enables unmatched-event diagnostics on current and future state machines.
    pub fn set_report_unmatched(&mut self, enabled: bool) {
        self.report_unmatched = enabled;
        if let Some(fsm) = self.fsm_mut() {
            fsm.set_report_unmatched(enabled);
        }
    }

    /// Whether a region of the installed state machine is waiting on `ticket`.
    #[must_use]
    pub fn is_waiting_on(&self, ticket: LoadTicket) -> bool {
        self.fsm().is_some_and(|fsm| fsm.is_waiting_on(ticket))
    }

    /// Delivers an image-load completion.
    ///
    /// Without a state machine the outcome is still cached.
    pub fn complete_load(&mut self, completion: &LoadCompletion) -> bool {
        match self.fsm_mut() {
            Some(fsm) => fsm.complete_load(completion),
            None => {
                self.loader.resolve(completion);
                false
            }
        }
    }

    /// Resets the state machine to its initial state and forgets the previous
    /// frame's pick set.
    pub fn reset(&mut self) {
        if let Some(fsm) = self.fsm_mut() {
            fsm.reset();
        }
        self.bookkeeping.clear();
    }

    /// Removes and returns the lines printed by actions.
    pub fn take_console(&mut self) -> Vec<String> {
        self.fsm_mut().map(Fsm::take_console).unwrap_or_default()
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> FrameView {
        match self.fsm() {
            Some(fsm) => FrameView::capture(
                self.position(),
                Some(fsm.current_state().as_str()),
                fsm.regions(),
            ),
            None => FrameView {
                origin: self.position(),
                ..FrameView::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ImageCache;
    use crate::host::RedrawScheduler;
    use crate::HotspotError;

    fn interactor() -> Interactor {
        Interactor::new(ImageLoader::new(ImageCache::new()), Diagnostics::new())
    }

    #[test]
    fn failed_description_is_permanent() {
        let mut interactor = interactor();
        let failed = Err(HotspotError::Fetch {
            location: "fsm.json".into(),
            message: "offline".into(),
        });
        assert!(!interactor.install_description(failed));
        assert!(interactor.is_failed());
        assert_eq!(interactor.diagnostics().count(DiagnosticKind::Description), 1);

        let good = description::from_json_str(r#"{"states": [{"name": "s"}]}"#);
        assert!(!interactor.install_description(good));
        assert!(interactor.fsm().is_none());
        assert!(interactor
            .dispatch_raw_event(crate::RawEventKind::Press, 0.0, 0.0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn invalid_description_fails_the_interactor() {
        let mut interactor = interactor();
        let dangling = description::from_json_str(
            r#"{"states": [{"name": "s", "transitions": [{"event": "press", "next_state": "gone"}]}]}"#,
        );
        assert!(!interactor.install_description(dangling));
        assert!(interactor.failure().unwrap().contains("gone"));
    }

    #[test]
    fn moving_damages_host_only_on_change() {
        let scheduler = RedrawScheduler::new();
        let interactor_host = scheduler.handle();
        let mut interactor = interactor();
        interactor.set_host(Some(interactor_host.clone()));
        assert_eq!(scheduler.damage_count(), 1);

        interactor.set_host(Some(interactor_host));
        interactor.set_position(0.0, 0.0);
        assert_eq!(scheduler.damage_count(), 1);

        interactor.set_position(3.0, 0.0);
        assert_eq!(scheduler.damage_count(), 2);
        assert_eq!(interactor.view().origin, (3.0, 0.0));
    }
}
