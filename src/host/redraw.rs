//! Damage coalescing at the top of the hierarchy.

use crate::domain::{DamageHandle, DamageSink};
use std::cell::Cell;
use std::rc::Rc;

/// Host-side damage sink that folds any number of notifications into a single
/// pending redraw.
///
/// # Examples
///
/// ```
/// use hotspot::host::RedrawScheduler;
///
/// let scheduler = RedrawScheduler::new();
/// let handle = scheduler.handle();
/// handle.damage();
/// handle.damage();
///
/// assert_eq!(scheduler.damage_count(), 2);
/// assert!(scheduler.take_redraw());
/// assert!(!scheduler.take_redraw());
/// ```
#[derive(Debug, Default)]
pub struct RedrawScheduler {
    pending: Cell<bool>,
    damage_count: Cell<usize>,
}

impl RedrawScheduler {
    /// Creates a scheduler with nothing pending.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Handle to hand to an [`Interactor`](crate::Interactor) as its host.
    pub fn handle(self: &Rc<Self>) -> DamageHandle {
        DamageHandle::new(Rc::clone(self) as Rc<dyn DamageSink>)
    }

    /// Whether damage arrived since the last [`take_redraw`](Self::take_redraw).
    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.pending.get()
    }

    /// Clears and returns the pending flag. Call once per frame.
    pub fn take_redraw(&self) -> bool {
        self.pending.replace(false)
    }

    /// Total damage notifications received, including coalesced ones.
    #[must_use]
    pub fn damage_count(&self) -> usize {
        self.damage_count.get()
    }
}

impl DamageSink for RedrawScheduler {
    fn damage(&self) {
        self.damage_count.set(self.damage_count.get() + 1);
        if !self.pending.replace(true) {
            tracing::trace!("redraw scheduled");
        }
    }
}
