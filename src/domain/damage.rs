//! Upward damage notification.
//!
//! Ownership runs downward (interactor → state machine → regions) while damage
//! travels upward through non-owning [`DamageHandle`]s. Each owning layer keeps a
//! [`DamageRelay`] that its children point at; the relay forwards to whatever
//! upstream handle it currently has. Nothing on this path batches: coalescing is
//! the job of the sink at the top (see [`RedrawScheduler`](crate::host::RedrawScheduler)).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Receiver of damage notifications.
pub trait DamageSink {
    /// Something below this sink changed and needs to be redrawn.
    fn damage(&self);
}

/// Shared, non-owning reference to a [`DamageSink`].
///
/// Equality is identity: two handles are equal when they point at the same sink.
#[derive(Clone)]
pub struct DamageHandle(Rc<dyn DamageSink>);

impl DamageHandle {
    /// Wraps a shared sink.
    pub fn new(sink: Rc<dyn DamageSink>) -> Self {
        Self(sink)
    }

    /// Forwards a damage notification to the sink.
    pub fn damage(&self) {
        self.0.damage();
    }
}

impl PartialEq for DamageHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DamageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DamageHandle")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Forwarding node owned by a layer of the hierarchy.
#[derive(Default)]
pub struct DamageRelay {
    upstream: RefCell<Option<DamageHandle>>,
}

impl DamageRelay {
    /// Creates a relay with no upstream.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Returns a handle children can store as their parent.
    pub fn handle(self: &Rc<Self>) -> DamageHandle {
        DamageHandle::new(Rc::clone(self) as Rc<dyn DamageSink>)
    }

    /// Replaces the upstream, returning `true` if it changed.
    pub fn set_upstream(&self, upstream: Option<DamageHandle>) -> bool {
        let mut current = self.upstream.borrow_mut();
        if *current == upstream {
            return false;
        }
        *current = upstream;
        true
    }

    /// Returns the current upstream handle.
    pub fn upstream(&self) -> Option<DamageHandle> {
        self.upstream.borrow().clone()
    }
}

impl DamageSink for DamageRelay {
    fn damage(&self) {
        let upstream = self.upstream.borrow().clone();
        if let Some(upstream) = upstream {
            upstream.damage();
        }
    }
}

impl fmt::Debug for DamageRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DamageRelay")
            .field("upstream", &self.upstream.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counter(Cell<usize>);

    impl DamageSink for Counter {
        fn damage(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn relay_forwards_only_with_upstream() {
        let counter = Rc::new(Counter::default());
        let relay = DamageRelay::new();

        relay.damage();
        assert_eq!(counter.0.get(), 0);

        assert!(relay.set_upstream(Some(DamageHandle::new(counter.clone()))));
        relay.damage();
        relay.damage();
        assert_eq!(counter.0.get(), 2);
    }

    #[test]
    fn handles_compare_by_identity() {
        let a = DamageRelay::new();
        let b = DamageRelay::new();
        assert_eq!(a.handle(), a.handle());
        assert_ne!(a.handle(), b.handle());
        assert!(!b.set_upstream(None));
    }
}
