//! Shared request queue and cache access for image loads.

use crate::cache::ImageCache;
use crate::loader::{LoadCompletion, LoadRequest, LoadTicket};
use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

struct LoaderState {
    cache: ImageCache,
    queue: RefCell<VecDeque<LoadRequest>>,
    abandoned: RefCell<HashSet<LoadTicket>>,
    next_ticket: Cell<u64>,
}

/// Handle regions use to consult the cache and queue loads.
///
/// Every region of every state machine in an application normally shares one
/// loader (and therefore one cache). Clones share the same queue.
///
/// # Examples
///
/// ```
/// use hotspot::{ImageCache, ImageLoader};
///
/// let loader = ImageLoader::new(ImageCache::new());
/// let ticket = loader.request("button.png");
///
/// let requests = loader.take_requests();
/// assert_eq!(requests.len(), 1);
/// assert_eq!(requests[0].ticket, ticket);
/// assert!(loader.take_requests().is_empty());
/// ```
#[derive(Clone)]
pub struct ImageLoader {
    state: Rc<LoaderState>,
}

impl ImageLoader {
    /// Creates a loader backed by `cache`.
    #[must_use]
    pub fn new(cache: ImageCache) -> Self {
        Self {
            state: Rc::new(LoaderState {
                cache,
                queue: RefCell::new(VecDeque::new()),
                abandoned: RefCell::new(HashSet::new()),
                next_ticket: Cell::new(1),
            }),
        }
    }

    /// The cache this loader resolves into.
    #[must_use]
    pub fn cache(&self) -> &ImageCache {
        &self.state.cache
    }

    /// Queues a fetch for `location` and returns its ticket.
    pub fn request(&self, location: &str) -> LoadTicket {
        let ticket = LoadTicket(self.state.next_ticket.get());
        self.state.next_ticket.set(ticket.0 + 1);

        tracing::debug!(ticket = %ticket, location = %location, "image load queued");
        self.state.queue.borrow_mut().push_back(LoadRequest {
            ticket,
            location: location.to_string(),
        });
        ticket
    }

    /// Removes and returns every queued request, oldest first.
    pub fn take_requests(&self) -> Vec<LoadRequest> {
        self.state.abandoned.borrow_mut().clear();
        self.state.queue.borrow_mut().drain(..).collect()
    }

    /// Removes and returns the queued requests `owns` claims, plus every
    /// abandoned one, oldest first. Everything else stays queued in order.
    pub fn take_requests_for(&self, mut owns: impl FnMut(LoadTicket) -> bool) -> Vec<LoadRequest> {
        let mut abandoned = self.state.abandoned.borrow_mut();
        let mut queue = self.state.queue.borrow_mut();
        let mut taken = Vec::new();
        let mut kept = VecDeque::with_capacity(queue.len());
        for request in queue.drain(..) {
            if abandoned.remove(&request.ticket) || owns(request.ticket) {
                taken.push(request);
            } else {
                kept.push_back(request);
            }
        }
        *queue = kept;
        taken
    }

    /// Marks a still-queued request as having no region waiting for it.
    ///
    /// Abandoned requests are still serviced (their outcome is cached) by
    /// whichever interactor drains the queue next.
    pub fn abandon(&self, ticket: LoadTicket) {
        let queued = self.state.queue.borrow().iter().any(|r| r.ticket == ticket);
        if queued {
            tracing::trace!(ticket = %ticket, "image load abandoned");
            self.state.abandoned.borrow_mut().insert(ticket);
        }
    }

    /// Number of requests waiting to be serviced.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.queue.borrow().len()
    }

    /// Records a completion's outcome in the cache.
    ///
    /// Called for every completion, including stale ones whose region has since
    /// moved on to another location, so later requests still benefit.
    pub fn resolve(&self, completion: &LoadCompletion) {
        tracing::debug!(
            ticket = %completion.ticket,
            location = %completion.location,
            failed = completion.outcome.is_failure(),
            "image load resolved"
        );
        self.state
            .cache
            .put(&completion.location, completion.outcome.image());
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new(ImageCache::shared())
    }
}

impl fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageLoader")
            .field("cached", &self.state.cache.len())
            .field("pending", &self.pending())
            .field("abandoned", &self.state.abandoned.borrow().len())
            .field("next_ticket", &self.state.next_ticket.get())
            .finish()
    }
}
