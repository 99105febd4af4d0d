//! Location-keyed image cache shared by every region.
//!
//! An entry records the final outcome of loading one location: `Some(handle)` for
//! success, `None` for a permanent failure. Once a key resolves it is never
//! fetched again, so the cache doubles as the de-duplication point for loads.
//!
//! The cache is an injectable handle. Applications that want a single store for
//! the whole process use [`ImageCache::shared`]; tests build their own with
//! [`ImageCache::new`] or clear the shared one with [`ImageCache::reset`].

use crate::domain::ImageHandle;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

thread_local! {
    static SHARED: ImageCache = ImageCache::new();
}

/// Handle to a location → image store.
///
/// Clones share the same underlying map.
///
/// # Examples
///
/// ```
/// use hotspot::ImageCache;
///
/// let cache = ImageCache::new();
/// assert!(!cache.has("missing.png"));
///
/// cache.put("missing.png", None);
/// assert!(cache.has("missing.png"));
/// assert_eq!(cache.get("missing.png"), Some(None));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    entries: Rc<RefCell<HashMap<String, Option<ImageHandle>>>>,
}

impl ImageCache {
    /// Creates an empty, independent cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the application-scoped cache for the current thread.
    #[must_use]
    pub fn shared() -> Self {
        SHARED.with(Clone::clone)
    }

    /// Returns `true` if `location` has resolved (successfully or not).
    #[must_use]
    pub fn has(&self, location: &str) -> bool {
        self.entries.borrow().contains_key(location)
    }

    /// Returns the cached outcome for `location`.
    ///
    /// The outer `Option` says whether the location is cached at all, the inner
    /// one whether the load succeeded.
    #[must_use]
    pub fn get(&self, location: &str) -> Option<Option<ImageHandle>> {
        self.entries.borrow().get(location).cloned()
    }

    /// Records the outcome for `location`.
    pub fn put(&self, location: &str, image: Option<ImageHandle>) {
        let mut entries = self.entries.borrow_mut();
        if let Some(existing) = entries.get(location) {
            if *existing == image {
                return;
            }
            tracing::trace!(location = %location, "replacing cached image outcome");
        }
        entries.insert(location.to_string(), image);
    }

    /// Number of cached locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drops every cached entry.
    pub fn reset(&self) {
        tracing::debug!(entries = self.len(), "resetting image cache");
        self.entries.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn clones_share_entries() {
        let cache = ImageCache::new();
        let other = cache.clone();
        let handle = ImageHandle::new(RgbaImage::new(2, 2));

        other.put("a.png", Some(handle.clone()));

        assert!(cache.has("a.png"));
        assert_eq!(cache.get("a.png"), Some(Some(handle)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_is_idempotent() {
        let cache = ImageCache::new();
        let handle = ImageHandle::new(RgbaImage::new(1, 1));
        cache.put("a.png", Some(handle.clone()));
        cache.put("a.png", Some(handle.clone()));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a.png"), Some(Some(handle)));
    }

    #[test]
    fn shared_cache_survives_handles_and_resets() {
        let first = ImageCache::shared();
        first.reset();
        first.put("global.png", None);

        assert!(ImageCache::shared().has("global.png"));

        ImageCache::shared().reset();
        assert!(first.is_empty());
    }
}
