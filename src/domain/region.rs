//! Named, positioned boxes that make up an interactive object.
//!
//! A [`Region`] owns its geometry and its image state. Geometry and image
//! mutations notify the parent through [`Region::damage`] only when a value
//! actually changes. Image state follows a small lifecycle driven by
//! [`Region::start_load`] and [`Region::finish_load`]:
//!
//! ```text
//! location ""      ──────────────────────────────► loaded, no image
//! cache hit        ──────────────────────────────► loaded (ok or error)
//! cache miss ─► pending (ticket) ─► finish_load ─► loaded (ok or error) + damage
//! ```

use crate::domain::{DamageHandle, EventType, ImageHandle, RawEvent};
use crate::loader::{ImageLoader, LoadCompletion, LoadTicket};
use std::fmt;

/// Externally supplied behavior attached to a region (a drawing tool, a widget).
///
/// Invoked by the `invoke` action with the action's parameter and the event that
/// triggered it.
pub trait Behavior {
    /// Runs the behavior.
    fn invoke(&mut self, param: &str, event: EventType, raw: Option<&RawEvent>);
}

/// A named box with an optional image.
pub struct Region {
    name: String,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    auto_size: bool,
    image_location: String,
    loaded: bool,
    load_error: bool,
    image: Option<ImageHandle>,
    parent: Option<DamageHandle>,
    loader: ImageLoader,
    pending: Option<LoadTicket>,
    behavior: Option<Box<dyn Behavior>>,
}

impl Region {
    /// Creates an auto-sized region at the origin with no image.
    ///
    /// # Examples
    ///
    /// ```
    /// use hotspot::{ImageCache, ImageLoader, Region};
    ///
    /// let loader = ImageLoader::new(ImageCache::new());
    /// let region = Region::new("button", loader).at(10.0, 20.0).sized(30.0, 15.0);
    ///
    /// assert!(region.pick(30.0, 15.0));
    /// assert!(!region.pick(30.5, 15.0));
    /// assert!(region.loaded());
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, loader: ImageLoader) -> Self {
        Self {
            name: name.into(),
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            auto_size: true,
            image_location: String::new(),
            loaded: true,
            load_error: false,
            image: None,
            parent: None,
            loader,
            pending: None,
            behavior: None,
        }
    }

    /// Builder: sets the position.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Builder: sets an explicit size, disabling auto-size.
    #[must_use]
    pub fn sized(mut self, w: f64, h: f64) -> Self {
        self.w = w;
        self.h = h;
        self.auto_size = false;
        self
    }

    /// Builder: sets the image location and starts loading it.
    #[must_use]
    pub fn with_image(mut self, location: impl Into<String>) -> Self {
        self.image_location = location.into();
        self.start_load();
        self
    }

    /// Builder: attaches a behavior.
    #[must_use]
    pub fn with_behavior(mut self, behavior: Box<dyn Behavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Region name, unique within its state machine.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Horizontal position relative to the owning interactor.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical position relative to the owning interactor.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Current width.
    #[must_use]
    pub const fn w(&self) -> f64 {
        self.w
    }

    /// Current height.
    #[must_use]
    pub const fn h(&self) -> f64 {
        self.h
    }

    /// Whether the size tracks the loaded image.
    #[must_use]
    pub const fn auto_size(&self) -> bool {
        self.auto_size
    }

    /// Location of the image, `""` for none.
    #[must_use]
    pub fn image_location(&self) -> &str {
        &self.image_location
    }

    /// Whether the current location's load lifecycle has finished.
    #[must_use]
    pub const fn loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the current location failed to load. Implies [`Region::loaded`].
    #[must_use]
    pub const fn load_error(&self) -> bool {
        self.load_error
    }

    /// The loaded image, if any.
    #[must_use]
    pub const fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    /// Ticket of the in-flight load, if one is outstanding.
    #[must_use]
    pub const fn pending_ticket(&self) -> Option<LoadTicket> {
        self.pending
    }

    /// The parent damage handle.
    #[must_use]
    pub const fn parent(&self) -> Option<&DamageHandle> {
        self.parent.as_ref()
    }

    /// Returns `true` if the point, relative to the region's origin, lies inside
    /// the region. Edges are inclusive.
    #[must_use]
    pub fn pick(&self, local_x: f64, local_y: f64) -> bool {
        (0.0..=self.w).contains(&local_x) && (0.0..=self.h).contains(&local_y)
    }

    /// Notifies the parent, if any, that the region needs redrawing.
    pub fn damage(&self) {
        if let Some(parent) = &self.parent {
            parent.damage();
        }
    }

    /// Sets the horizontal position.
    pub fn set_x(&mut self, x: f64) {
        if self.x != x {
            self.x = x;
            self.damage();
        }
    }

    /// Sets the vertical position.
    pub fn set_y(&mut self, y: f64) {
        if self.y != y {
            self.y = y;
            self.damage();
        }
    }

    /// Sets both coordinates, damaging at most once.
    pub fn set_position(&mut self, x: f64, y: f64) {
        if self.x != x || self.y != y {
            self.x = x;
            self.y = y;
            self.damage();
        }
    }

    /// Sets an explicit width, disabling auto-size.
    pub fn set_w(&mut self, w: f64) {
        if self.w != w {
            self.w = w;
            self.auto_size = false;
            self.damage();
        }
    }

    /// Sets an explicit height, disabling auto-size.
    pub fn set_h(&mut self, h: f64) {
        if self.h != h {
            self.h = h;
            self.auto_size = false;
            self.damage();
        }
    }

    /// Sets an explicit size, damaging at most once.
    pub fn set_size(&mut self, w: f64, h: f64) {
        if self.w != w || self.h != h {
            self.w = w;
            self.h = h;
            self.auto_size = false;
            self.damage();
        }
    }

    /// Turns auto-size on or off.
    ///
    /// Turning it on adopts the current image's natural size when one is loaded.
    pub fn set_auto_size(&mut self, auto_size: bool) {
        if self.auto_size == auto_size {
            return;
        }
        self.auto_size = auto_size;
        if auto_size && self.apply_natural_size() {
            self.damage();
        }
    }

    /// Changes the image location and restarts the load lifecycle.
    ///
    /// Setting the current location again does nothing.
    pub fn set_image_location(&mut self, location: impl Into<String>) {
        let location = location.into();
        if self.image_location == location {
            return;
        }
        tracing::debug!(region = %self.name, from = %self.image_location, to = %location, "image location changed");
        self.image_location = location;
        self.damage();
        self.start_load();
    }

    /// Sets the parent damage handle.
    pub fn set_parent(&mut self, parent: Option<DamageHandle>) {
        if self.parent != parent {
            self.parent = parent;
            self.damage();
        }
    }

    /// Attaches or removes a behavior.
    pub fn set_behavior(&mut self, behavior: Option<Box<dyn Behavior>>) {
        self.behavior = behavior;
    }

    /// Runs the attached behavior. Returns `false` if none is attached.
    pub fn invoke_behavior(&mut self, param: &str, event: EventType, raw: Option<&RawEvent>) -> bool {
        match self.behavior.as_mut() {
            Some(behavior) => {
                behavior.invoke(param, event, raw);
                true
            }
            None => false,
        }
    }

    /// Starts the load lifecycle for the current location.
    ///
    /// Resets the load fields first, so whatever happens to an earlier in-flight
    /// load no longer shows through. Empty locations and cache hits resolve
    /// immediately; a miss queues a request on the loader and leaves the region
    /// pending until [`Region::finish_load`] receives the matching completion.
    pub fn start_load(&mut self) {
        self.loaded = false;
        self.load_error = false;
        self.image = None;
        if let Some(previous) = self.pending.take() {
            self.loader.abandon(previous);
        }

        if self.image_location.is_empty() {
            self.loaded = true;
            return;
        }

        match self.loader.cache().get(&self.image_location) {
            Some(cached) => {
                tracing::trace!(region = %self.name, location = %self.image_location, "image cache hit");
                self.adopt(cached);
            }
            None => {
                self.pending = Some(self.loader.request(&self.image_location));
            }
        }
    }

    /// Applies a load completion.
    ///
    /// The outcome is always cached. Region state only changes when the
    /// completion answers the region's outstanding request; in that case the
    /// region damages its parent and `true` is returned.
    pub fn finish_load(&mut self, completion: &LoadCompletion) -> bool {
        self.loader.resolve(completion);

        if self.pending != Some(completion.ticket) {
            return false;
        }

        self.pending = None;
        self.adopt(completion.outcome.image());
        self.damage();
        true
    }

    fn adopt(&mut self, image: Option<ImageHandle>) {
        self.loaded = true;
        match image {
            Some(image) => {
                self.load_error = false;
                self.image = Some(image);
                self.apply_natural_size();
            }
            None => {
                self.load_error = true;
                self.image = None;
            }
        }
    }

    fn apply_natural_size(&mut self) -> bool {
        let Some(image) = self.image.as_ref().filter(|_| self.auto_size) else {
            return false;
        };
        let (w, h) = (f64::from(image.width()), f64::from(image.height()));
        let changed = self.w != w || self.h != h;
        self.w = w;
        self.h = h;
        changed
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        if let Some(ticket) = self.pending.take() {
            self.loader.abandon(ticket);
        }
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("name", &self.name)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("w", &self.w)
            .field("h", &self.h)
            .field("auto_size", &self.auto_size)
            .field("image_location", &self.image_location)
            .field("loaded", &self.loaded)
            .field("load_error", &self.load_error)
            .field("pending", &self.pending)
            .field("has_behavior", &self.behavior.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ImageCache;
    use crate::domain::DamageSink;
    use image::RgbaImage;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counter(Cell<usize>);

    impl DamageSink for Counter {
        fn damage(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn attached(region: Region) -> (Region, Rc<Counter>) {
        let counter = Rc::new(Counter::default());
        let mut region = region;
        region.set_parent(Some(DamageHandle::new(counter.clone())));
        counter.0.set(0);
        (region, counter)
    }

    fn loader() -> ImageLoader {
        ImageLoader::new(ImageCache::new())
    }

    #[test]
    fn pick_is_closed_on_every_edge() {
        let region = Region::new("r", loader()).sized(10.0, 5.0);
        for (x, y) in [(0.0, 0.0), (10.0, 0.0), (0.0, 5.0), (10.0, 5.0), (4.0, 2.0)] {
            assert!(region.pick(x, y), "({x}, {y}) should be inside");
        }
        for (x, y) in [(-0.1, 0.0), (10.1, 0.0), (0.0, -0.1), (0.0, 5.1)] {
            assert!(!region.pick(x, y), "({x}, {y}) should be outside");
        }
    }

    #[test]
    fn unchanged_geometry_does_not_damage() {
        let (mut region, counter) = attached(Region::new("r", loader()).at(3.0, 4.0).sized(1.0, 1.0));

        region.set_x(3.0);
        region.set_position(3.0, 4.0);
        region.set_size(1.0, 1.0);
        assert_eq!(counter.0.get(), 0);

        region.set_x(7.0);
        assert_eq!(counter.0.get(), 1);
        region.set_h(2.0);
        assert_eq!(counter.0.get(), 2);
    }

    #[test]
    fn same_image_location_does_not_reload() {
        let loader = loader();
        let (mut region, counter) = attached(Region::new("r", loader.clone()));

        region.set_image_location("a.png");
        assert_eq!(loader.pending(), 1);
        assert_eq!(counter.0.get(), 1);
        assert!(!region.loaded());

        region.set_image_location("a.png");
        assert_eq!(loader.pending(), 1);
        assert_eq!(counter.0.get(), 1);
    }

    #[test]
    fn completion_applies_auto_size_and_damages_once() {
        let loader = loader();
        let (mut region, counter) = attached(Region::new("r", loader.clone()).with_image("a.png"));
        let request = loader.take_requests().remove(0);
        assert_eq!((region.w(), region.h()), (0.0, 0.0));

        let image = ImageHandle::new(RgbaImage::new(8, 6));
        assert!(region.finish_load(&LoadCompletion::loaded(&request, image.clone())));

        assert!(region.loaded());
        assert!(!region.load_error());
        assert_eq!(region.image(), Some(&image));
        assert_eq!((region.w(), region.h()), (8.0, 6.0));
        assert_eq!(counter.0.get(), 1);
        assert_eq!(loader.cache().get("a.png"), Some(Some(image)));
    }

    #[test]
    fn failed_completion_marks_error_and_is_cached() {
        let loader = loader();
        let mut region = Region::new("r", loader.clone()).sized(4.0, 4.0).with_image("bad.png");
        let request = loader.take_requests().remove(0);

        assert!(region.finish_load(&LoadCompletion::failed(&request, "not found")));
        assert!(region.loaded());
        assert!(region.load_error());
        assert!(region.image().is_none());
        assert_eq!((region.w(), region.h()), (4.0, 4.0));
        assert_eq!(loader.cache().get("bad.png"), Some(None));
    }

    #[test]
    fn stale_completion_is_cached_but_not_applied() {
        let loader = loader();
        let (mut region, counter) = attached(Region::new("r", loader.clone()).with_image("old.png"));
        let stale = loader.take_requests().remove(0);

        region.set_image_location("new.png");
        counter.0.set(0);

        let image = ImageHandle::new(RgbaImage::new(2, 2));
        assert!(!region.finish_load(&LoadCompletion::loaded(&stale, image)));
        assert!(!region.loaded());
        assert!(region.image().is_none());
        assert_eq!(counter.0.get(), 0);
        assert!(loader.cache().has("old.png"));
    }

    #[test]
    fn superseded_and_dropped_loads_are_abandoned() {
        let loader = loader();
        let mut region = Region::new("r", loader.clone()).with_image("old.png");
        region.set_image_location("new.png");
        drop(region);

        let drained = loader.take_requests_for(|_| false);
        let locations: Vec<&str> = drained.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, vec!["old.png", "new.png"]);
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn parent_changes_damage_only_the_new_parent() {
        let (mut region, first) = attached(Region::new("r", loader()));
        let first_handle = region.parent().cloned();

        region.set_parent(first_handle);
        assert_eq!(first.0.get(), 0);

        let second = Rc::new(Counter::default());
        region.set_parent(Some(DamageHandle::new(second.clone())));
        assert_eq!(first.0.get(), 0);
        assert_eq!(second.0.get(), 1);

        region.set_parent(None);
        assert_eq!(first.0.get(), 0);
        assert_eq!(second.0.get(), 1);
        assert!(region.parent().is_none());
    }

    #[test]
    fn cache_hit_resolves_synchronously() {
        let loader = loader();
        let image = ImageHandle::new(RgbaImage::new(5, 3));
        loader.cache().put("hit.png", Some(image.clone()));

        let region = Region::new("r", loader.clone()).with_image("hit.png");
        assert!(region.loaded());
        assert_eq!(region.image(), Some(&image));
        assert_eq!((region.w(), region.h()), (5.0, 3.0));
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn clearing_image_keeps_last_natural_size() {
        let loader = loader();
        loader.cache().put("a.png", Some(ImageHandle::new(RgbaImage::new(9, 9))));
        let mut region = Region::new("r", loader).with_image("a.png");

        region.set_image_location("");
        assert!(region.loaded());
        assert!(region.image().is_none());
        assert_eq!((region.w(), region.h()), (9.0, 9.0));
    }
}
