//! Servicing queued image loads.
//!
//! The engine never performs I/O on its own: regions only queue
//! [`LoadRequest`]s. A [`LoadWorker`] drains that queue through a [`Fetch`]
//! implementation, decodes the payloads and produces the completions that are
//! fed back into the interactor.

use crate::cache::ImageCache;
use crate::domain::error::{HotspotError, Result};
use crate::domain::ImageHandle;
use crate::infrastructure::paths;
use crate::interactor::Interactor;
use crate::loader::{ImageLoader, LoadCompletion, LoadRequest};
use std::path::{Path, PathBuf};

/// Source of raw bytes for image and description locations.
///
/// Any `FnMut(&str) -> Result<Vec<u8>>` closure is a fetcher.
pub trait Fetch {
    /// Returns the payload stored at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::Fetch`] (or an I/O error) when the payload is
    /// unavailable.
    fn fetch(&mut self, location: &str) -> Result<Vec<u8>>;
}

impl<F> Fetch for F
where
    F: FnMut(&str) -> Result<Vec<u8>>,
{
    fn fetch(&mut self, location: &str) -> Result<Vec<u8>> {
        self(location)
    }
}

/// Fetches locations from the local file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    /// Creates a fetcher resolving relative locations against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory relative locations are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Fetch for FileFetcher {
    fn fetch(&mut self, location: &str) -> Result<Vec<u8>> {
        let path = paths::resolve_location(&self.root, location);
        tracing::trace!(location = %location, path = ?path, "reading file");
        std::fs::read(&path).map_err(|e| HotspotError::Fetch {
            location: location.to_string(),
            message: format!("{}: {e}", path.display()),
        })
    }
}

/// Drains load requests through a fetcher.
///
/// Each serviced completion is written to the cache before the next request is
/// looked at, so several regions waiting on the same location cost one fetch.
///
/// # Examples
///
/// ```
/// use hotspot::loader::LoadWorker;
/// use hotspot::{HotspotError, ImageCache, ImageLoader};
///
/// let loader = ImageLoader::new(ImageCache::new());
/// loader.request("missing.png");
/// loader.request("missing.png");
///
/// let mut worker = LoadWorker::new(|location: &str| -> hotspot::Result<Vec<u8>> {
///     Err(HotspotError::Fetch { location: location.into(), message: "offline".into() })
/// });
/// let completions = worker.service(&loader);
///
/// assert_eq!(completions.len(), 2);
/// assert_eq!(worker.fetches(), 1);
/// assert_eq!(loader.cache().get("missing.png"), Some(None));
/// ```
#[derive(Debug)]
pub struct LoadWorker<F> {
    fetcher: F,
    fetches: usize,
}

impl<F: Fetch> LoadWorker<F> {
    /// Creates a worker around `fetcher`.
    pub const fn new(fetcher: F) -> Self {
        Self { fetcher, fetches: 0 }
    }

    /// Number of times the fetcher has been called.
    #[must_use]
    pub const fn fetches(&self) -> usize {
        self.fetches
    }

    /// The wrapped fetcher.
    pub fn fetcher_mut(&mut self) -> &mut F {
        &mut self.fetcher
    }

    /// Produces the completion for one request.
    ///
    /// A location already in `cache` is answered from it without fetching.
    pub fn process(&mut self, cache: &ImageCache, request: &LoadRequest) -> LoadCompletion {
        let _span = tracing::debug_span!(
            "process_load",
            ticket = %request.ticket,
            location = %request.location
        )
        .entered();

        if let Some(cached) = cache.get(&request.location) {
            tracing::debug!("answered from cache");
            let completion = match cached {
                Some(image) => LoadCompletion::loaded(request, image),
                None => LoadCompletion::failed(request, "earlier load of this location failed"),
            };
            return completion.from_cache();
        }

        self.fetches += 1;
        match self.fetch_and_decode(&request.location) {
            Ok(image) => {
                tracing::debug!(width = image.width(), height = image.height(), "image decoded");
                LoadCompletion::loaded(request, image)
            }
            Err(e) => {
                tracing::debug!(error = %e, "image load failed");
                LoadCompletion::failed(request, e.to_string())
            }
        }
    }

    /// Services every request queued on `loader`, caching each outcome.
    ///
    /// Completions are returned for the caller to route; requests queued by
    /// other interactors sharing the loader are included.
    pub fn service(&mut self, loader: &ImageLoader) -> Vec<LoadCompletion> {
        let requests = loader.take_requests();
        self.service_requests(loader, &requests)
    }

    fn service_requests(&mut self, loader: &ImageLoader, requests: &[LoadRequest]) -> Vec<LoadCompletion> {
        let mut completions = Vec::with_capacity(requests.len());
        for request in requests {
            let completion = self.process(loader.cache(), request);
            loader.resolve(&completion);
            completions.push(completion);
        }
        completions
    }

    /// Services the requests `interactor` is waiting on, plus any abandoned
    /// ones, delivering every completion back to the interactor.
    ///
    /// Requests queued by other interactors sharing the loader stay queued
    /// for their own pump. Returns the number of completions delivered.
    pub fn pump(&mut self, interactor: &mut Interactor) -> usize {
        let loader = interactor.loader().clone();
        let mut delivered = 0;
        loop {
            let requests = loader.take_requests_for(|ticket| interactor.is_waiting_on(ticket));
            if requests.is_empty() {
                break;
            }
            for completion in self.service_requests(&loader, &requests) {
                interactor.complete_load(&completion);
                delivered += 1;
            }
        }
        tracing::debug!(delivered, left_queued = loader.pending(), "load pump finished");
        delivered
    }

    fn fetch_and_decode(&mut self, location: &str) -> Result<ImageHandle> {
        let bytes = self.fetcher.fetch(location)?;
        ImageHandle::decode(&bytes).map_err(|message| HotspotError::Decode {
            location: location.to_string(),
            message,
        })
    }
}
