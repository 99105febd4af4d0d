#![allow(dead_code)]

use hotspot::host::RedrawScheduler;
use hotspot::{description, Diagnostics, Fetch, HotspotError, ImageCache, ImageLoader, Interactor};
use image::{ImageFormat, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::rc::Rc;

/// Encodes a blank PNG of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// In-memory fetcher that records every location it is asked for.
#[derive(Debug, Default)]
pub struct CountingFetcher {
    payloads: HashMap<String, Vec<u8>>,
    pub calls: Vec<String>,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: &str, payload: Vec<u8>) -> Self {
        self.payloads.insert(location.to_string(), payload);
        self
    }

    pub fn calls_for(&self, location: &str) -> usize {
        self.calls.iter().filter(|c| *c == location).count()
    }
}

impl Fetch for CountingFetcher {
    fn fetch(&mut self, location: &str) -> hotspot::Result<Vec<u8>> {
        self.calls.push(location.to_string());
        self.payloads.get(location).cloned().ok_or_else(|| HotspotError::Fetch {
            location: location.to_string(),
            message: "not found".to_string(),
        })
    }
}

/// An interactor built from `json`, wired to a fresh redraw scheduler.
pub struct Harness {
    pub interactor: Interactor,
    pub scheduler: Rc<RedrawScheduler>,
}

impl Harness {
    pub fn new(json: &str) -> Self {
        Self::with_loader(json, ImageLoader::new(ImageCache::new()))
    }

    pub fn with_loader(json: &str, loader: ImageLoader) -> Self {
        let mut interactor = Interactor::new(loader, Diagnostics::new());
        assert!(
            interactor.install_description(description::from_json_str(json)),
            "description should install: {:?}",
            interactor.failure()
        );
        let scheduler = RedrawScheduler::new();
        interactor.set_host(Some(scheduler.handle()));
        scheduler.take_redraw();
        Self { interactor, scheduler }
    }

    pub fn region_names(&self, ids: impl IntoIterator<Item = Option<hotspot::RegionId>>) -> Vec<String> {
        let fsm = self.interactor.fsm().unwrap();
        ids.into_iter()
            .map(|id| id.and_then(|id| fsm.region(id)).map_or("<none>".to_string(), |r| r.name().to_string()))
            .collect()
    }
}
