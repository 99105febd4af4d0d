//! Read-only snapshot of what a renderer needs to draw one frame.
//!
//! Views are computed on demand from an [`Interactor`](crate::Interactor); they
//! hold cheap clones of image handles and never feed back into the engine.

use crate::domain::{ImageHandle, Region};
use std::fmt;

/// One region, positioned in host coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionView {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub image_location: String,
    /// `false` while an image load is outstanding.
    pub loaded: bool,
    pub load_error: bool,
    pub image: Option<ImageHandle>,
}

impl RegionView {
    fn capture(region: &Region, offset: (f64, f64)) -> Self {
        Self {
            name: region.name().to_string(),
            x: offset.0 + region.x(),
            y: offset.1 + region.y(),
            w: region.w(),
            h: region.h(),
            image_location: region.image_location().to_string(),
            loaded: region.loaded(),
            load_error: region.load_error(),
            image: region.image().cloned(),
        }
    }
}

/// Everything needed to draw an interactor, in draw order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameView {
    /// Interactor position in host coordinates.
    pub origin: (f64, f64),
    /// Current state, `None` when no state machine is installed.
    pub state: Option<String>,
    /// Regions bottom to top.
    pub regions: Vec<RegionView>,
}

impl FrameView {
    /// Captures a view of `regions` drawn at `origin`.
    #[must_use]
    pub fn capture(origin: (f64, f64), state: Option<&str>, regions: &[Region]) -> Self {
        Self {
            origin,
            state: state.map(str::to_string),
            regions: regions.iter().map(|r| RegionView::capture(r, origin)).collect(),
        }
    }

    /// Region view by name.
    #[must_use]
    pub fn region(&self, name: &str) -> Option<&RegionView> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Whether any region is still waiting for its image.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.regions.iter().any(|r| !r.loaded)
    }
}

impl fmt::Display for FrameView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "frame at ({}, {}) state={}",
            self.origin.0,
            self.origin.1,
            self.state.as_deref().unwrap_or("<none>")
        )?;
        for r in &self.regions {
            let status = match (r.loaded, r.load_error) {
                (false, _) => "loading",
                (true, true) => "failed",
                (true, false) if r.image.is_some() => "ready",
                (true, false) => "empty",
            };
            writeln!(
                f,
                "  {} [{}, {} {}x{}] {} {}",
                r.name,
                r.x,
                r.y,
                r.w,
                r.h,
                if r.image_location.is_empty() { "-" } else { &r.image_location },
                status
            )?;
        }
        Ok(())
    }
}
