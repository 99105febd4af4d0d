//! Host-facing pieces: damage coalescing and frame snapshots.

pub mod redraw;
pub mod view;

pub use redraw::RedrawScheduler;
pub use view::{FrameView, RegionView};
