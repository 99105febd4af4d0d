//! Hotspot: a pointer-driven state machine engine for interactive on-screen
//! objects.
//!
//! An interactive object is a stack of named regions (boxes with optional
//! images) plus a finite state machine whose transitions fire actions in
//! response to pointer input. Hotspot provides:
//! - Translation of raw pointer input into region-scoped semantic events
//!   through pick-testing and frame-to-frame diffing
//! - Transition lookup and ordered action execution
//! - A de-duplicated, application-scoped image cache with two-phase
//!   asynchronous loading
//! - Upward damage propagation with host-side redraw coalescing
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Host (RedrawScheduler, FrameView, replay binary)   │  ← damage sink, renderer
//! └─────────────────────────────────────────────────────┘
//!                        ▲ damage          │ raw events
//! ┌─────────────────────────────────────────────────────┐
//! │  Interactor (interactor/)                           │  ← pick, diff, dispatch
//! └─────────────────────────────────────────────────────┘
//!                        ▲ damage          │ semantic events
//! ┌─────────────────────────────────────────────────────┐
//! │  Fsm (fsm/)                                         │  ← transitions, actions
//! └─────────────────────────────────────────────────────┘
//!                        ▲ damage          │ mutations
//! ┌─────────────────────────────────────────────────────┐
//! │  Regions (domain/region) ──► ImageLoader ──► Cache  │  ← load requests
//! └─────────────────────────────────────────────────────┘
//!                                          │ requests / completions
//!                              ┌───────────────────────┐
//!                              │ LoadWorker + Fetch    │
//!                              └───────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`domain`]: events, regions, damage, diagnostics, errors
//! - [`cache`]: the location-keyed image cache
//! - [`loader`]: load requests, completions and the worker that services them
//! - [`fsm`]: actions, transition table and the state machine
//! - [`interactor`]: raw-to-semantic event dispatch
//! - [`description`]: the declarative JSON description format
//! - [`host`]: redraw coalescing and frame snapshots
//! - [`infrastructure`]: location resolution
//! - [`observability`]: tracing setup
//!
//! # Example
//!
//! ```rust
//! use hotspot::host::RedrawScheduler;
//! use hotspot::{initialize, Config, ImageLoader, RawEventKind};
//!
//! let config = Config::default();
//! let mut interactor = initialize(&config, ImageLoader::default());
//!
//! let scheduler = RedrawScheduler::new();
//! interactor.set_host(Some(scheduler.handle()));
//!
//! interactor.install_description(hotspot::description::from_json_str(r#"{
//!     "regions": [{"name": "btn", "w": 20, "h": 20}],
//!     "states": [
//!         {"name": "up", "transitions": [
//!             {"event": "press", "region": "btn",
//!              "actions": [{"type": "move_by", "region": "btn", "param": "1,1"}],
//!              "next_state": "down"}
//!         ]},
//!         {"name": "down"}
//!     ]
//! }"#));
//!
//! interactor.dispatch_raw_event(RawEventKind::Press, 5.0, 5.0)?;
//! assert_eq!(interactor.current_state(), Some("down"));
//! assert!(scheduler.take_redraw());
//! # Ok::<(), hotspot::HotspotError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod cache;
pub mod description;
pub mod domain;
pub mod fsm;
pub mod host;
pub mod infrastructure;
pub mod interactor;
pub mod loader;

pub mod observability;

pub use cache::ImageCache;
pub use description::Description;
pub use domain::{
    Behavior, DamageHandle, DamageSink, Diagnostic, DiagnosticKind, Diagnostics, EventType,
    HotspotError, ImageHandle, RawEvent, RawEventKind, Region, Result,
};
pub use fsm::{Fsm, RegionId, StateId};
pub use interactor::{DispatchedEvent, Interactor};
pub use loader::{Fetch, FileFetcher, ImageLoader, LoadWorker};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Engine configuration.
///
/// Built from a key/value map handed over by an embedding host, or from a TOML
/// file for the replay binary.
///
/// # Example
///
/// ```toml
/// trace_level = "debug"
/// log_file = "~/.local/state/hotspot/hotspot.log"
/// image_root = "assets"
/// report_unmatched = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tracing filter directive.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or any `EnvFilter`
    /// directive. Default: `"info"`
    pub trace_level: Option<String>,

    /// Write logs to this file instead of stderr.
    pub log_file: Option<String>,

    /// Directory relative image and description locations resolve against.
    /// Default: `"."`
    pub image_root: String,

    /// Report events that match no transition as diagnostics.
    pub report_unmatched: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trace_level: None,
            log_file: None,
            image_root: ".".to_string(),
            report_unmatched: false,
        }
    }
}

impl Config {
    /// Parses configuration from a string map.
    ///
    /// # Parsing Rules
    ///
    /// - `trace_level`, `log_file`: taken verbatim
    /// - `image_root`: taken verbatim, falls back to `"."` when empty
    /// - `report_unmatched`: `true`/`1`/`yes` (case-insensitive) enable it,
    ///   anything else disables it
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use hotspot::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("image_root".to_string(), "assets".to_string());
    /// map.insert("report_unmatched".to_string(), "yes".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.image_root, "assets");
    /// assert!(config.report_unmatched);
    /// ```
    #[must_use]
    pub fn from_map(config: &BTreeMap<String, String>) -> Self {
        let image_root = config
            .get("image_root")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map_or_else(|| ".".to_string(), String::from);

        let report_unmatched = config.get("report_unmatched").is_some_and(|s| {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        });

        Self {
            trace_level: config.get("trace_level").cloned(),
            log_file: config.get("log_file").cloned(),
            image_root,
            report_unmatched,
        }
    }

    /// Parses configuration from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::Config`] if the TOML is malformed or a value has
    /// the wrong type.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| HotspotError::Config(format!("failed to parse TOML: {e}")))
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::Io`] if the file cannot be read and
    /// [`HotspotError::Config`] if it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// A file fetcher rooted at [`Config::image_root`].
    #[must_use]
    pub fn file_fetcher(&self) -> FileFetcher {
        FileFetcher::new(infrastructure::expand_tilde(&self.image_root))
    }
}

/// Creates an empty interactor configured from `config`.
///
/// The interactor gets a fresh diagnostic channel and shares `loader` (and its
/// cache) with anything else built from the same loader. Install a state
/// machine with [`Interactor::install_description`] or
/// [`Interactor::load_description`].
///
/// Tracing is not initialized here; call
/// [`observability::init_tracing`] once from the binary.
#[must_use]
pub fn initialize(config: &Config, loader: ImageLoader) -> Interactor {
    tracing::debug!(
        image_root = %config.image_root,
        report_unmatched = config.report_unmatched,
        "initializing interactor"
    );

    let mut interactor = Interactor::new(loader, Diagnostics::new());
    interactor.set_report_unmatched(config.report_unmatched);
    interactor
}
