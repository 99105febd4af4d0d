//! Logging setup built on `tracing-subscriber`.
//!
//! The engine itself only emits `tracing` events and spans. Binaries (and tests
//! that want output) call [`init_tracing`] once at startup.
//!
//! # Configuration
//!
//! Trace level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` config option
//! 3. Default: `"info"`
//!
//! # Modules
//!
//! - `init`: subscriber setup
//! - `file_writer`: size-rotated log file

mod file_writer;
mod init;

pub use file_writer::RotatingLog;
pub use init::init_tracing;
