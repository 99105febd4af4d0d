//! Tracing initialization and subscriber setup.

use super::file_writer::RotatingLog;
use crate::Config;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// # Trace Level Resolution
///
/// 1. `RUST_LOG`, if set
/// 2. `config.trace_level`, if set
/// 3. `"info"`
///
/// Output goes to `config.log_file` (size-rotated) when set, otherwise to
/// stderr.
///
/// Idempotent: only the first call in a process installs a subscriber. Returns
/// whether this call did.
///
/// # Example
///
/// ```rust
/// use hotspot::observability::init_tracing;
/// use hotspot::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) -> bool {
    let level = config.trace_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match &config.log_file {
        Some(path) => {
            let log = Arc::new(RotatingLog::new(crate::infrastructure::expand_tilde(path)));
            registry
                .with(fmt::layer().with_ansi(false).with_writer(log))
                .try_init()
                .is_ok()
        }
        None => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::debug!(level = %level, log_file = ?config.log_file, "tracing initialized");
    }
    installed
}
