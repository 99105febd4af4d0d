//! Location-to-path resolution for the local file fetcher.
//!
//! Image and description locations are opaque strings. The file fetcher
//! understands three spellings: `file://` URLs, absolute paths, and paths
//! relative to a configured root directory. A leading `~` expands to `$HOME`.

use std::path::{Path, PathBuf};

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a tilde, or environments without `HOME`, are returned as-is.
///
/// # Examples
///
/// ```
/// use hotspot::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/absolute/path"), "/absolute/path");
/// assert_eq!(expand_tilde("relative/path"), "relative/path");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    let Some(home) = std::env::var_os("HOME") else {
        return path.to_string();
    };
    let home = home.to_string_lossy();
    if let Some(rest) = path.strip_prefix("~/") {
        format!("{home}/{rest}")
    } else if path == "~" {
        home.into_owned()
    } else {
        path.to_string()
    }
}

/// Resolves a location string to a filesystem path under `root`.
///
/// - `file://` prefixes are stripped
/// - `~` is expanded
/// - absolute paths are kept
/// - everything else is joined onto `root`
///
/// # Examples
///
/// ```
/// use hotspot::infrastructure::resolve_location;
/// use std::path::{Path, PathBuf};
///
/// let root = Path::new("/srv/images");
/// assert_eq!(resolve_location(root, "./btn.png"), PathBuf::from("/srv/images/./btn.png"));
/// assert_eq!(resolve_location(root, "file:///tmp/a.png"), PathBuf::from("/tmp/a.png"));
/// assert_eq!(resolve_location(root, "/etc/b.png"), PathBuf::from("/etc/b.png"));
/// ```
#[must_use]
pub fn resolve_location(root: &Path, location: &str) -> PathBuf {
    let location = location.strip_prefix("file://").unwrap_or(location);
    let expanded = PathBuf::from(expand_tilde(location));
    if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    }
}
