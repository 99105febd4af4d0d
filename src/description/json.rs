//! JSON loading for state machine descriptions.
//!
//! Parsing only checks shape. Call [`Description::validate`] (or build an
//! [`Fsm`](crate::Fsm), which validates) to check the structural invariants.

use crate::description::Description;
use crate::domain::error::{HotspotError, Result};
use std::path::Path;
use std::str::FromStr;

/// Parses a description from a JSON string.
///
/// # Errors
///
/// Returns [`HotspotError::Description`] if the JSON is malformed or does not
/// match the description format.
///
/// # Examples
///
/// ```
/// let description = hotspot::description::from_json_str(
///     r#"{"states": [{"name": "idle"}]}"#,
/// )?;
/// assert_eq!(description.initial_state_id().as_str(), "idle");
/// # Ok::<(), hotspot::HotspotError>(())
/// ```
pub fn from_json_str(json: &str) -> Result<Description> {
    let description: Description = serde_json::from_str(json)
        .map_err(|e| HotspotError::Description(format!("failed to parse JSON: {e}")))?;

    tracing::debug!(
        regions = description.regions.len(),
        states = description.states.len(),
        "parsed description"
    );

    Ok(description)
}

/// Parses a description from fetched bytes.
///
/// # Errors
///
/// Returns [`HotspotError::Description`] for invalid UTF-8 or invalid JSON.
pub fn from_bytes(bytes: &[u8]) -> Result<Description> {
    let json = std::str::from_utf8(bytes)
        .map_err(|e| HotspotError::Description(format!("description is not UTF-8: {e}")))?;
    from_json_str(json)
}

/// Reads and parses a description file.
///
/// # Errors
///
/// Returns [`HotspotError::Io`] if the file cannot be read and
/// [`HotspotError::Description`] if it does not parse.
pub fn from_file(path: impl AsRef<Path>) -> Result<Description> {
    let path = path.as_ref();
    tracing::debug!(path = ?path, "loading description file");
    let contents = std::fs::read_to_string(path)?;
    from_json_str(&contents)
}

/// Serializes a description as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`HotspotError::Description`] if serialization fails.
pub fn to_json_string(description: &Description) -> Result<String> {
    serde_json::to_string_pretty(description)
        .map_err(|e| HotspotError::Description(format!("failed to serialize JSON: {e}")))
}

impl FromStr for Description {
    type Err = HotspotError;

    fn from_str(s: &str) -> Result<Self> {
        from_json_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BUTTON: &str = r#"{
        "initial_state": "up",
        "regions": [{"name": "btn", "w": 10, "h": 10, "image_location": "up.png"}],
        "states": [
            {"name": "up", "transitions": [
                {"event": "press", "region": "btn",
                 "actions": [{"type": "set_image", "region": "btn", "param": "down.png"}],
                 "next_state": "down"}
            ]},
            {"name": "down"}
        ]
    }"#;

    #[test]
    fn parses_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUTTON.as_bytes()).unwrap();

        let description = from_file(file.path()).unwrap();
        assert_eq!(description.regions[0].name, "btn");
        assert_eq!(description.states.len(), 2);
        description.validate().unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, HotspotError::Io(_)));
    }

    #[test]
    fn malformed_json_is_description_error() {
        assert!(matches!(from_json_str("{"), Err(HotspotError::Description(_))));
        assert!(matches!(from_bytes(&[0xff, 0xfe]), Err(HotspotError::Description(_))));
        assert!(matches!(
            from_json_str(r#"{"states": [{"name": "s", "transitions": [{"event": "hover", "next_state": "s"}]}]}"#),
            Err(HotspotError::Description(_))
        ));
    }

    #[test]
    fn serialized_form_parses_back() {
        let description: Description = BUTTON.parse().unwrap();
        let json = to_json_string(&description).unwrap();
        assert_eq!(from_json_str(&json).unwrap(), description);
    }
}
