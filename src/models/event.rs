//! Raw event types and key-namespace parsing.
//!
//! Raw keys follow the pattern `<direction>__<root>__[<segment>__]*<suffix>`
//! where `direction` is `input` or `output`, `root` identifies the upstream
//! automation step the field is attached to, and `suffix` names the semantic
//! field.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provenance direction of a raw key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The field was received by the automation step.
    Input,
    /// The field was produced by the automation step.
    Output,
}

impl Direction {
    /// Returns the direction as it appears in raw keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Splits a raw key into its direction and root segment.
///
/// Returns `None` for keys that do not start with `input__` or `output__`;
/// such keys never participate in field resolution. The root is the second
/// `__`-delimited segment, whatever it contains.
#[must_use]
pub fn key_parts(key: &str) -> Option<(Direction, &str)> {
    let (direction, rest) = if let Some(rest) = key.strip_prefix("output__") {
        (Direction::Output, rest)
    } else if let Some(rest) = key.strip_prefix("input__") {
        (Direction::Input, rest)
    } else {
        return None;
    };
    let root = rest.split("__").next().unwrap_or(rest);
    Some((direction, root))
}

/// One event's flat key/value payload.
///
/// Key order is the order of appearance in the source document; resolution
/// tie-breaks and dynamic-column discovery both depend on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent {
    /// Raw keys mapped to their values. Values may be scalars or nested
    /// lists/objects; nested values are excluded from scalar resolution.
    pub fields: serde_json::Map<String, Value>,
}

impl RawEvent {
    /// Looks up a raw key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Iterates raw keys and values in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

/// A raw dataset: event ids mapped to their payloads, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDataset {
    /// Events keyed by event id.
    pub events: IndexMap<String, RawEvent>,
}

impl RawDataset {
    /// Returns the number of events in the dataset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the dataset has no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Looks up an event by id.
    #[must_use]
    pub fn get(&self, event_id: &str) -> Option<&RawEvent> {
        self.events.get(event_id)
    }

    /// Iterates events in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawEvent)> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parts_output() {
        let (direction, root) = key_parts("output__305546688__isfire").unwrap();
        assert_eq!(direction, Direction::Output);
        assert_eq!(root, "305546688");
    }

    #[test]
    fn test_key_parts_input_deep() {
        let (direction, root) = key_parts("input__42__lead__contact__name").unwrap();
        assert_eq!(direction, Direction::Input);
        assert_eq!(root, "42");
    }

    #[test]
    fn test_key_parts_no_direction() {
        assert!(key_parts("status").is_none());
        assert!(key_parts("custom_field_1").is_none());
        // Prefix must match exactly, including the delimiter.
        assert!(key_parts("outputs__1__x").is_none());
    }

    #[test]
    fn test_key_parts_short_key() {
        // A key with no segment after the direction still yields a root.
        let (direction, root) = key_parts("output__isfire").unwrap();
        assert_eq!(direction, Direction::Output);
        assert_eq!(root, "isfire");
    }

    #[test]
    fn test_raw_dataset_preserves_order() {
        let raw: RawDataset = serde_json::from_str(
            r#"{"b": {"z": 1, "a": 2}, "a": {"k": 3}}"#,
        )
        .unwrap();
        let ids: Vec<&String> = raw.events.keys().collect();
        assert_eq!(ids, ["b", "a"]);
        let keys: Vec<&String> = raw.events["b"].fields.keys().collect();
        assert_eq!(keys, ["z", "a"]);
    }
}
