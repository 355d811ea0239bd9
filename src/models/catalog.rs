//! Dataset catalogs: column lists and value frequency tables.

use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::SerializeMap;

/// A value→count frequency table ordered by descending count.
///
/// Missing values are counted under an explicit null bucket instead of
/// being dropped. Ties keep first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(Option<String>, u64)>,
}

impl FrequencyTable {
    /// Builds a table from already-ordered entries.
    #[must_use]
    pub const fn new(entries: Vec<(Option<String>, u64)>) -> Self {
        Self { entries }
    }

    /// Returns the ordered `(value, count)` entries.
    #[must_use]
    pub fn entries(&self) -> &[(Option<String>, u64)] {
        &self.entries
    }

    /// Returns the count for a value, zero if absent.
    #[must_use]
    pub fn count(&self, value: Option<&str>) -> u64 {
        self.entries
            .iter()
            .find(|(v, _)| v.as_deref() == value)
            .map_or(0, |(_, c)| *c)
    }

    /// Returns the number of distinct values, the null bucket included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FrequencyTable {
    // The null bucket serializes under the JSON key "null"; object keys
    // must be strings.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (value, count) in &self.entries {
            map.serialize_entry(value.as_deref().unwrap_or("null"), count)?;
        }
        map.end()
    }
}

/// Read-only summary of a dataset for exploratory browsing.
///
/// Serializes as `{"columns": [...], "events_counts": {"by_<col>": {...}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    /// The dataset's discovered column set.
    pub columns: Vec<String>,
    /// Frequency tables keyed by `by_<column>`.
    pub events_counts: IndexMap<String, FrequencyTable>,
}
