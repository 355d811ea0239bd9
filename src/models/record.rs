//! Normalized records and datasets.

use serde::Serialize;
use serde_json::Value;

use super::value::scalar_to_string;

/// Canonical fields every normalized record exposes, in column order.
///
/// Canonical values are nullable strings; a null means no raw key matched
/// during resolution.
pub const CANONICAL_COLUMNS: [&str; 24] = [
    "event_id",
    "input_event_id",
    "date",
    "status",
    "object_id",
    "object_title",
    "email",
    "event_url",
    "zap_url",
    "updated_by_name",
    "fbc",
    "fbp",
    "ip_address",
    "landing_url",
    "user_agent",
    "utm_campaign",
    "utm_content",
    "utm_medium",
    "utm_source",
    "contact_name",
    "contact_phone",
    "contact_phone_country",
    "event_name",
    "isfire",
];

/// One normalized event: the fixed canonical fields plus every other raw
/// key passed through verbatim as a dynamic column.
///
/// Field order is canonical columns first, then dynamic columns in source
/// order. Normalization is a pure function of the raw event, so the same
/// event always produces an identical record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedRecord {
    fields: serde_json::Map<String, Value>,
}

impl NormalizedRecord {
    /// Wraps an already-ordered field map.
    #[must_use]
    pub const fn new(fields: serde_json::Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Looks up a field value.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Returns the field's scalar value rendered as a string.
    ///
    /// Null, missing, and nested values all come back as `None`.
    #[must_use]
    pub fn scalar(&self, column: &str) -> Option<String> {
        self.fields.get(column).and_then(scalar_to_string)
    }

    /// Returns the full ordered field map.
    #[must_use]
    pub const fn fields(&self) -> &serde_json::Map<String, Value> {
        &self.fields
    }

    /// Iterates fields in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

/// An ordered collection of normalized records with its discovered schema.
///
/// Record order follows the raw dataset's document order; pagination
/// depends on it staying stable. The column set is the canonical columns
/// followed by dynamic columns in first-encounter order, and may differ
/// between datasets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<NormalizedRecord>,
    columns: Vec<String>,
}

impl Dataset {
    /// Builds a dataset from normalized records and their column union.
    #[must_use]
    pub const fn new(records: Vec<NormalizedRecord>, columns: Vec<String>) -> Self {
        Self { records, columns }
    }

    /// Returns the records in document order.
    #[must_use]
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    /// Returns the discovered column set, canonical columns first.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns true if the dataset knows the given column.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
