//! Catalog building: frequency tables over interesting columns.

use indexmap::IndexMap;
use tracing::instrument;

use crate::config::EventsiftConfig;
use crate::models::{Catalog, Dataset, FrequencyTable, scalar_to_string};

/// Columns summarized in every catalog, when the dataset has them.
///
/// The root-level variants appear in datasets whose exports carry them;
/// they get tables too rather than being silently skipped.
const INTERESTING_COLUMNS: [&str; 5] = [
    "status",
    "event_name",
    "isfire",
    "event_name_root",
    "isfire_root",
];

/// Builds read-only dataset summaries for exploratory browsing.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    /// Cap on distinct `event_name` values, to bound catalog size.
    event_name_cap: usize,
}

impl CatalogBuilder {
    /// Creates a builder from configuration.
    #[must_use]
    pub const fn new(config: &EventsiftConfig) -> Self {
        Self {
            event_name_cap: config.catalog_event_name_cap,
        }
    }

    /// Builds a catalog for the dataset.
    ///
    /// Each interesting column present in the dataset gets a value→count
    /// table ordered by descending count with stable ties; missing values
    /// count under an explicit null bucket. Only `event_name` is capped.
    #[must_use]
    #[instrument(skip_all, fields(records = dataset.len()))]
    pub fn build(&self, dataset: &Dataset) -> Catalog {
        let mut events_counts = IndexMap::new();

        for column in INTERESTING_COLUMNS {
            if !dataset.has_column(column) {
                continue;
            }
            let cap = (column == "event_name").then_some(self.event_name_cap);
            events_counts.insert(format!("by_{column}"), frequency(dataset, column, cap));
        }

        Catalog {
            columns: dataset.columns().to_vec(),
            events_counts,
        }
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new(&EventsiftConfig::default())
    }
}

/// Counts column values across all records.
fn frequency(dataset: &Dataset, column: &str, cap: Option<usize>) -> FrequencyTable {
    let mut counts: IndexMap<Option<String>, u64> = IndexMap::new();
    for record in dataset.records() {
        let value = record.get(column).and_then(scalar_to_string);
        *counts.entry(value).or_insert(0) += 1;
    }

    // Sort by count only; labels never get compared, so null buckets
    // cannot collide with string ordering. Stable sort keeps encounter
    // order for ties.
    let mut entries: Vec<(Option<String>, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    if let Some(cap) = cap {
        entries.truncate(cap);
    }
    FrequencyTable::new(entries)
}
