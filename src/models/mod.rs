//! Data models for eventsift.
//!
//! Raw events, normalized records, catalogs, query results, and the
//! scalar-value helpers shared across services.

mod analysis;
mod catalog;
mod event;
mod query;
mod record;
mod value;

pub use analysis::{AnalysisReport, MatchedField};
pub use catalog::{Catalog, FrequencyTable};
pub use event::{Direction, RawDataset, RawEvent, key_parts};
pub use query::{QueryMeta, QueryResult, Row};
pub use record::{CANONICAL_COLUMNS, Dataset, NormalizedRecord};
pub use value::{bool_like, is_scalar, scalar_to_string};
