//! # Eventsift
//!
//! Field resolution and query DSL for namespaced webhook event logs.
//!
//! Eventsift ingests automation event exports shaped as a JSON object keyed
//! by event id, where each event payload is a flat dictionary whose keys
//! encode provenance through a `direction__root__...__suffix` namespacing
//! convention (e.g. `output__305546688__isfire`). It resolves a fixed set of
//! canonical fields out of that namespacing, builds one tabular record per
//! event, and answers ad-hoc questions through a small pipe-delimited query
//! language.
//!
//! ## Features
//!
//! - Deterministic priority resolution over dynamically-named keys
//! - Pure, order-preserving event normalization
//! - Frequency-table catalogs for dataset exploration
//! - A `where | count by | group by | select * | limit | offset` query DSL
//!   with safe-fallback predicate evaluation
//! - A TTL-bounded query cache and an injectable session dataset store
//!
//! ## Example
//!
//! ```rust,ignore
//! use eventsift::{normalize, QueryInterpreter};
//!
//! let raw = eventsift::io::load_dataset_file("events.json")?;
//! let dataset = normalize(&raw);
//! let interpreter = QueryInterpreter::default();
//! let result = interpreter.execute(&dataset, r#"where status == "failed" | count by event_name"#)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::EventsiftConfig;
pub use models::{
    AnalysisReport, Catalog, Dataset, FrequencyTable, NormalizedRecord, QueryMeta, QueryResult,
    RawDataset, RawEvent, Row,
};
pub use services::{
    CatalogBuilder, KeyIndex, QueryCache, QueryInterpreter, Resolution, analyze, normalize,
};
pub use storage::{InMemorySessionStore, SessionId, SessionStore};

/// Error type for eventsift operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed JSON, wrong dataset shape, missing parameters |
/// | `InvalidLimit` | `limit` clause token is not an integer, `all`, or `*` |
/// | `InvalidOffset` | `offset` clause token is not an integer |
/// | `UnknownColumn` | Grouping column absent from the dataset's column set |
/// | `OperationFailed` | Filesystem I/O or serialization failures |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - The loaded document is not a JSON object of event objects
    /// - JSON deserialization fails while loading a dataset
    /// - An analysis parameter is empty
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A `limit` clause carried an unusable token.
    ///
    /// Only non-negative integers and the `all` / `*` sentinels are
    /// accepted. This is a hard failure, never silently ignored.
    #[error("invalid LIMIT value: {token}")]
    InvalidLimit {
        /// The offending token as written in the query.
        token: String,
    },

    /// An `offset` clause carried an unusable token.
    #[error("invalid OFFSET value: {token}")]
    InvalidOffset {
        /// The offending token as written in the query.
        token: String,
    },

    /// A grouping directive named a column the dataset does not have.
    ///
    /// Raised at group construction time so a typo'd column never produces
    /// a silent all-null group.
    #[error("unknown column in group by: {column}")]
    UnknownColumn {
        /// The unknown column name.
        column: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - Filesystem I/O errors occur while loading or saving
    /// - Result serialization to JSON or CSV fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for eventsift operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::InvalidLimit {
            token: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "invalid LIMIT value: abc");

        let err = Error::InvalidOffset {
            token: "-".to_string(),
        };
        assert_eq!(err.to_string(), "invalid OFFSET value: -");

        let err = Error::UnknownColumn {
            column: "missing".to_string(),
        };
        assert_eq!(err.to_string(), "unknown column in group by: missing");

        let err = Error::OperationFailed {
            operation: "read".to_string(),
            cause: "file not found".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'read' failed: file not found");
    }
}
