//! Query result types.

use serde::Serialize;
use serde_json::Value;

/// One result row: an ordered field→value mapping.
pub type Row = serde_json::Map<String, Value>;

/// Metadata attached to every query result.
///
/// Fields that do not apply to the executed query are omitted from the
/// serialized form. `limit` distinguishes "not reported" (omitted) from
/// "uncapped" (serialized as `null`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryMeta {
    /// Set to `true` when the query used `count by`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,

    /// `"*"` when the query requested the full projection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,

    /// Grouping columns when the result is aggregated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,

    /// Number of rows actually returned (non-grouped paths).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,

    /// Total matching rows (or groups) before windowing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<usize>,

    /// Effective limit; inner `None` means uncapped and serializes as null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Option<usize>>,

    /// Effective offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,

    /// Human-readable note (e.g. default limit applied, empty dataset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The outcome of one query: ordered rows plus metadata.
///
/// Immutable once produced; running the same query against the same
/// dataset snapshot yields an identical result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    /// The result rows in output order.
    pub rows: Vec<Row>,
    /// Pagination and aggregation metadata.
    pub meta: QueryMeta,
}
