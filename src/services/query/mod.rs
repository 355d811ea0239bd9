//! Query DSL interpretation.
//!
//! Executes pipe-delimited queries against a normalized dataset. Execution
//! order is filter → group/aggregate → pagination; when grouping is
//! requested the window applies to distinct groups, not raw rows.

mod clauses;
mod predicate;

pub use clauses::QueryPlan;
pub use predicate::CompiledPredicate;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::EventsiftConfig;
use crate::models::{
    CANONICAL_COLUMNS, Dataset, NormalizedRecord, QueryMeta, QueryResult, Row, scalar_to_string,
};
use crate::{Error, Result};

/// Executes DSL queries against in-memory datasets.
///
/// Stateless apart from configuration; calls are independently reentrant
/// and safe to run in parallel on immutable dataset snapshots.
#[derive(Debug, Clone)]
pub struct QueryInterpreter {
    /// Safety cap for queries with no explicit window or full projection.
    default_limit: usize,
}

impl QueryInterpreter {
    /// Creates an interpreter from configuration.
    #[must_use]
    pub const fn new(config: &EventsiftConfig) -> Self {
        Self {
            default_limit: config.default_query_limit,
        }
    }

    /// Executes one query and returns rows plus metadata.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed `limit` / `offset` tokens and for
    /// grouping columns the dataset does not have. Unparseable predicates
    /// are not errors; they degrade as described in [`predicate`].
    #[instrument(skip(self, dataset), fields(records = dataset.len()))]
    pub fn execute(&self, dataset: &Dataset, dsl: &str) -> Result<QueryResult> {
        if dataset.is_empty() {
            return Ok(QueryResult {
                rows: Vec::new(),
                meta: QueryMeta {
                    note: Some("no data".to_string()),
                    ..QueryMeta::default()
                },
            });
        }

        let plan = clauses::parse(dsl)?;
        let mut notes: Vec<String> = Vec::new();

        let filtered: Vec<&NormalizedRecord> = match &plan.filter {
            Some(text) => {
                let compiled = CompiledPredicate::compile(text, dataset);
                if compiled.is_pass_all() {
                    debug!(predicate = %text, "predicate not usable, filter skipped");
                    notes.push("filter skipped: predicate not parseable".to_string());
                }
                dataset
                    .records()
                    .iter()
                    .filter(|record| compiled.matches(record))
                    .collect()
            }
            None => dataset.records().iter().collect(),
        };

        if let Some(group_by) = &plan.group_by {
            return group_rows(dataset, &filtered, group_by, &plan, notes);
        }
        Ok(self.project_rows(&filtered, &plan, notes))
    }

    /// The non-grouped path: projection plus windowing policy.
    fn project_rows(
        &self,
        filtered: &[&NormalizedRecord],
        plan: &QueryPlan,
        mut notes: Vec<String>,
    ) -> QueryResult {
        let total_rows = filtered.len();

        if plan.select_all {
            let out: Vec<Row> = window(filtered, plan)
                .iter()
                .map(|record| record.fields().clone())
                .collect();
            return QueryResult {
                meta: QueryMeta {
                    select: Some("*".to_string()),
                    rows: Some(out.len()),
                    total_rows: Some(total_rows),
                    limit: Some(plan.limit.flatten()),
                    offset: Some(plan.offset),
                    note: join_notes(notes),
                    ..QueryMeta::default()
                },
                rows: out,
            };
        }

        // Without the full projection, rows carry the canonical subset.
        if plan.unwindowed() {
            notes.push("default limit applied".to_string());
            let out: Vec<Row> = filtered
                .iter()
                .take(self.default_limit)
                .map(|record| canonical_row(record))
                .collect();
            return QueryResult {
                meta: QueryMeta {
                    rows: Some(out.len()),
                    total_rows: Some(total_rows),
                    limit: Some(Some(self.default_limit)),
                    offset: Some(0),
                    note: join_notes(notes),
                    ..QueryMeta::default()
                },
                rows: out,
            };
        }

        let out: Vec<Row> = window(filtered, plan)
            .iter()
            .map(|record| canonical_row(record))
            .collect();
        QueryResult {
            meta: QueryMeta {
                rows: Some(out.len()),
                total_rows: Some(total_rows),
                limit: Some(plan.limit.flatten()),
                offset: Some(plan.offset),
                note: join_notes(notes),
                ..QueryMeta::default()
            },
            rows: out,
        }
    }
}

impl Default for QueryInterpreter {
    fn default() -> Self {
        Self::new(&EventsiftConfig::default())
    }
}

/// The grouped path: one row per distinct key tuple plus a count.
///
/// Records missing a grouping column land in a null-keyed group instead of
/// being dropped; group order is discovery order.
fn group_rows(
    dataset: &Dataset,
    filtered: &[&NormalizedRecord],
    group_by: &[String],
    plan: &QueryPlan,
    notes: Vec<String>,
) -> Result<QueryResult> {
    for column in group_by {
        if !dataset.has_column(column) {
            return Err(Error::UnknownColumn {
                column: column.clone(),
            });
        }
    }

    let mut groups: IndexMap<Vec<Option<String>>, u64> = IndexMap::new();
    for record in filtered {
        let key: Vec<Option<String>> = group_by
            .iter()
            .map(|column| record.get(column).and_then(scalar_to_string))
            .collect();
        *groups.entry(key).or_insert(0) += 1;
    }

    let total_rows = groups.len();
    let rows: Vec<Row> = groups
        .iter()
        .map(|(key, count)| {
            let mut row = Row::new();
            for (column, value) in group_by.iter().zip(key) {
                row.insert(
                    column.clone(),
                    value.clone().map_or(Value::Null, Value::String),
                );
            }
            row.insert("count".to_string(), Value::from(*count));
            row
        })
        .collect();

    let windowed = if plan.unwindowed() {
        rows
    } else {
        window_rows(rows, plan)
    };

    Ok(QueryResult {
        meta: QueryMeta {
            count: plan.want_count.then_some(true),
            group_by: Some(group_by.to_vec()),
            total_rows: Some(total_rows),
            limit: Some(plan.limit.flatten()),
            offset: Some(plan.offset),
            note: join_notes(notes),
            ..QueryMeta::default()
        },
        rows: windowed,
    })
}

/// Applies the plan's offset and limit to a record slice.
fn window<'a>(records: &[&'a NormalizedRecord], plan: &QueryPlan) -> Vec<&'a NormalizedRecord> {
    let start = plan.offset.min(records.len());
    let rest = &records[start..];
    match plan.limit.flatten() {
        Some(limit) => rest.iter().take(limit).copied().collect(),
        None => rest.to_vec(),
    }
}

/// Applies the plan's offset and limit to already-built rows.
fn window_rows(rows: Vec<Row>, plan: &QueryPlan) -> Vec<Row> {
    let start = plan.offset.min(rows.len());
    let iter = rows.into_iter().skip(start);
    match plan.limit.flatten() {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

/// Projects a record down to its canonical columns.
fn canonical_row(record: &NormalizedRecord) -> Row {
    let mut row = Row::new();
    for column in CANONICAL_COLUMNS {
        let value = record.get(column).cloned().unwrap_or(Value::Null);
        row.insert(column.to_string(), value);
    }
    row
}

/// Collapses accumulated notes into the single metadata field.
fn join_notes(notes: Vec<String>) -> Option<String> {
    if notes.is_empty() {
        None
    } else {
        Some(notes.join("; "))
    }
}
