//! Pipe-delimited clause parsing for the query DSL.
//!
//! A query is a sequence of clauses separated by `|`:
//!
//! ```text
//! where event_name == "Schedule" and isfire == true | count by status | limit 10
//! ```
//!
//! Clause keywords are case-insensitive. Unrecognized clauses are ignored;
//! malformed `limit` / `offset` tokens are hard errors.

use crate::{Error, Result};

/// The parsed shape of one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    /// Raw predicate text from the `where` clause.
    pub filter: Option<String>,
    /// Grouping columns from `count by` / `group by`.
    pub group_by: Option<Vec<String>>,
    /// True when grouping came from `count by`.
    pub want_count: bool,
    /// True when the query requested the full projection.
    pub select_all: bool,
    /// Row cap. Outer `None` means no `limit` clause was given; a
    /// `Some(None)` records an explicit `limit all` / `limit *`.
    pub limit: Option<Option<usize>>,
    /// Rows to skip before applying the limit.
    pub offset: usize,
}

impl QueryPlan {
    /// True when neither an explicit limit nor an offset was given.
    #[must_use]
    pub const fn unwindowed(&self) -> bool {
        self.limit.is_none() && self.offset == 0
    }
}

/// Parses a DSL string into a [`QueryPlan`].
///
/// # Errors
///
/// Returns [`Error::InvalidLimit`] or [`Error::InvalidOffset`] when a
/// pagination token is not a non-negative integer or recognized sentinel.
pub fn parse(dsl: &str) -> Result<QueryPlan> {
    let mut plan = QueryPlan::default();

    for part in dsl.split('|').map(str::trim) {
        let low = part.to_lowercase();
        if low.starts_with("where ") {
            plan.filter = Some(part[6..].trim().to_string());
        } else if low.starts_with("count by ") {
            plan.want_count = true;
            plan.group_by = Some(split_columns(&part[9..]));
        } else if low.starts_with("group by ") {
            plan.group_by = Some(split_columns(&part[9..]));
        } else if low.starts_with("select *") {
            plan.select_all = true;
        } else if low.starts_with("limit ") {
            let token = part[6..].trim();
            if matches!(token.to_lowercase().as_str(), "all" | "*") {
                plan.limit = Some(None);
            } else {
                plan.limit = Some(Some(parse_count(token).ok_or_else(|| {
                    Error::InvalidLimit {
                        token: token.to_string(),
                    }
                })?));
            }
        } else if low.starts_with("offset ") {
            let token = part[7..].trim();
            plan.offset = parse_count(token).ok_or_else(|| Error::InvalidOffset {
                token: token.to_string(),
            })?;
        }
    }

    Ok(plan)
}

/// Splits a comma-separated column list, trimming each name.
fn split_columns(text: &str) -> Vec<String> {
    text.split(',').map(|c| c.trim().to_string()).collect()
}

/// Parses an integer token, clamping negatives to zero.
fn parse_count(token: &str) -> Option<usize> {
    let n: i64 = token.parse().ok()?;
    Some(usize::try_from(n.max(0)).unwrap_or(0))
}
