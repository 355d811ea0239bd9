//! Field resolution over namespaced raw keys.
//!
//! Given one event's flat payload and a set of target suffixes, finds the
//! best-matching raw key by suffix and namespace priority:
//!
//! 1. `output` keys whose root equals the preferred root (when supplied)
//! 2. any `output` key matching a suffix
//! 3. `input` keys whose root equals the preferred root
//! 4. any `input` key matching a suffix
//!
//! The first non-empty rung wins. Within a rung the shortest key wins,
//! favoring the most direct field over deeply nested variants; length ties
//! keep encounter order. Only scalar values are candidates, and matched
//! values are trimmed of surrounding whitespace.
//!
//! Each event's keys are bucketed once by `(direction, suffix)` so that
//! per-field resolution is a handful of bucket lookups instead of a fresh
//! scan over the whole key set.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::{Direction, RawEvent, is_scalar, key_parts, scalar_to_string};

/// Outcome of one resolution: the matched value and the root it came from.
///
/// Both are `None` when no candidate matched in any rung.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// The matched scalar value, coerced to a string and trimmed.
    pub value: Option<String>,
    /// The root id of the matched key.
    pub root: Option<String>,
}

/// A raw key that matched some suffix, with its tie-break data.
#[derive(Debug)]
struct Candidate<'a> {
    key: &'a str,
    root: &'a str,
    value: &'a Value,
    /// Position in the event's key order, for stable length ties.
    ord: usize,
}

/// Per-event index of suffix-matching keys, bucketed by direction and suffix.
///
/// Built once per event from the universe of suffixes the caller will ask
/// about; [`KeyIndex::resolve`] then only touches the buckets for the
/// requested suffixes.
#[derive(Debug)]
pub struct KeyIndex<'a> {
    buckets: HashMap<(Direction, &'a str), Vec<Candidate<'a>>>,
}

impl<'a> KeyIndex<'a> {
    /// Indexes an event's scalar keys against a suffix universe.
    ///
    /// A key is a candidate for suffix `s` when it ends with `__s` and
    /// starts with a recognized direction. Keys may land in several
    /// buckets when suffixes overlap.
    #[must_use]
    pub fn build(event: &'a RawEvent, suffixes: &[&'a str]) -> Self {
        let patterns: Vec<String> = suffixes.iter().map(|s| format!("__{s}")).collect();
        let mut buckets: HashMap<(Direction, &'a str), Vec<Candidate<'a>>> = HashMap::new();

        for (ord, (key, value)) in event.iter().enumerate() {
            if !is_scalar(value) {
                continue;
            }
            let Some((direction, root)) = key_parts(key) else {
                continue;
            };
            for (i, pattern) in patterns.iter().enumerate() {
                if key.ends_with(pattern.as_str()) {
                    buckets
                        .entry((direction, suffixes[i]))
                        .or_default()
                        .push(Candidate {
                            key,
                            root,
                            value,
                            ord,
                        });
                }
            }
        }

        Self { buckets }
    }

    /// Resolves the best match for any of the given suffixes.
    ///
    /// Walks the priority ladder described in the module docs and stops at
    /// the first rung with a candidate.
    #[must_use]
    pub fn resolve(&self, suffixes: &[&str], preferred_root: Option<&str>) -> Resolution {
        for direction in [Direction::Output, Direction::Input] {
            if let Some(root) = preferred_root
                && let Some(found) = self.best(direction, suffixes, Some(root))
            {
                return found;
            }
            if let Some(found) = self.best(direction, suffixes, None) {
                return found;
            }
        }
        Resolution::default()
    }

    /// Resolves a single suffix through the same ladder.
    #[must_use]
    pub fn resolve_single(&self, suffix: &str, preferred_root: Option<&str>) -> Resolution {
        self.resolve(&[suffix], preferred_root)
    }

    /// Picks the winning candidate within one ladder rung.
    fn best(
        &self,
        direction: Direction,
        suffixes: &[&str],
        root_filter: Option<&str>,
    ) -> Option<Resolution> {
        let mut best: Option<&Candidate<'a>> = None;
        for suffix in suffixes {
            let Some(candidates) = self.buckets.get(&(direction, *suffix)) else {
                continue;
            };
            for candidate in candidates {
                if root_filter.is_some_and(|root| candidate.root != root) {
                    continue;
                }
                let better = best.is_none_or(|current| {
                    (candidate.key.len(), candidate.ord) < (current.key.len(), current.ord)
                });
                if better {
                    best = Some(candidate);
                }
            }
        }
        best.map(|candidate| Resolution {
            value: scalar_to_string(candidate.value).map(|v| v.trim().to_string()),
            root: Some(candidate.root.to_string()),
        })
    }
}
