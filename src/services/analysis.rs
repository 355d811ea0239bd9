//! Target analysis: classifying events by filter parameter and root id.
//!
//! Answers "how many events carry `<param>` for automation step `<root>`",
//! the question the original command-line workflow was built around. Each
//! event is probed against a fixed candidate-key list for the root first,
//! then a prefix/suffix scan over all keys, then the known
//! `filter_criteria` nested shape.

use regex::Regex;
use serde_json::Value;
use tracing::instrument;

use crate::models::{AnalysisReport, MatchedField, RawDataset, RawEvent};
use crate::{Error, Result};

/// Classifies every event in the dataset as target or failed.
///
/// An event is a target when it carries a non-null, non-empty value for
/// the filter parameter under the given root. Null and empty-string
/// values never count as matches.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when either parameter is empty.
#[instrument(skip(raw), fields(events = raw.len()))]
pub fn analyze(raw: &RawDataset, filter_param: &str, root_id: &str) -> Result<AnalysisReport> {
    if filter_param.trim().is_empty() || root_id.trim().is_empty() {
        return Err(Error::InvalidInput(
            "filter parameter and root id must be non-empty".to_string(),
        ));
    }

    let probe = Probe::new(filter_param, root_id)?;

    let mut target_event_ids = Vec::new();
    let mut failed_event_ids = Vec::new();

    for (event_id, event) in raw.iter() {
        if probe.matched_field(event).is_some() {
            target_event_ids.push(event_id.clone());
        } else {
            failed_event_ids.push(event_id.clone());
        }
    }

    let total_events = raw.len();
    let target_events = target_event_ids.len();
    let success_rate = if total_events == 0 {
        0.0
    } else {
        round2(target_events as f64 / total_events as f64 * 100.0)
    };

    Ok(AnalysisReport {
        total_events,
        target_events,
        success_rate,
        target_event_ids,
        failed_event_ids,
    })
}

/// A compiled probe for one `(filter_param, root_id)` pair.
struct Probe {
    filter_param: String,
    candidates: Vec<String>,
    prefix: Regex,
    suffix: Regex,
}

impl Probe {
    fn new(filter_param: &str, root_id: &str) -> Result<Self> {
        let candidates = vec![
            format!("output__{root_id}__querystring___{filter_param}"),
            format!("output__{root_id}__meta__{filter_param}"),
            format!("output__{root_id}__meta__handl__{filter_param}"),
            format!("output__{root_id}__{filter_param}"),
            format!("input__{root_id}__data__{filter_param}"),
        ];
        let prefix = Regex::new(&format!(
            "^(?:input|output)__{}__",
            regex::escape(root_id)
        ))
        .map_err(|e| Error::InvalidInput(format!("unusable root id: {e}")))?;
        let suffix = Regex::new(&format!("__{}$", regex::escape(filter_param)))
            .map_err(|e| Error::InvalidInput(format!("unusable filter parameter: {e}")))?;
        Ok(Self {
            filter_param: filter_param.to_string(),
            candidates,
            prefix,
            suffix,
        })
    }

    /// Finds the raw key satisfying the probe, if any.
    fn matched_field(&self, event: &RawEvent) -> Option<MatchedField> {
        // 1) Exact candidate keys for the root.
        for key in &self.candidates {
            if let Some(value) = event.get(key)
                && usable(value)
            {
                return Some(MatchedField {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }

        // 2) Any key for the root that ends with the parameter.
        for (key, value) in event.iter() {
            if usable(value) && self.prefix.is_match(key) && self.suffix.is_match(key) {
                return Some(MatchedField {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }

        // 3) The filter_criteria nested shape: a list of {key, value}
        //    objects under the same root.
        for (key, value) in event.iter() {
            let Value::Array(entries) = value else {
                continue;
            };
            if !self.prefix.is_match(key) {
                continue;
            }
            for entry in entries {
                let Value::Object(pair) = entry else {
                    continue;
                };
                if pair.get("key").and_then(Value::as_str) == Some(self.filter_param.as_str())
                    && pair.get("value").is_some_and(usable)
                {
                    return Some(MatchedField {
                        key: key.clone(),
                        value: entry.clone(),
                    });
                }
            }
        }

        None
    }
}

/// True for values that count as a match: not null, not empty string.
fn usable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Rounds to two decimal places.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawDataset {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_candidate_key_match() {
        let data = raw(r#"{
            "e1": {"output__305__querystring___fbc": "fb.1.123"},
            "e2": {"output__305__other": "x"}
        }"#);
        let report = analyze(&data, "fbc", "305").unwrap();
        assert_eq!(report.total_events, 2);
        assert_eq!(report.target_events, 1);
        assert_eq!(report.target_event_ids, ["e1"]);
        assert_eq!(report.failed_event_ids, ["e2"]);
        assert_eq!(report.success_rate, 50.0);
    }

    #[test]
    fn test_scan_fallback_match() {
        let data = raw(r#"{
            "e1": {"output__305__deep__nested__fbc": "fb.1.123"}
        }"#);
        let report = analyze(&data, "fbc", "305").unwrap();
        assert_eq!(report.target_events, 1);
    }

    #[test]
    fn test_wrong_root_never_matches() {
        let data = raw(r#"{
            "e1": {"output__999__querystring___fbc": "fb.1.123"}
        }"#);
        let report = analyze(&data, "fbc", "305").unwrap();
        assert_eq!(report.target_events, 0);
        assert_eq!(report.failed_event_ids, ["e1"]);
    }

    #[test]
    fn test_null_and_empty_values_fail() {
        let data = raw(r#"{
            "e1": {"output__305__fbc": null},
            "e2": {"output__305__fbc": ""}
        }"#);
        let report = analyze(&data, "fbc", "305").unwrap();
        assert_eq!(report.target_events, 0);
    }

    #[test]
    fn test_filter_criteria_shape() {
        let data = raw(r#"{
            "e1": {"output__305__filter_criteria": [
                {"key": "fbc", "value": "fb.1.123"},
                {"key": "other", "value": "x"}
            ]},
            "e2": {"output__305__filter_criteria": [
                {"key": "fbc", "value": ""}
            ]}
        }"#);
        let report = analyze(&data, "fbc", "305").unwrap();
        assert_eq!(report.target_event_ids, ["e1"]);
    }

    #[test]
    fn test_regex_metacharacters_in_root() {
        // Roots are escaped before being baked into the scan patterns.
        let data = raw(r#"{"e1": {"output__a.b__fbc": "x"}}"#);
        let report = analyze(&data, "fbc", "a.b").unwrap();
        assert_eq!(report.target_events, 1);
        let miss = analyze(&data, "fbc", "axb").unwrap();
        assert_eq!(miss.target_events, 0);
    }

    #[test]
    fn test_empty_params_rejected() {
        let data = raw("{}");
        assert!(analyze(&data, "", "305").is_err());
        assert!(analyze(&data, "fbc", " ").is_err());
    }

    #[test]
    fn test_success_rate_rounded() {
        let data = raw(r#"{
            "e1": {"output__305__fbc": "x"},
            "e2": {},
            "e3": {}
        }"#);
        let report = analyze(&data, "fbc", "305").unwrap();
        assert_eq!(report.success_rate, 33.33);
    }
}
