//! Target-analysis report types.

use serde::Serialize;
use serde_json::Value;

/// The raw key (and its value) that satisfied a target-analysis probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedField {
    /// The raw key that matched.
    pub key: String,
    /// The matched value, verbatim.
    pub value: Value,
}

/// Classification of a raw dataset against one filter parameter and root id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Total events inspected.
    pub total_events: usize,
    /// Events carrying the filter parameter for the root.
    pub target_events: usize,
    /// Percentage of target events, rounded to two decimals.
    pub success_rate: f64,
    /// Ids of target events, in document order.
    pub target_event_ids: Vec<String>,
    /// Ids of events without a match, in document order.
    pub failed_event_ids: Vec<String>,
}

impl AnalysisReport {
    /// Renders the report as a plain-text summary.
    ///
    /// With `show_ids`, the target and failed id lists are appended.
    #[must_use]
    pub fn render(&self, show_ids: bool) -> String {
        let mut lines = vec![
            format!("total events: {}", self.total_events),
            format!("target events: {}", self.target_events),
        ];

        if show_ids {
            if !self.target_event_ids.is_empty() {
                lines.push("\nlist of ids of target events".to_string());
                lines.extend(self.target_event_ids.iter().cloned());
            }
            if !self.failed_event_ids.is_empty() {
                lines.push("\nlist of ids of failed events".to_string());
                lines.extend(self.failed_event_ids.iter().cloned());
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> AnalysisReport {
        AnalysisReport {
            total_events: 3,
            target_events: 2,
            success_rate: 66.67,
            target_event_ids: vec!["a".to_string(), "b".to_string()],
            failed_event_ids: vec!["c".to_string()],
        }
    }

    #[test]
    fn test_render_summary_only() {
        let text = report().render(false);
        assert_eq!(text, "total events: 3\ntarget events: 2");
    }

    #[test]
    fn test_render_with_ids() {
        let text = report().render(true);
        assert!(text.starts_with("total events: 3\ntarget events: 2"));
        assert!(text.contains("list of ids of target events\na\nb"));
        assert!(text.contains("list of ids of failed events\nc"));
    }
}
