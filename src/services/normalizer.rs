//! Event normalization: raw payloads into tabular records.

use indexmap::IndexSet;
use serde_json::Value;
use tracing::instrument;

use crate::models::{
    CANONICAL_COLUMNS, Dataset, NormalizedRecord, RawDataset, RawEvent, scalar_to_string,
};
use crate::services::resolver::KeyIndex;

/// Top-level fields copied directly, without namespacing logic.
const DIRECT_FIELDS: [&str; 4] = ["date", "status", "object_id", "object_title"];

/// Canonical columns resolved through the suffix ladder, with their suffixes.
const RESOLVED_FIELDS: [(&str, &str); 14] = [
    ("email", "primary_email"),
    ("event_url", "event_url"),
    ("zap_url", "parent_task_history_link"),
    ("updated_by_name", "updated_by_name"),
    ("fbc", "handl_fbc"),
    ("fbp", "handl_fbp"),
    ("ip_address", "handl_ip"),
    ("landing_url", "handl_url"),
    ("user_agent", "handl_user_agent"),
    ("utm_campaign", "handl_utm_campaign"),
    ("utm_content", "handl_utm_content"),
    ("utm_medium", "handl_utm_medium"),
    ("utm_source", "handl_utm_source"),
    ("contact_name", "lead__contact__name"),
];

/// Multi-segment contact suffixes, resolved like the rest.
const CONTACT_PHONE_FIELDS: [(&str, &str); 2] = [
    ("contact_phone", "lead__contact__phone__phone"),
    ("contact_phone_country", "lead__contact__phone__country"),
];

/// Spellings of the event-name suffix, scanned in one resolver pass.
const EVENT_NAME_SUFFIXES: [&str; 2] = ["event_name", "eventname"];

/// Normalizes a raw dataset into ordered tabular records.
///
/// For every event this resolves each canonical field through the suffix
/// ladder, copies the directly-addressed top-level fields, and preserves
/// all remaining raw keys verbatim as dynamic columns. `event_name`
/// resolution prefers the event's own `object_id` root, so the event's own
/// automation step wins when several roots emit an event name.
///
/// A pure transform: the same raw mapping always yields the same dataset,
/// and record order follows document order.
#[must_use]
#[instrument(skip(raw), fields(events = raw.len()))]
pub fn normalize(raw: &RawDataset) -> Dataset {
    let suffix_universe = suffix_universe();

    let mut records = Vec::with_capacity(raw.len());
    let mut columns: IndexSet<String> = CANONICAL_COLUMNS
        .iter()
        .map(|c| (*c).to_string())
        .collect();

    for (event_id, event) in raw.iter() {
        let record = normalize_event(event_id, event, &suffix_universe);
        for key in record.fields().keys() {
            if !columns.contains(key.as_str()) {
                columns.insert(key.clone());
            }
        }
        records.push(record);
    }

    Dataset::new(records, columns.into_iter().collect())
}

/// Builds the full suffix set the resolver index is primed with.
fn suffix_universe() -> Vec<&'static str> {
    let mut suffixes: Vec<&'static str> = vec!["event_id"];
    suffixes.extend(RESOLVED_FIELDS.iter().map(|(_, s)| *s));
    suffixes.extend(CONTACT_PHONE_FIELDS.iter().map(|(_, s)| *s));
    suffixes.extend(EVENT_NAME_SUFFIXES);
    suffixes.push("isfire");
    suffixes
}

/// Builds one normalized record, canonical fields first.
fn normalize_event(event_id: &str, event: &RawEvent, suffixes: &[&'static str]) -> NormalizedRecord {
    let index = KeyIndex::build(event, suffixes);
    let mut fields = serde_json::Map::new();

    fields.insert(
        "event_id".to_string(),
        Value::String(event_id.to_string()),
    );

    let resolved = index.resolve_single("event_id", None);
    fields.insert("input_event_id".to_string(), nullable(resolved.value));

    for direct in DIRECT_FIELDS {
        let value = event.get(direct).and_then(scalar_to_string);
        fields.insert(direct.to_string(), nullable(value));
    }

    for (column, suffix) in RESOLVED_FIELDS {
        let resolved = index.resolve_single(suffix, None);
        fields.insert(column.to_string(), nullable(resolved.value));
    }
    for (column, suffix) in CONTACT_PHONE_FIELDS {
        let resolved = index.resolve_single(suffix, None);
        fields.insert(column.to_string(), nullable(resolved.value));
    }

    // The event's own automation root, when present, biases event_name.
    let own_root = event
        .get("object_id")
        .and_then(scalar_to_string)
        .filter(|root| !root.is_empty());
    let event_name = index.resolve(&EVENT_NAME_SUFFIXES, own_root.as_deref());
    fields.insert("event_name".to_string(), nullable(event_name.value));

    let isfire = index.resolve_single("isfire", None);
    fields.insert("isfire".to_string(), nullable(isfire.value));

    // Everything else passes through verbatim so it stays queryable.
    // Canonical fields keep precedence on (unlikely) name collisions.
    for (key, value) in event.iter() {
        if !fields.contains_key(key) {
            fields.insert(key.clone(), value.clone());
        }
    }

    NormalizedRecord::new(fields)
}

/// Wraps an optional canonical value; absent resolves to JSON null.
fn nullable(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::String)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawDataset {
        serde_json::from_str(text).unwrap()
    }

    fn sample() -> RawDataset {
        raw(r#"{
            "event_001": {
                "date": "2024-01-15",
                "status": "success",
                "object_id": "305546688",
                "object_title": "Test Event 1",
                "output__305546688__event_name": "Schedule",
                "output__305546688__isfire": "yes",
                "output__263780428__text": "No ad_id or adset_id found",
                "output__123456__primary_email": "test@example.com",
                "custom_field_1": "value1"
            }
        }"#)
    }

    #[test]
    fn test_canonical_fields_resolved() {
        let dataset = normalize(&sample());
        let rec = &dataset.records()[0];
        assert_eq!(rec.scalar("event_id").as_deref(), Some("event_001"));
        assert_eq!(rec.scalar("status").as_deref(), Some("success"));
        assert_eq!(rec.scalar("object_id").as_deref(), Some("305546688"));
        assert_eq!(rec.scalar("event_name").as_deref(), Some("Schedule"));
        assert_eq!(rec.scalar("isfire").as_deref(), Some("yes"));
        assert_eq!(rec.scalar("email").as_deref(), Some("test@example.com"));
        assert_eq!(rec.get("fbc"), Some(&Value::Null));
    }

    #[test]
    fn test_dynamic_columns_pass_through() {
        let dataset = normalize(&sample());
        let rec = &dataset.records()[0];
        assert_eq!(
            rec.scalar("output__263780428__text").as_deref(),
            Some("No ad_id or adset_id found")
        );
        assert_eq!(rec.scalar("custom_field_1").as_deref(), Some("value1"));
        assert!(dataset.has_column("output__263780428__text"));
        assert!(dataset.has_column("custom_field_1"));
    }

    #[test]
    fn test_event_name_prefers_own_root() {
        let dataset = normalize(&raw(r#"{
            "ev": {
                "object_id": 222,
                "output__111__event_name": "Foreign",
                "output__222__event_name": "Own"
            }
        }"#));
        let rec = &dataset.records()[0];
        assert_eq!(rec.scalar("event_name").as_deref(), Some("Own"));
        // object_id was a number in the source; it is cast for the bias.
        assert_eq!(rec.scalar("object_id").as_deref(), Some("222"));
    }

    #[test]
    fn test_every_raw_key_still_present() {
        let source = sample();
        let dataset = normalize(&source);
        let rec = &dataset.records()[0];
        for (key, _) in source.events["event_001"].iter() {
            assert!(
                rec.get(key).is_some() || CANONICAL_COLUMNS.contains(&key.as_str()),
                "raw key {key} lost during normalization"
            );
        }
    }

    #[test]
    fn test_record_order_follows_document_order() {
        let dataset = normalize(&raw(
            r#"{"z": {"status": "a"}, "m": {"status": "b"}, "a": {"status": "c"}}"#,
        ));
        let ids: Vec<Option<String>> = dataset
            .records()
            .iter()
            .map(|r| r.scalar("event_id"))
            .collect();
        assert_eq!(
            ids,
            vec![
                Some("z".to_string()),
                Some("m".to_string()),
                Some("a".to_string())
            ]
        );
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let source = sample();
        assert_eq!(normalize(&source), normalize(&source));
    }

    #[test]
    fn test_canonical_columns_always_present() {
        let dataset = normalize(&raw(r#"{"bare": {}}"#));
        let rec = &dataset.records()[0];
        for column in CANONICAL_COLUMNS {
            assert!(rec.get(column).is_some(), "missing canonical column {column}");
        }
        assert_eq!(rec.scalar("event_id").as_deref(), Some("bare"));
        assert_eq!(rec.get("status"), Some(&Value::Null));
    }
}
