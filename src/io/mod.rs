//! Dataset loading and result output.
//!
//! Datasets arrive as a single JSON object keyed by event id. Outputs are
//! JSON (via `serde_json`), CSV (via the `csv` crate), or plain-text
//! analysis reports written next to the working directory.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::instrument;

use crate::models::{RawDataset, Row};
use crate::{Error, Result};

/// Loads a raw dataset from a JSON file.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] when the file cannot be opened and
/// [`Error::InvalidInput`] when its content is not an object of event
/// objects.
#[instrument]
pub fn load_dataset_file(path: &Path) -> Result<RawDataset> {
    let file = File::open(path).map_err(|e| Error::OperationFailed {
        operation: format!("open {}", path.display()),
        cause: e.to_string(),
    })?;
    load_dataset_reader(BufReader::new(file))
}

/// Loads a raw dataset from any reader.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when the document is not valid JSON or
/// not shaped as `{event_id: {key: value, ...}, ...}`.
pub fn load_dataset_reader<R: Read>(reader: R) -> Result<RawDataset> {
    let document: Value = serde_json::from_reader(reader)
        .map_err(|e| Error::InvalidInput(format!("not valid JSON: {e}")))?;
    let Value::Object(events) = document else {
        return Err(Error::InvalidInput(
            "expected a JSON object keyed by event id".to_string(),
        ));
    };
    for (event_id, payload) in &events {
        if !payload.is_object() {
            return Err(Error::InvalidInput(format!(
                "event '{event_id}' is not an object"
            )));
        }
    }
    serde_json::from_value(Value::Object(events))
        .map_err(|e| Error::InvalidInput(format!("malformed dataset: {e}")))
}

/// Writes query result rows as CSV.
///
/// The header is the union of row keys in first-encounter order. Nulls
/// render as empty cells; nested values render as compact JSON.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] when the writer fails.
pub fn write_rows_csv<W: Write>(writer: W, rows: &[Row]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| Error::OperationFailed {
        operation: "write csv".to_string(),
        cause: e.to_string(),
    };

    let mut header: Vec<&String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !header.contains(&key) {
                header.push(key);
            }
        }
    }
    wtr.write_record(&header).map_err(csv_err)?;

    for row in rows {
        let record: Vec<String> = header
            .iter()
            .map(|key| row.get(*key).map_or_else(String::new, cell))
            .collect();
        wtr.write_record(&record).map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| Error::OperationFailed {
        operation: "write csv".to_string(),
        cause: e.to_string(),
    })
}

/// Renders one CSV cell from a JSON value.
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

/// Saves a rendered analysis report as a timestamped text file in `dir`.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] when the file cannot be written.
#[instrument(skip(report))]
pub fn save_report(dir: &Path, report: &str) -> Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let path = dir.join(format!("{stamp}.txt"));
    std::fs::write(&path, report).map_err(|e| Error::OperationFailed {
        operation: format!("write {}", path.display()),
        cause: e.to_string(),
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_reader_preserves_order() {
        let raw = load_dataset_reader(r#"{"b": {"x": 1}, "a": {"y": 2}}"#.as_bytes()).unwrap();
        let ids: Vec<&String> = raw.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_load_reader_rejects_non_object() {
        assert!(load_dataset_reader("[1, 2]".as_bytes()).is_err());
        assert!(load_dataset_reader("\"text\"".as_bytes()).is_err());
    }

    #[test]
    fn test_load_reader_rejects_scalar_event() {
        let err = load_dataset_reader(r#"{"e1": 42}"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("e1"));
    }

    #[test]
    fn test_load_reader_rejects_invalid_json() {
        assert!(load_dataset_reader("{not json".as_bytes()).is_err());
    }

    #[test]
    fn test_load_file_missing() {
        let err = load_dataset_file(Path::new("/nonexistent/events.json")).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_write_rows_csv() {
        let rows: Vec<Row> = vec![
            serde_json::from_str(r#"{"event_id": "e1", "status": "success"}"#).unwrap(),
            serde_json::from_str(r#"{"event_id": "e2", "status": null, "extra": 3}"#).unwrap(),
        ];
        let mut out = Vec::new();
        write_rows_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "event_id,status,extra\ne1,success,\ne2,,3\n"
        );
    }

    #[test]
    fn test_write_rows_csv_nested_value() {
        let rows: Vec<Row> =
            vec![serde_json::from_str(r#"{"a": {"k": 1}}"#).unwrap()];
        let mut out = Vec::new();
        write_rows_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"{\"\"k\"\":1}\""));
    }

    #[test]
    fn test_save_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_report(dir.path(), "total events: 1").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "total events: 1");
        assert!(path.extension().is_some_and(|e| e == "txt"));
    }
}
