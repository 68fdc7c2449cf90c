// Reading and writing of JSON training records

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::time_it;

/// One training example. Keys keep their insertion order.
pub type Record = Map<String, Value>;

/// Name of the text column the cleaner and sampler operate on.
pub const SOURCE_FIELD: &str = "source";

/// Anything that carries a `source` text attribute.
pub trait SourceText {
    fn source_text(&self) -> Option<&str>;

    /// Length in characters, `0` when the text is absent or not a string.
    fn source_len(&self) -> usize {
        self.source_text().map(|s| s.chars().count()).unwrap_or(0)
    }
}

impl SourceText for Record {
    fn source_text(&self) -> Option<&str> {
        self.get(SOURCE_FIELD).and_then(Value::as_str)
    }
}

/// Returns the field as text if it is present and not null.
///
/// Strings are returned as-is; any other JSON value is rendered compactly.
pub fn text_field(record: &Record, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Reads records from a file that is either a single JSON array or JSONL.
///
/// The whole file is first parsed as one JSON document. A document starting with `[` that does
/// not parse is an error. Otherwise a failed parse falls back to JSONL: every non-blank line is
/// parsed on its own; lines that are not JSON objects are skipped with a warning. An input that
/// yields no records at all is an error.
///
/// # Arguments
///
/// * `path` - the JSON or JSONL file
///
/// # Returns
///
/// * `Vec<Record>` - the records in file order
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let text = time_it!(
        "Time to read",
        fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))?
    );
    let records = parse_records(&text)?;
    if records.is_empty() {
        bail!("No valid data found in {}", path.display());
    }
    debug!("Found {} records in {}", records.len(), path.display());
    Ok(records)
}

/// Parses the content of a JSON array or JSONL document.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => {
            debug!("Loaded standard JSON array format");
            Ok(items
                .into_iter()
                .enumerate()
                .filter_map(|(i, item)| match item {
                    Value::Object(record) => Some(record),
                    _ => {
                        warn!("Record {} is not a JSON object. Skipping.", i + 1);
                        None
                    }
                })
                .collect())
        }
        Ok(Value::Object(record)) => Ok(vec![record]),
        Ok(_) => bail!("Input JSON must be an array of objects"),
        Err(e) if text.trim_start().starts_with('[') => {
            Err(anyhow::Error::new(e).context("Input looks like a JSON array but is not valid JSON"))
        }
        Err(_) => {
            debug!("Not a single JSON document, reading as JSONL");
            Ok(parse_jsonl_lenient(text))
        }
    }
}

fn parse_jsonl_lenient(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(record)) => records.push(record),
            Ok(_) => warn!("Line {} is not a JSON object. Skipping.", i + 1),
            Err(e) => warn!("Failed to parse line {} as JSON: {}", i + 1, e),
        }
    }
    records
}

/// Parses one JSONL line strictly, blank lines yield `None`.
pub fn parse_jsonl_line(line: &str, line_no: usize) -> Result<Option<Record>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(trimmed)
        .with_context(|| format!("invalid JSON on line {}", line_no))?
    {
        Value::Object(record) => Ok(Some(record)),
        _ => bail!("line {} is not a JSON object", line_no),
    }
}

/// Streams compact JSON lines into a file.
pub struct JsonlWriter {
    writer: BufWriter<File>,
    written: usize,
}

impl JsonlWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file =
            File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn write<T: Serialize>(&mut self, item: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, item)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.written)
    }
}

/// Writes `items` as a pretty-printed JSON array with two-space indentation.
pub fn write_json_pretty<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, items)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_parse_array() {
        let records = parse_records(r#"[{"question":"a"},{"question":"b"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["question"], "b");
    }

    #[test]
    fn test_parse_array_skips_non_objects() {
        let records = parse_records(r#"[{"question":"a"}, 3, "x"]"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_jsonl_with_bad_line() {
        let text = "{\"question\":\"a\"}\nnot json\n\n{\"question\":\"b\"}\n";
        let records = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["question"], "a");
        assert_eq!(records[1]["question"], "b");
    }

    #[test]
    fn test_single_object_is_one_record() {
        let records = parse_records(r#"{"question":"only"}"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        assert!(parse_records("42").is_err());
    }

    #[test]
    fn test_read_records_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "this is not json\nneither is this\n").unwrap();
        let err = read_records(&path).unwrap_err();
        assert!(err.to_string().contains("No valid data"));
    }

    #[test]
    fn test_broken_array_is_not_read_as_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.json");
        let text = concat!(
            "[\n",
            "  {\"question\": \"a\", \"content\": \"b\", \"reasoning_content\": \"c\"},\n",
            "  {\"question\": \"d\", \"content\": \"e\", \"reasoning_content\": \"f\"}\n",
        );
        fs::write(&path, text).unwrap();
        let err = read_records(&path).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
        // leading whitespace does not hide the array
        assert!(parse_records(&format!("\n  {}", text)).is_err());
    }

    #[test]
    fn test_parse_jsonl_line() {
        assert!(parse_jsonl_line("   ", 1).unwrap().is_none());
        let rec = parse_jsonl_line(r#"{"source":"x"}"#, 2).unwrap().unwrap();
        assert_eq!(rec["source"], "x");
        assert!(parse_jsonl_line("[1,2]", 3).is_err());
        assert!(parse_jsonl_line("{broken", 4).is_err());
    }

    #[test]
    fn test_source_len() {
        let rec = record(json!({"source": "你好 world"}));
        assert_eq!(rec.source_len(), 8);
        let rec = record(json!({"source": 12}));
        assert_eq!(rec.source_len(), 0);
        let rec = record(json!({"target": "x"}));
        assert_eq!(rec.source_len(), 0);
    }

    #[test]
    fn test_text_field() {
        let rec = record(json!({"a": "text", "b": null, "c": 5}));
        assert_eq!(text_field(&rec, "a").as_deref(), Some("text"));
        assert_eq!(text_field(&rec, "b"), None);
        assert_eq!(text_field(&rec, "c").as_deref(), Some("5"));
        assert_eq!(text_field(&rec, "d"), None);
    }

    #[test]
    fn test_jsonl_writer_keeps_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let mut writer = JsonlWriter::create(&path).unwrap();
        writer.write(&json!({"question": "翻译", "n": 1})).unwrap();
        writer.write(&json!({"question": "second"})).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\"question\":\"翻译\",\"n\":1}\n{\"question\":\"second\"}\n");
    }
}
