// JSON array of question/content/reasoning_content records -> JSONL

use anyhow::{bail, Result};
use log::{debug, info};

use super::{prepare_paths, write_converted};
use crate::args::JsonToJsonlArgs;
use crate::records::{read_records, Record};

/// The fields every record must have, in output order.
pub const REQUIRED_FIELDS: [&str; 3] = ["question", "content", "reasoning_content"];

/// Checks that `record` has exactly the required fields.
pub fn validate_record(record: &Record) -> Result<(), String> {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|f| !record.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing required fields: {}", missing.join(", ")));
    }
    let unexpected: Vec<&str> = record
        .keys()
        .map(String::as_str)
        .filter(|k| !REQUIRED_FIELDS.contains(k))
        .collect();
    if !unexpected.is_empty() {
        return Err(format!("Unexpected fields: {}", unexpected.join(", ")));
    }
    Ok(())
}

/// Puts the required fields in their canonical order.
fn ordered(record: &Record) -> Record {
    REQUIRED_FIELDS
        .iter()
        .filter_map(|f| record.get(*f).map(|v| (f.to_string(), v.clone())))
        .collect()
}

pub fn run(args: &JsonToJsonlArgs) -> Result<usize> {
    prepare_paths(&args.io.input, &[&args.io.output])?;
    info!("Reading JSON from {}", args.io.input.display());
    let records = read_records(&args.io.input)?;

    if !args.no_validate {
        debug!("Validating JSON objects...");
        for (i, record) in records.iter().enumerate() {
            if let Err(msg) = validate_record(record) {
                bail!("Record {} invalid: {}", i + 1, msg);
            }
        }
    }

    let validate = !args.no_validate;
    write_converted(&args.io.output, &records, "JSONL", |_, record| {
        Ok(Some(if validate { ordered(record) } else { record.clone() }))
    })
}
