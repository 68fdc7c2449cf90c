// Parquet -> JSON array of {question, is_answered}

use anyhow::{bail, Result};
use log::info;
use serde::Serialize;
use serde_json::Value;

use super::prepare_paths;
use crate::args::ParquetToJsonArgs;
use crate::columnar::{parquet_row_count, read_parquet, ParquetTable};
use crate::progress::ProgressReporter;
use crate::records::{write_json_pretty, SOURCE_FIELD};
use crate::utils::truncate_chars;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionEntry {
    pub question: Value,
    pub is_answered: bool,
}

/// Picks the column holding the questions: the requested one if present, else `source`, else
/// the first column.
pub fn question_column<'a>(table: &'a ParquetTable, requested: &'a str) -> Result<&'a str> {
    if table.has_column(requested) {
        return Ok(requested);
    }
    if table.has_column(SOURCE_FIELD) {
        return Ok(SOURCE_FIELD);
    }
    match table.column_names().first().copied() {
        Some(name) => Ok(name),
        None => bail!("Parquet file has no columns"),
    }
}

pub fn run(args: &ParquetToJsonArgs) -> Result<usize> {
    prepare_paths(&args.io.input, &[&args.io.output])?;

    info!("Reading Parquet file: {}", args.io.input.display());
    let total = parquet_row_count(&args.io.input)?;
    let mut progress = ProgressReporter::records("Reading", total);
    let table = read_parquet(&args.io.input, &mut progress)?;
    progress.finish();

    let column = question_column(&table, &args.question_column)?;
    info!("Converting to JSON format using column '{}'", column);
    let mut progress = ProgressReporter::records("Converting", table.records.len() as u64);
    let mut entries = Vec::with_capacity(table.records.len());
    for record in &table.records {
        let question = record.get(column).cloned().unwrap_or(Value::Null);
        entries.push(QuestionEntry {
            question,
            is_answered: true,
        });
        progress.update(entries.len() as u64, || {
            entries.last().map(|e| match &e.question {
                Value::String(q) => format!("Latest: {}", truncate_chars(q, 30)),
                other => format!("Latest: {}", other),
            })
        });
    }
    progress.finish();

    info!("Saving to JSON file: {}", args.io.output.display());
    write_json_pretty(&args.io.output, &entries)?;
    info!("Conversion completed successfully");
    Ok(entries.len())
}
