// One module per converter, plus the pieces the template converters share

use std::path::Path;

use anyhow::Result;
use log::{debug, info};
use serde::Serialize;

use crate::args::Command;
use crate::records::{JsonlWriter, Record};
use crate::split::{split_records, SplitConfig};
use crate::utils::{ensure_parent_dir, require_input_file};

pub mod alpaca;
pub mod clean_parquet;
pub mod json2jsonl;
pub mod jsonl2json;
pub mod jsonl2parquet;
pub mod parquet2json;
pub mod translation;
pub mod view_parquet;
pub mod volcengine;

/// How often the JSONL converters report progress at debug level.
const PROGRESS_EVERY: usize = 100;

pub fn run(command: &Command) -> Result<()> {
    match command {
        Command::JsonToJsonl(args) => json2jsonl::run(args).map(|_| ()),
        Command::JsonlToJson(args) => jsonl2json::run(args).map(|_| ()),
        Command::Volcengine(args) => volcengine::run(args).map(|_| ()),
        Command::Translation(args) => translation::run(args).map(|_| ()),
        Command::Alpaca(args) => alpaca::run(args).map(|_| ()),
        Command::JsonlToParquet(args) => jsonl2parquet::run(args).map(|_| ()),
        Command::ParquetToJson(args) => parquet2json::run(args).map(|_| ()),
        Command::CleanParquet(args) => clean_parquet::run(args),
        Command::ViewParquet(args) => view_parquet::run(args),
    }
}

/// Records written by a converter that may split its output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCounts {
    pub train: usize,
    pub validation: usize,
}

/// Checks the input and creates the output directories before anything is read.
pub(crate) fn prepare_paths(input: &Path, outputs: &[&Path]) -> Result<()> {
    require_input_file(input)?;
    for output in outputs {
        ensure_parent_dir(output)?;
    }
    Ok(())
}

/// Splits records when a split is configured, otherwise everything is training data.
pub(crate) fn partition(records: Vec<Record>, split: Option<&SplitConfig>) -> (Vec<Record>, Vec<Record>) {
    match split {
        Some(config) => {
            let validation_size = config.validation_size(records.len());
            let total = records.len();
            let parts = split_records(records, validation_size, &mut config.rng());
            debug!(
                "Split data into {} training samples and {} validation samples",
                total - validation_size,
                validation_size
            );
            parts
        }
        None => (records, Vec::new()),
    }
}

/// Converts `records` one by one and writes the results as JSONL.
///
/// `convert` returns `Ok(None)` for a record that should be skipped; it is expected to log why.
pub(crate) fn write_converted<T, F>(
    path: &Path,
    records: &[Record],
    label: &str,
    mut convert: F,
) -> Result<usize>
where
    T: Serialize,
    F: FnMut(usize, &Record) -> Result<Option<T>>,
{
    let mut writer = JsonlWriter::create(path)?;
    let total = records.len();
    for (i, record) in records.iter().enumerate() {
        let Some(converted) = convert(i, record)? else {
            continue;
        };
        writer.write(&converted)?;
        let written = writer.written();
        if written % PROGRESS_EVERY == 0 {
            debug!(
                "Processed {}/{} {} records ({:.1}%)",
                written,
                total,
                label.to_lowercase(),
                written as f64 / total as f64 * 100.0
            );
        }
    }
    let written = writer.finish()?;
    info!("Wrote {} {} lines to {}", written, label.to_lowercase(), path.display());
    Ok(written)
}

/// Writes the training file and, when splitting, the validation file.
pub(crate) fn write_split<T, F>(
    output: &Path,
    records: Vec<Record>,
    split: Option<&SplitConfig>,
    mut convert: F,
) -> Result<SplitCounts>
where
    T: Serialize,
    F: FnMut(&str, usize, &Record) -> Result<Option<T>>,
{
    let (train, validation) = partition(records, split);
    let train_count = write_converted(output, &train, "Training", |i, r| convert("Training", i, r))?;
    let validation_count = match split {
        Some(config) => write_converted(&config.validation_output, &validation, "Validation", |i, r| {
            convert("Validation", i, r)
        })?,
        None => 0,
    };
    Ok(SplitCounts {
        train: train_count,
        validation: validation_count,
    })
}
