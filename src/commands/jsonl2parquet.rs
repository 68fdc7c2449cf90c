// JSONL -> Parquet

use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{Context, Result};
use log::info;

use super::prepare_paths;
use crate::args::IoArgs;
use crate::columnar::write_inferred_parquet;
use crate::progress::ProgressReporter;
use crate::records::{parse_jsonl_line, text_field, Record};
use crate::utils::truncate_chars;

const PREVIEW_CHARS: usize = 30;

/// Short "source => target" preview of a record for the progress bar.
pub fn preview(record: &Record) -> Option<String> {
    let source = text_field(record, "source")?;
    let target = text_field(record, "target")?;
    Some(format!(
        "Latest: {} => {}",
        truncate_chars(&source, PREVIEW_CHARS),
        truncate_chars(&target, PREVIEW_CHARS)
    ))
}

/// Reads a JSONL file line by line, reporting progress in bytes.
pub fn read_jsonl(path: &std::path::Path) -> Result<Vec<Record>> {
    info!("Reading JSONL file: {}", path.display());
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let file_size = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut progress = ProgressReporter::bytes("Reading", file_size);

    let mut records = Vec::new();
    let mut line = String::new();
    let mut bytes_read = 0u64;
    let mut line_no = 0;
    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        if n == 0 {
            break;
        }
        line_no += 1;
        bytes_read += n as u64;
        if let Some(record) = parse_jsonl_line(&line, line_no)? {
            records.push(record);
        }
        progress.update(bytes_read, || {
            records
                .last()
                .and_then(preview)
                .map(|p| format!("{} records | {}", records.len(), p))
        });
    }
    progress.finish();
    Ok(records)
}

pub fn run(args: &IoArgs) -> Result<usize> {
    prepare_paths(&args.input, &[&args.output])?;
    let records = read_jsonl(&args.input)?;

    info!("Converting to Parquet: {}", args.output.display());
    let mut progress = ProgressReporter::records("Writing", records.len() as u64);
    write_inferred_parquet(&args.output, &records, &mut progress)?;
    progress.finish();
    info!("Conversion completed successfully, {} rows", records.len());
    Ok(records.len())
}
