// JSONL -> pretty-printed JSON array

use anyhow::Result;
use log::info;

use super::prepare_paths;
use crate::args::IoArgs;
use crate::records::{read_records, write_json_pretty};

pub fn run(args: &IoArgs) -> Result<usize> {
    prepare_paths(&args.input, &[&args.output])?;
    let records = read_records(&args.input)?;
    write_json_pretty(&args.output, &records)?;
    info!("Wrote {} records to {}", records.len(), args.output.display());
    Ok(records.len())
}
