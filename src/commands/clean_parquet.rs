// Cleaning, analysis and stratified sampling of a Parquet `source` column

use std::path::Path;

use anyhow::{bail, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use super::prepare_paths;
use crate::args::CleanParquetArgs;
use crate::cleaner::{
    analyze_length_distribution, classify, clean_source, print_length_distribution,
    print_sampling_stats, strip_leading_dash, CleanStats, LengthDistribution, Verdict,
};
use crate::columnar::{parquet_row_count, read_parquet, write_parquet, ParquetTable};
use crate::progress::ProgressReporter;
use crate::records::{Record, SourceText, SOURCE_FIELD};
use crate::sampler::{sample_by_length, SamplingPlan, SamplingStats, SAMPLE_SEED};

/// Rows shown as cleaning examples in a dry run.
const EXAMPLE_ROWS: usize = 10;

pub fn run(args: &CleanParquetArgs) -> Result<()> {
    if !args.dry_run && !args.sample && args.output.is_none() {
        bail!("Output path is required when not in dry-run mode");
    }
    let outputs: Vec<&Path> = if args.dry_run {
        Vec::new()
    } else {
        args.output.iter().map(|p| p.as_path()).collect()
    };
    prepare_paths(&args.input, &outputs)?;

    let table = load(&args.input)?;

    if args.dry_run {
        info!("Running in dry-run mode, analyzing data distribution...");
        dry_run(&table.records, args.min_length);
        info!("Dry run completed. No files were modified.");
    } else if args.sample {
        info!(
            "Running in sampling mode, targeting {} records...",
            args.sample_size
        );
        sample(table, args.min_length, args.sample_size, args.output.as_deref())?;
    } else if let Some(output) = args.output.as_deref() {
        clean(table, args.min_length, output)?;
    }
    Ok(())
}

/// Reads the Parquet file and checks it has a `source` column.
pub fn load(path: &Path) -> Result<ParquetTable> {
    info!("Reading Parquet file: {}", path.display());
    let mut progress = ProgressReporter::records("Reading", parquet_row_count(path)?);
    let table = read_parquet(path, &mut progress)?;
    progress.finish();
    if !table.has_column(SOURCE_FIELD) {
        bail!("Input file does not contain a '{}' column", SOURCE_FIELD);
    }
    Ok(table)
}

/// Prints the length distribution and how the rules would treat a few random rows.
pub fn dry_run(records: &[Record], min_length: usize) -> LengthDistribution {
    let distribution = analyze_length_distribution(records);
    print_length_distribution(&distribution);

    let shown = records.len().min(EXAMPLE_ROWS);
    info!(
        "Example cleaning (sample of {} rows with current min_length={}):",
        shown, min_length
    );
    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    let mut picked = index::sample(&mut rng, records.len(), shown).into_vec();
    picked.sort_unstable();
    for i in picked {
        let record = &records[i];
        let verdict = classify(record, min_length);
        let status = if verdict.is_removed() {
            "would be removed"
        } else {
            "would be kept"
        };
        match record.source_text() {
            Some(text) if matches!(verdict, Verdict::Keep { strip: true }) => {
                let cleaned = strip_leading_dash(text);
                println!("Original ({} chars): '{}'", text.chars().count(), text);
                println!("Cleaned ({} chars): '{}'", cleaned.chars().count(), cleaned);
            }
            Some(text) => println!("Original ({} chars): '{}'", text.chars().count(), text),
            None => println!(
                "Original (0 chars): {}",
                record.get(SOURCE_FIELD).map(|v| v.to_string()).unwrap_or_default()
            ),
        }
        println!("Status: {}\n", status);
    }
    distribution
}

/// Cleans, then draws a length-stratified sample and writes it when `output` is given.
pub fn sample(
    table: ParquetTable,
    min_length: usize,
    sample_size: usize,
    output: Option<&Path>,
) -> Result<SamplingStats> {
    info!(
        "First cleaning data (minimum length: {} characters)...",
        min_length
    );
    let (cleaned, clean_stats) = clean_source(table.records, min_length);
    debug!("Cleaning statistics: {}", serde_json::to_string(&clean_stats)?);

    info!("Sampling from cleaned data...");
    let plan = SamplingPlan::with_default_buckets(sample_size);
    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    let result = sample_by_length(cleaned, &plan, &mut rng);
    print_sampling_stats(&result.stats);
    debug!("Sampling statistics: {}", serde_json::to_string(&result.stats)?);

    match output {
        Some(output) => {
            info!("Saving sampled data to: {}", output.display());
            let mut progress = ProgressReporter::records("Writing", result.records.len() as u64);
            write_parquet(output, table.schema, &result.records, &mut progress)?;
            progress.finish();
            info!("Saved {} records to {}", result.records.len(), output.display());
        }
        None => info!("No output path provided. Sampled data not saved."),
    }
    Ok(result.stats)
}

/// Applies the cleaning rules and writes the remaining rows to `output`.
pub fn clean(table: ParquetTable, min_length: usize, output: &Path) -> Result<CleanStats> {
    info!(
        "Cleaning source data (minimum length: {} characters)...",
        min_length
    );
    let (cleaned, stats) = clean_source(table.records, min_length);

    info!("Saving cleaned data to: {}", output.display());
    let mut progress = ProgressReporter::records("Writing", cleaned.len() as u64);
    write_parquet(output, table.schema, &cleaned, &mut progress)?;
    progress.finish();

    info!("Cleaning completed. Statistics:");
    for line in stats.summary(min_length) {
        info!("{}", line);
    }
    Ok(stats)
}
