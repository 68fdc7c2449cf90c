// Parquet <-> JSON record conversion through arrow

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::datatypes::{Schema, SchemaRef};
use arrow::json::reader::infer_json_schema_from_iterator;
use arrow::json::writer::JsonArray;
use arrow::json::{ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde_json::Value;

use crate::progress::ProgressReporter;
use crate::records::Record;

/// Rows per record batch when writing.
pub const BATCH_SIZE: usize = 1000;

/// Records read from a Parquet file, together with the file's schema.
pub struct ParquetTable {
    pub schema: SchemaRef,
    pub records: Vec<Record>,
}

impl ParquetTable {
    pub fn has_column(&self, name: &str) -> bool {
        self.schema.field_with_name(name).is_ok()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.fields().iter().map(|f| f.name().as_str()).collect()
    }
}

/// Number of rows recorded in the Parquet footer.
pub fn parquet_row_count(path: &Path) -> Result<u64> {
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    Ok(builder.metadata().file_metadata().num_rows().max(0) as u64)
}

/// Reads every row of a Parquet file as a JSON record. Null cells become JSON `null`.
pub fn read_parquet(path: &Path, progress: &mut ProgressReporter) -> Result<ParquetTable> {
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("'{}' is not a valid Parquet file", path.display()))?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        records.extend(batch_to_records(&batch)?);
        progress.update(records.len() as u64, || None);
    }
    Ok(ParquetTable { schema, records })
}

/// Reads the record batches of a Parquet file, stopping once `limit` rows are collected.
pub fn read_batches(path: &Path, limit: Option<usize>) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("'{}' is not a valid Parquet file", path.display()))?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut batches = Vec::new();
    let mut rows = 0;
    for batch in reader {
        let batch = batch?;
        match limit {
            Some(limit) if rows + batch.num_rows() >= limit => {
                batches.push(batch.slice(0, limit - rows));
                break;
            }
            _ => {
                rows += batch.num_rows();
                batches.push(batch);
            }
        }
    }
    Ok((schema, batches))
}

/// Converts one record batch into JSON records, keeping null columns as explicit `null`s.
pub fn batch_to_records(batch: &RecordBatch) -> Result<Vec<Record>> {
    if batch.num_rows() == 0 {
        return Ok(Vec::new());
    }
    let mut writer = WriterBuilder::new()
        .with_explicit_nulls(true)
        .build::<_, JsonArray>(Vec::new());
    writer.write(batch)?;
    writer.finish()?;
    let buf = writer.into_inner();
    let rows: Vec<Value> = serde_json::from_slice(&buf)?;
    rows.into_iter()
        .map(|row| match row {
            Value::Object(record) => Ok(record),
            other => bail!("unexpected JSON row from record batch: {}", other),
        })
        .collect()
}

/// Infers an arrow schema covering every key of every record.
pub fn infer_schema(records: &[Record]) -> Result<Schema> {
    let schema =
        infer_json_schema_from_iterator(records.iter().map(|r| Ok(Value::Object(r.clone()))))?;
    Ok(schema)
}

/// Writes `records` to a Parquet file with the given schema, in batches of `BATCH_SIZE`.
///
/// An empty record set still produces a valid file carrying the schema.
pub fn write_parquet(
    path: &Path,
    schema: SchemaRef,
    records: &[Record],
    progress: &mut ProgressReporter,
) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create '{}'", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
    let mut decoder = ReaderBuilder::new(schema)
        .with_batch_size(BATCH_SIZE)
        .build_decoder()?;

    let mut written = 0;
    for chunk in records.chunks(BATCH_SIZE) {
        decoder.serialize(chunk)?;
        if let Some(batch) = decoder.flush()? {
            writer.write(&batch)?;
        }
        written += chunk.len();
        progress.update(written as u64, || None);
    }
    writer.close()?;
    Ok(())
}

/// Writes records whose schema is inferred from their own shape.
pub fn write_inferred_parquet(
    path: &Path,
    records: &[Record],
    progress: &mut ProgressReporter,
) -> Result<()> {
    if records.is_empty() {
        bail!("no records to write to '{}'", path.display());
    }
    let schema = Arc::new(infer_schema(records)?);
    write_parquet(path, schema, records, progress)
}
