// Prints row count, the first rows and the column types of a Parquet file

use anyhow::Result;
use arrow::util::pretty::pretty_format_batches;

use crate::args::ViewParquetArgs;
use crate::columnar::{parquet_row_count, read_batches};
use crate::utils::require_input_file;

pub fn run(args: &ViewParquetArgs) -> Result<()> {
    println!("{}", render(args)?);
    Ok(())
}

/// Builds the report printed by `run`.
pub fn render(args: &ViewParquetArgs) -> Result<String> {
    require_input_file(&args.file)?;
    let total = parquet_row_count(&args.file)?;
    let (schema, batches) = read_batches(&args.file, Some(args.rows))?;

    let mut out = format!("Total rows: {}\n\n", total);
    out.push_str(&format!("First {} rows:\n", args.rows.min(total as usize)));
    out.push_str(&pretty_format_batches(&batches)?.to_string());
    out.push_str("\n\nData types:\n");
    for field in schema.fields() {
        out.push_str(&format!("{}: {}\n", field.name(), field.data_type()));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columnar::write_inferred_parquet;
    use crate::progress::ProgressReporter;
    use crate::records::Record;
    use serde_json::json;

    #[test]
    fn test_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        let records: Vec<Record> = (0..5)
            .map(|i| {
                serde_json::from_value(json!({"source": format!("row-{}", i), "id": i})).unwrap()
            })
            .collect();
        write_inferred_parquet(&path, &records, &mut ProgressReporter::hidden(5)).unwrap();

        let report = render(&ViewParquetArgs {
            file: path,
            rows: 2,
        })
        .unwrap();
        assert!(report.starts_with("Total rows: 5"));
        assert!(report.contains("First 2 rows:"));
        assert!(report.contains("row-0"));
        assert!(report.contains("row-1"));
        assert!(!report.contains("row-2"));
        assert!(report.contains("source: Utf8"));
        assert!(report.contains("id: Int64"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = render(&ViewParquetArgs {
            file: dir.path().join("nope.parquet"),
            rows: 3,
        })
        .unwrap_err();
        assert!(err.to_string().contains("nope.parquet"));
    }
}
