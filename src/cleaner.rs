//! Cleaning rules and length analysis for the `source` column.

use serde::Serialize;
use serde_json::Value;

use crate::records::{Record, SourceText, SOURCE_FIELD};
use crate::sampler::SamplingStats;

pub const DEFAULT_MIN_LENGTH: usize = 10;

const DASH_ONLY: &str = "-";
const DASH_PREFIX: &str = "- ";

/// Left-closed histogram edges; the last bin is closed by `max_length + 1`.
const HISTOGRAM_EDGES: [usize; 11] = [0, 5, 10, 15, 20, 30, 50, 100, 200, 500, 1000];
const REMOVAL_THRESHOLDS: [usize; 6] = [5, 10, 15, 20, 30, 50];

/// What the cleaning rules do with a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    RemoveDash,
    RemoveShort,
    /// Kept, with `strip` set when the leading dash prefix will be cut.
    Keep { strip: bool },
}

impl Verdict {
    pub fn is_removed(&self) -> bool {
        !matches!(self, Verdict::Keep { .. })
    }
}

pub fn classify<R: SourceText>(record: &R, min_length: usize) -> Verdict {
    match record.source_text() {
        Some(DASH_ONLY) => Verdict::RemoveDash,
        Some(text) if text.chars().count() < min_length => Verdict::RemoveShort,
        Some(text) => Verdict::Keep {
            strip: text.starts_with(DASH_PREFIX),
        },
        None => Verdict::Keep { strip: false },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanStats {
    pub total_rows: usize,
    pub removed_dash: usize,
    pub removed_short: usize,
    pub cleaned_leading_dash: usize,
    pub remaining_rows: usize,
}

impl CleanStats {
    pub fn removed(&self) -> usize {
        self.total_rows - self.remaining_rows
    }

    pub fn reduction_pct(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.removed() as f64 / self.total_rows as f64 * 100.0
        }
    }

    /// Report lines for a finished cleaning run.
    ///
    /// Rows that are only `-` are counted under the dash line alone, never as short phrases.
    pub fn summary(&self, min_length: usize) -> Vec<String> {
        vec![
            format!("Total rows processed: {}", self.total_rows),
            format!("Rows with just '-' removed: {}", self.removed_dash),
            format!(
                "Short phrases removed (< {} chars, excluding '-' rows): {}",
                min_length, self.removed_short
            ),
            format!("Leading dash cleaned: {}", self.cleaned_leading_dash),
            format!("Remaining rows: {}", self.remaining_rows),
            format!(
                "Reduction: {} rows ({:.2}%)",
                self.removed(),
                self.reduction_pct()
            ),
        ]
    }
}

/// Drops dash-only and short rows, then strips a leading `"- "` from the rows that are left.
///
/// Rows whose `source` is missing or not a string are kept untouched.
pub fn clean_source(records: Vec<Record>, min_length: usize) -> (Vec<Record>, CleanStats) {
    let mut stats = CleanStats {
        total_rows: records.len(),
        ..Default::default()
    };
    let mut kept = Vec::with_capacity(records.len());
    for mut record in records {
        match classify(&record, min_length) {
            Verdict::RemoveDash => stats.removed_dash += 1,
            Verdict::RemoveShort => stats.removed_short += 1,
            Verdict::Keep { strip } => {
                if strip {
                    if let Some(Value::String(text)) = record.get_mut(SOURCE_FIELD) {
                        text.replace_range(..DASH_PREFIX.len(), "");
                        stats.cleaned_leading_dash += 1;
                    }
                }
                kept.push(record);
            }
        }
    }
    stats.remaining_rows = kept.len();
    (kept, stats)
}

/// Text after the cleaning rules, without deciding on removal.
pub fn strip_leading_dash(text: &str) -> &str {
    text.strip_prefix(DASH_PREFIX).unwrap_or(text)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthDistribution {
    pub total_rows: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub mean_length: f64,
    pub median_length: usize,
    pub length_histogram: Vec<(String, usize)>,
    pub removal_counts: Vec<(usize, usize)>,
    pub dash_only_count: usize,
}

pub fn analyze_length_distribution<R: SourceText>(records: &[R]) -> LengthDistribution {
    let mut lengths: Vec<usize> = records.iter().map(SourceText::source_len).collect();
    lengths.sort_unstable();

    let total_rows = lengths.len();
    let min_length = lengths.first().copied().unwrap_or(0);
    let max_length = lengths.last().copied().unwrap_or(0);
    let mean_length = if total_rows == 0 {
        0.0
    } else {
        let mean = lengths.iter().sum::<usize>() as f64 / total_rows as f64;
        (mean * 100.0).round() / 100.0
    };
    let median_length = match total_rows {
        0 => 0,
        n if n % 2 == 1 => lengths[n / 2],
        n => (lengths[n / 2 - 1] + lengths[n / 2]) / 2,
    };

    let mut edges: Vec<usize> = HISTOGRAM_EDGES
        .iter()
        .copied()
        .filter(|&e| e <= max_length)
        .collect();
    edges.push(max_length + 1);
    let length_histogram = edges
        .windows(2)
        .map(|w| {
            let (lo, hi) = (w[0], w[1]);
            let count = count_in(&lengths, lo, hi);
            (format!("{}-{}", lo, hi - 1), count)
        })
        .collect();

    let removal_counts = REMOVAL_THRESHOLDS
        .iter()
        .map(|&t| (t, lengths.partition_point(|&l| l < t)))
        .collect();

    let dash_only_count = records
        .iter()
        .filter(|r| r.source_text() == Some(DASH_ONLY))
        .count();

    LengthDistribution {
        total_rows,
        min_length,
        max_length,
        mean_length,
        median_length,
        length_histogram,
        removal_counts,
        dash_only_count,
    }
}

// counts sorted lengths in [lo, hi)
fn count_in(sorted: &[usize], lo: usize, hi: usize) -> usize {
    sorted.partition_point(|&l| l < hi) - sorted.partition_point(|&l| l < lo)
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

pub fn print_length_distribution(stats: &LengthDistribution) {
    println!("\n===== Source length distribution =====");
    println!("Total rows: {}", stats.total_rows);
    println!("Shortest source: {}", stats.min_length);
    println!("Longest source: {}", stats.max_length);
    println!("Mean length: {:.2}", stats.mean_length);
    println!("Median length: {}", stats.median_length);
    println!("Rows that are only '-': {}", stats.dash_only_count);
    println!("\nRows per length range:");
    for (range, count) in &stats.length_histogram {
        println!(
            "  {} chars: {} rows ({:.2}%)",
            range,
            count,
            pct(*count, stats.total_rows)
        );
    }
    println!("\nRows removed at different thresholds:");
    for (threshold, count) in &stats.removal_counts {
        println!(
            "  length < {}: {} rows ({:.2}%)",
            threshold,
            count,
            pct(*count, stats.total_rows)
        );
    }
}

pub fn print_sampling_stats(stats: &SamplingStats) {
    println!("\n===== Sampling statistics =====");
    println!("Original size: {}", stats.original_size);
    println!("Target size: {}", stats.target_size);
    println!("Actual size: {}", stats.actual_size);
    println!("\nPer length range:");
    for range in &stats.ranges {
        println!("  {} chars:", range.range);
        println!("    available: {} rows", range.available);
        println!("    requested: {} rows", range.requested);
        println!("    sampled:   {} rows", range.sampled);
        if range.available > 0 {
            println!("    ratio:     {:.2}%", pct(range.sampled, range.available));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(sources: &[Value]) -> Vec<Record> {
        sources
            .iter()
            .map(|s| {
                let mut record = Record::new();
                record.insert("source".to_string(), s.clone());
                record.insert("target".to_string(), json!("t"));
                record
            })
            .collect()
    }

    #[test]
    fn test_clean_source_rules() {
        let records = rows(&[
            json!("-"),
            json!("short"),
            json!("- this one keeps its text"),
            json!("a perfectly fine sentence"),
            json!(null),
            json!("- x"),
        ]);
        let (kept, stats) = clean_source(records, 10);
        assert_eq!(
            stats,
            CleanStats {
                total_rows: 6,
                removed_dash: 1,
                removed_short: 2,
                cleaned_leading_dash: 1,
                remaining_rows: 3,
            }
        );
        assert_eq!(kept[0]["source"], "this one keeps its text");
        assert_eq!(kept[1]["source"], "a perfectly fine sentence");
        assert_eq!(kept[2]["source"], Value::Null);
        // other columns pass through
        assert!(kept.iter().all(|r| r["target"] == "t"));
    }

    #[test]
    fn test_dash_counted_once_with_zero_min_length() {
        let (kept, stats) = clean_source(rows(&[json!("-"), json!("")]), 0);
        assert_eq!(stats.removed_dash, 1);
        assert_eq!(stats.removed_short, 0);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_summary_separates_dash_rows() {
        let (_, stats) = clean_source(rows(&[json!("-"), json!("-"), json!("ok"), json!("long enough text")]), 10);
        let lines = stats.summary(10);
        assert_eq!(lines[1], "Rows with just '-' removed: 2");
        assert_eq!(lines[2], "Short phrases removed (< 10 chars, excluding '-' rows): 1");
        assert_eq!(lines[4], "Remaining rows: 1");
        assert_eq!(lines[5], "Reduction: 3 rows (75.00%)");
    }

    #[test]
    fn test_min_length_counts_chars() {
        // four characters, twelve bytes
        let (kept, _) = clean_source(rows(&[json!("你好世界")]), 5);
        assert!(kept.is_empty());
        let (kept, _) = clean_source(rows(&[json!("你好世界")]), 4);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_reduction_pct() {
        let stats = CleanStats {
            total_rows: 8,
            remaining_rows: 6,
            ..Default::default()
        };
        assert_eq!(stats.removed(), 2);
        assert!((stats.reduction_pct() - 25.0).abs() < 1e-9);
        assert_eq!(CleanStats::default().reduction_pct(), 0.0);
    }

    #[test]
    fn test_classify() {
        let records = rows(&[json!("-"), json!("abc"), json!("- abcdefghijk"), json!(3)]);
        let verdicts: Vec<Verdict> = records.iter().map(|r| classify(r, 5)).collect();
        assert_eq!(
            verdicts,
            vec![
                Verdict::RemoveDash,
                Verdict::RemoveShort,
                Verdict::Keep { strip: true },
                Verdict::Keep { strip: false },
            ]
        );
        assert!(verdicts[0].is_removed());
        assert!(!verdicts[2].is_removed());
    }

    #[test]
    fn test_strip_leading_dash() {
        assert_eq!(strip_leading_dash("- item"), "item");
        assert_eq!(strip_leading_dash("-item"), "-item");
    }

    #[test]
    fn test_length_distribution() {
        let records = rows(&[
            json!("-"),
            json!("abcd"),
            json!("abcdefghij"),
            json!("x".repeat(40)),
            json!(7),
        ]);
        let dist = analyze_length_distribution(&records);
        assert_eq!(dist.total_rows, 5);
        assert_eq!(dist.min_length, 0);
        assert_eq!(dist.max_length, 40);
        assert_eq!(dist.mean_length, 11.0);
        assert_eq!(dist.median_length, 4);
        assert_eq!(dist.dash_only_count, 1);
        assert_eq!(
            dist.length_histogram,
            vec![
                ("0-4".to_string(), 3),
                ("5-9".to_string(), 0),
                ("10-14".to_string(), 1),
                ("15-19".to_string(), 0),
                ("20-29".to_string(), 0),
                ("30-40".to_string(), 1),
            ]
        );
        assert_eq!(dist.removal_counts[0], (5, 3));
        assert_eq!(dist.removal_counts[1], (10, 3));
        assert_eq!(dist.removal_counts[5], (50, 5));
        let total: usize = dist.length_histogram.iter().map(|(_, c)| c).sum();
        assert_eq!(total, dist.total_rows);
    }

    #[test]
    fn test_even_median_truncates() {
        let dist = analyze_length_distribution(&rows(&[json!("ab"), json!("abcde")]));
        assert_eq!(dist.median_length, 3);
        assert_eq!(dist.mean_length, 3.5);
    }

    #[test]
    fn test_empty_distribution() {
        let dist = analyze_length_distribution::<Record>(&[]);
        assert_eq!(dist.total_rows, 0);
        assert_eq!(dist.length_histogram, vec![("0-0".to_string(), 0)]);
    }
}
