//! Length-stratified sampling of records.
//!
//! Records are put into fixed length buckets by the character length of their `source` text,
//! and each bucket contributes a share of the target size proportional to its weight.

use rand::seq::index;
use rand::Rng;
use serde::Serialize;

use crate::records::SourceText;

/// Seed used by the CLI so repeated runs pick the same rows.
pub const SAMPLE_SEED: u64 = 42;

/// Closed length interval with its share of the sample, in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBucket {
    pub min_len: usize,
    pub max_len: usize,
    pub weight_pct: usize,
}

impl LengthBucket {
    pub const fn new(min_len: usize, max_len: usize, weight_pct: usize) -> Self {
        Self {
            min_len,
            max_len,
            weight_pct,
        }
    }

    pub fn contains(&self, len: usize) -> bool {
        len >= self.min_len && len <= self.max_len
    }

    pub fn weight(&self) -> f64 {
        self.weight_pct as f64 / 100.0
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.min_len, self.max_len)
    }
}

/// Short, medium, long and very long sentences.
pub const DEFAULT_BUCKETS: [LengthBucket; 4] = [
    LengthBucket::new(30, 49, 30),
    LengthBucket::new(50, 99, 40),
    LengthBucket::new(100, 199, 25),
    LengthBucket::new(200, 499, 5),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingPlan {
    target_size: usize,
    buckets: Vec<LengthBucket>,
    quotas: Vec<usize>,
}

impl SamplingPlan {
    /// Computes the per-bucket quotas for `target_size`.
    ///
    /// Each quota is `floor(target_size * weight)`, except the last one which takes whatever
    /// is left so the quotas always add up to `target_size`.
    pub fn new(target_size: usize, buckets: &[LengthBucket]) -> Self {
        let mut quotas: Vec<usize> = buckets
            .iter()
            .map(|b| share(target_size, b.weight_pct))
            .collect();
        if let Some(last) = quotas.len().checked_sub(1) {
            let others = quotas[..last].iter().fold(0usize, |acc, q| acc.saturating_add(*q));
            quotas[last] = target_size.saturating_sub(others);
        }
        Self {
            target_size,
            buckets: buckets.to_vec(),
            quotas,
        }
    }

    pub fn with_default_buckets(target_size: usize) -> Self {
        Self::new(target_size, &DEFAULT_BUCKETS)
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn quotas(&self) -> &[usize] {
        &self.quotas
    }

    pub fn buckets(&self) -> &[LengthBucket] {
        &self.buckets
    }

    fn bucket_of(&self, len: usize) -> Option<usize> {
        self.buckets.iter().position(|b| b.contains(len))
    }
}

// floor(total * pct / 100) without forming total * pct
fn share(total: usize, pct: usize) -> usize {
    (total / 100)
        .saturating_mul(pct)
        .saturating_add(total % 100 * pct / 100)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketStats {
    pub range: String,
    pub available: usize,
    pub requested: usize,
    pub sampled: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SamplingStats {
    pub original_size: usize,
    pub target_size: usize,
    pub actual_size: usize,
    pub ranges: Vec<BucketStats>,
}

#[derive(Debug, Clone)]
pub struct SamplingResult<R> {
    pub records: Vec<R>,
    pub stats: SamplingStats,
}

/// Draws a length-stratified subset of `records` according to `plan`.
///
/// Buckets with fewer records than their quota contribute everything they have; the shortfall is
/// not made up from other buckets. Records whose length falls in no bucket are never selected.
/// Output is grouped by bucket in plan order, and keeps input order inside a bucket.
///
/// # Arguments
///
/// * `records` - candidates, consumed
/// * `plan` - buckets and quotas
/// * `rng` - source of randomness, seed it for reproducible picks
pub fn sample_by_length<R, G>(records: Vec<R>, plan: &SamplingPlan, rng: &mut G) -> SamplingResult<R>
where
    R: SourceText,
    G: Rng + ?Sized,
{
    let original_size = records.len();
    let mut grouped: Vec<Vec<R>> = plan.buckets.iter().map(|_| Vec::new()).collect();
    for record in records {
        if let Some(i) = plan.bucket_of(record.source_len()) {
            grouped[i].push(record);
        }
    }

    let mut sampled_records = Vec::new();
    let mut ranges = Vec::with_capacity(plan.buckets.len());
    for ((bucket, quota), candidates) in plan.buckets.iter().zip(&plan.quotas).zip(grouped) {
        let available = candidates.len();
        let picked = draw(candidates, *quota, rng);
        ranges.push(BucketStats {
            range: bucket.label(),
            available,
            requested: *quota,
            sampled: picked.len(),
        });
        sampled_records.extend(picked);
    }

    SamplingResult {
        stats: SamplingStats {
            original_size,
            target_size: plan.target_size,
            actual_size: sampled_records.len(),
            ranges,
        },
        records: sampled_records,
    }
}

fn draw<R, G>(candidates: Vec<R>, quota: usize, rng: &mut G) -> Vec<R>
where
    G: Rng + ?Sized,
{
    if candidates.len() <= quota {
        return candidates;
    }
    let mut keep = vec![false; candidates.len()];
    for i in index::sample(rng, candidates.len(), quota) {
        keep[i] = true;
    }
    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}
