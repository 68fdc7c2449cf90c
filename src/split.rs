// Train / validation split for the template converters

use std::path::PathBuf;

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    pub fraction: f64,
    pub validation_output: PathBuf,
    pub seed: Option<u64>,
}

impl SplitConfig {
    /// Checks the split flags before any file is touched.
    ///
    /// A fraction of `0` means no split and yields `None`, whatever the other flags say.
    pub fn new(
        fraction: f64,
        validation_output: Option<PathBuf>,
        seed: Option<u64>,
    ) -> Result<Option<Self>> {
        if !fraction.is_finite() || fraction < 0.0 {
            bail!("validation split must be between 0.0 and 1.0, got {}", fraction);
        }
        if fraction == 0.0 {
            return Ok(None);
        }
        if fraction >= 1.0 {
            bail!("validation split must be less than 1.0");
        }
        let Some(validation_output) = validation_output else {
            bail!("--validation-output is required when --validation-split > 0");
        };
        Ok(Some(Self {
            fraction,
            validation_output,
            seed,
        }))
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Number of validation items for `total` items, rounded down.
    pub fn validation_size(&self, total: usize) -> usize {
        (total as f64 * self.fraction).floor() as usize
    }
}

/// Partitions `items` into (train, validation), both in their original order.
pub fn split_records<T, G>(items: Vec<T>, validation_size: usize, rng: &mut G) -> (Vec<T>, Vec<T>)
where
    G: Rng + ?Sized,
{
    let total = items.len();
    let validation_size = validation_size.min(total);
    let mut is_validation = vec![false; total];
    for i in index::sample(rng, total, validation_size) {
        is_validation[i] = true;
    }
    let mut train = Vec::with_capacity(total - validation_size);
    let mut validation = Vec::with_capacity(validation_size);
    for (item, to_validation) in items.into_iter().zip(is_validation) {
        if to_validation {
            validation.push(item);
        } else {
            train.push(item);
        }
    }
    (train, validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_fraction_means_no_split() {
        assert_eq!(SplitConfig::new(0.0, None, None).unwrap(), None);
    }

    #[test]
    fn test_invalid_fractions() {
        let out = Some(PathBuf::from("val.jsonl"));
        assert!(SplitConfig::new(1.0, out.clone(), None).is_err());
        assert!(SplitConfig::new(1.5, out.clone(), None).is_err());
        assert!(SplitConfig::new(-0.1, out.clone(), None).is_err());
        assert!(SplitConfig::new(f64::NAN, out, None).is_err());
    }

    #[test]
    fn test_missing_validation_output() {
        let err = SplitConfig::new(0.2, None, Some(1)).unwrap_err();
        assert!(err.to_string().contains("--validation-output"));
    }

    #[test]
    fn test_validation_size_rounds_down() {
        let config = SplitConfig::new(0.25, Some(PathBuf::from("v.jsonl")), None)
            .unwrap()
            .unwrap();
        assert_eq!(config.validation_size(10), 2);
        assert_eq!(config.validation_size(3), 0);
        assert_eq!(config.validation_size(100), 25);
    }

    #[test]
    fn test_split_keeps_order_and_sizes() {
        let config = SplitConfig::new(0.3, Some(PathBuf::from("v.jsonl")), Some(7))
            .unwrap()
            .unwrap();
        let items: Vec<usize> = (0..20).collect();
        let (train, validation) = split_records(items, config.validation_size(20), &mut config.rng());
        assert_eq!(validation.len(), 6);
        assert_eq!(train.len(), 14);
        assert!(train.windows(2).all(|w| w[0] < w[1]));
        assert!(validation.windows(2).all(|w| w[0] < w[1]));
        let mut all: Vec<usize> = train.iter().chain(validation.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_seeded_split_is_reproducible() {
        let config = SplitConfig::new(0.5, Some(PathBuf::from("v.jsonl")), Some(42))
            .unwrap()
            .unwrap();
        let first = split_records((0..50).collect::<Vec<_>>(), 25, &mut config.rng());
        let second = split_records((0..50).collect::<Vec<_>>(), 25, &mut config.rng());
        assert_eq!(first, second);
    }
}
