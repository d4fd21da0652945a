// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! A Bloom filter that grows by stacking generations of fixed-size filters.
//!
//! Generation `i` is sized for `n0·g^i` items at a false positive rate of
//! `p0·r^i`, so the compound false positive rate stays under
//! `p0 / (1 - r)` however many generations are added.

use parking_lot::RwLock;
use tracing::debug;

use crate::bloom::BloomFilter;
use crate::config::{Config, Saturation};
use crate::error::Error;

/// Design parameters and fill level of one generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationInfo {
    /// Number of items the generation was sized for.
    pub capacity: usize,
    /// Target false positive rate of the generation.
    pub fp_rate: f64,
    /// Size of the bit array.
    pub bits: usize,
    /// Number of hashes.
    pub hashes: usize,
    /// Inserts that set at least one new bit.
    pub len: usize,
}

/// A scalable Bloom filter.
///
/// Inserts always go to the newest generation; queries check every
/// generation, oldest first. Filters are only ever appended.
#[derive(Debug)]
pub struct ScalableBloomFilter {
    filters: RwLock<Vec<BloomFilter>>,
    config: Config,
}

impl ScalableBloomFilter {
    /// Create an empty filter. No generation is allocated until the first insert.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            filters: RwLock::new(Vec::new()),
            config,
        })
    }

    /// Add an item to the filter, growing it if the newest generation is full.
    pub fn insert<T: AsRef<[u8]> + ?Sized>(&self, item: &T) {
        let mut filters = self.filters.write();

        match self.config.saturation {
            Saturation::Capacity => {
                if filters.last().map_or(true, BloomFilter::is_saturated) {
                    let filter = self.generation(filters.len());
                    filters.push(filter);
                }
                if let Some(filter) = filters.last() {
                    filter.insert(item);
                }
            }
            Saturation::Collision => {
                let fresh = filters.last().map_or(false, |f| f.insert(item));

                if !fresh {
                    let filter = self.generation(filters.len());
                    filter.insert(item);
                    filters.push(filter);
                }
            }
        }
    }

    /// Return whether the item is likely in the filter. Never returns `false`
    /// for an inserted item.
    pub fn contains<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> bool {
        self.filters.read().iter().any(|f| f.contains(item))
    }

    /// Number of generations created so far.
    pub fn generations(&self) -> usize {
        self.filters.read().len()
    }

    /// Parameters of every generation, oldest first.
    pub fn generation_params(&self) -> Vec<GenerationInfo> {
        self.filters
            .read()
            .iter()
            .map(|f| GenerationInfo {
                capacity: f.capacity(),
                fp_rate: f.fp_rate(),
                bits: f.bits(),
                hashes: f.hashes(),
                len: f.len(),
            })
            .collect()
    }

    /// Inserts that set at least one new bit, across all generations.
    pub fn len(&self) -> usize {
        self.filters.read().iter().map(BloomFilter::len).sum()
    }

    /// Whether nothing was inserted yet.
    pub fn is_empty(&self) -> bool {
        self.filters.read().is_empty()
    }

    /// Total size of all bit arrays.
    pub fn total_bits(&self) -> usize {
        self.filters.read().iter().map(BloomFilter::bits).sum()
    }

    /// Upper bound of the compound false positive rate once every existing
    /// generation is filled to capacity: `1 - Π(1 - p_i)`.
    pub fn false_positive_bound(&self) -> f64 {
        1. - self
            .filters
            .read()
            .iter()
            .map(|f| 1. - f.fp_rate())
            .product::<f64>()
    }

    /// The configuration this filter was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build generation `i`.
    fn generation(&self, i: usize) -> BloomFilter {
        let (capacity, fp_rate) = generation_params(&self.config, i);

        debug!(
            generation = i,
            capacity, fp_rate, "Creating new bloom filter generation"
        );
        BloomFilter::from_params(capacity, fp_rate)
    }
}

/// Largest capacity of a single generation. Indices come from 32-bit seeds,
/// so bigger filters wouldn't spread items any better.
const MAX_GENERATION_CAPACITY: usize = u32::MAX as usize;

/// Capacity and false positive rate of generation `i`, kept constructible
/// when the geometric series over- or underflows.
fn generation_params(config: &Config, i: usize) -> (usize, f64) {
    let exp = i32::try_from(i).unwrap_or(i32::MAX);
    let capacity = (config.initial_capacity as f64 * config.growth_factor.powi(exp)).ceil();
    let fp_rate = config.initial_fp * config.tightening_ratio.powi(exp);

    (
        (capacity as usize).clamp(1, MAX_GENERATION_CAPACITY),
        fp_rate.max(f64::MIN_POSITIVE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::optimal_bits;
    use std::iter;

    fn key() -> String {
        let rng = fastrand::Rng::new();
        iter::repeat_with(|| rng.alphanumeric()).take(32).collect()
    }

    fn config(capacity: i64) -> Config {
        Config {
            initial_capacity: capacity,
            saturation: Saturation::Capacity,
            ..Config::default()
        }
    }

    #[test]
    fn test_starts_empty() {
        let sbf = ScalableBloomFilter::new(Config::default()).unwrap();

        assert_eq!(sbf.generations(), 0);
        assert!(sbf.is_empty());
        assert_eq!(sbf.total_bits(), 0);
        assert_eq!(sbf.false_positive_bound(), 0.);
        assert!(!sbf.contains("apple"));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let err = ScalableBloomFilter::new(config(-5)).unwrap_err();
        assert_eq!(err, Error::InvalidInitialCapacity(-5));
    }

    #[test]
    fn test_generation_params() {
        let config = Config {
            initial_fp: 0.01,
            growth_factor: 1.5,
            tightening_ratio: 0.5,
            initial_capacity: 3,
            saturation: Saturation::Capacity,
        };
        assert_eq!(generation_params(&config, 0), (3, 0.01));
        assert_eq!(generation_params(&config, 1), (5, 0.005));
        assert_eq!(generation_params(&config, 2), (7, 0.0025));

        let (capacity, fp_rate) = generation_params(&config, usize::MAX);
        assert!(capacity >= 1);
        assert!(fp_rate > 0.);
    }

    #[test]
    fn test_generation_params_overflow() {
        let config = Config {
            growth_factor: 1e30,
            initial_capacity: 1,
            ..Config::default()
        };
        assert_eq!(generation_params(&config, 0), (1, 0.01));
        assert_eq!(generation_params(&config, 2).0, MAX_GENERATION_CAPACITY);
        assert_eq!(generation_params(&config, 1000).0, MAX_GENERATION_CAPACITY);

        let (capacity, fp_rate) = generation_params(&config, 1000);
        assert!(optimal_bits(capacity, fp_rate) < usize::MAX);
    }

    #[test]
    fn test_generations_follow_config() {
        let sbf = ScalableBloomFilter::new(config(10)).unwrap();

        for _ in 0..100 {
            sbf.insert(&key());
        }
        let params = sbf.generation_params();
        assert_eq!(params.len(), 4);

        for (i, p) in params.iter().enumerate() {
            let capacity = 10 * 2usize.pow(i as u32);
            let fp_rate = 0.01 * 0.5f64.powi(i as i32);
            let bloom = BloomFilter::with_rate(capacity, fp_rate).unwrap();

            assert_eq!(p.capacity, capacity);
            assert_eq!(p.fp_rate, fp_rate);
            assert_eq!(p.bits, bloom.bits());
            assert_eq!(p.hashes, bloom.hashes());
        }
        // Every generation but the newest is full.
        for p in &params[..params.len() - 1] {
            assert_eq!(p.len, p.capacity);
        }
        assert!(sbf.len() > 70 && sbf.len() <= 100, "len was {}", sbf.len());
    }

    #[test]
    fn test_growth_is_monotonic() {
        let sbf = ScalableBloomFilter::new(config(50)).unwrap();
        let mut generations = 0;

        for _ in 0..100 {
            sbf.insert(&key());
            assert!(sbf.generations() >= generations);
            generations = sbf.generations();
        }
        assert_eq!(generations, 2, "more than one generation's worth of items");
    }

    #[test]
    fn test_duplicates_keep_capacity() {
        let sbf = ScalableBloomFilter::new(config(10)).unwrap();

        for _ in 0..11 {
            sbf.insert("apple");
        }
        assert_eq!(sbf.generations(), 1);
        assert_eq!(sbf.len(), 1);
    }

    #[test]
    fn test_no_false_negatives() {
        let sbf = ScalableBloomFilter::new(config(100)).unwrap();
        let items: Vec<_> = iter::repeat_with(key).take(2000).collect();

        for (i, item) in items.iter().enumerate() {
            sbf.insert(item);
            assert!(sbf.contains(item), "item {} missing after insert", item);

            if i % 250 == 0 {
                for prev in &items[..=i] {
                    assert!(sbf.contains(prev), "item {} resulted in a false negative", prev);
                }
            }
        }
        for item in &items {
            assert!(sbf.contains(item), "item {} resulted in a false negative", item);
        }
    }

    #[test]
    fn test_collision_saturation() {
        let sbf =
            ScalableBloomFilter::new(config(4).with_saturation(Saturation::Collision)).unwrap();
        let items: Vec<_> = iter::repeat_with(key).take(500).collect();

        for item in &items {
            sbf.insert(item);
        }
        for item in &items {
            assert!(sbf.contains(item), "item {} resulted in a false negative", item);
        }
        assert!(sbf.generations() > 1);

        // A repeated insert sets no new bit, which opens a new generation.
        let generations = sbf.generations();
        sbf.insert(&items[499]);
        assert_eq!(sbf.generations(), generations + 1);
        assert_eq!(sbf.generation_params().last().map(|p| p.len), Some(1));
    }

    #[test]
    fn test_false_positive_bound() {
        let sbf = ScalableBloomFilter::new(config(10)).unwrap();

        for _ in 0..70 {
            sbf.insert(&key());
        }
        // Generations sized 10, 20, 40.
        assert_eq!(sbf.generations(), 3);

        let expected = 1. - (1. - 0.01) * (1. - 0.005) * (1. - 0.0025);
        assert!((sbf.false_positive_bound() - expected).abs() < 1e-12);
        assert!(sbf.false_positive_bound() < 0.01 / (1. - 0.5));
    }

    #[test]
    fn test_idempotent_query() {
        let sbf = ScalableBloomFilter::new(Config::default()).unwrap();
        sbf.insert("apple");

        for item in ["apple", "kiwi", ""] {
            let first = sbf.contains(item);
            for _ in 0..10 {
                assert_eq!(sbf.contains(item), first);
            }
        }
    }
}
