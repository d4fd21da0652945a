//! A scalable Bloom filter, a space-efficient probabilistic set that grows
//! with its contents.
//!
//! # Bloom Filters
//!
//! A Bloom filter is a space-efficient probabilistic data structure that is
//! used to test whether an element is a member of a set. It allows for queries
//! to return: "possibly in set" or "definitely not in set". Elements can be
//! added to the set, but not removed; the more elements that are added to the
//! set, the larger the probability of false positives.
//!
//! A plain Bloom filter must be sized up front for the number of items it
//! will hold. Past that capacity its false positive rate climbs quickly.
//!
//! # Scalable Bloom Filters
//!
//! [`ScalableBloomFilter`] starts with a single [`BloomFilter`] sized for
//! `initial_capacity` items at `initial_fp`, and appends a new generation each
//! time the newest one fills up. Generation `i` holds
//! `initial_capacity · growth_factor^i` items at a false positive rate of
//! `initial_fp · tightening_ratio^i`. Because the rates form a geometric
//! series, the compound false positive rate stays below
//! `initial_fp / (1 - tightening_ratio)` no matter how many items are added.
//!
//! # Double Hashing
//!
//! Double hashing is used to set bit positions within a bit vector. It was
//! shown to be effective without any loss in the asymptotic false positive
//! probability by Adam Kirsch and Michael Mitzenmacher in a paper called
//! *Less Hashing, Same Performance: Building a Better Bloom Filter*.
//!
//! g<sub>i</sub>(x) = (H<sub>1</sub>(x) + iH<sub>2</sub>(x)) mod m, where
//! H<sub>1</sub> and H<sub>2</sub> are the two low 32-bit words of a 128-bit
//! SipHash digest.
//!
//! # Example
//!
//! ```
//! use sbloom::{Config, ScalableBloomFilter};
//!
//! let filter = ScalableBloomFilter::new(Config::default()).unwrap();
//!
//! filter.insert("foo");
//! filter.insert("bar");
//!
//! assert!(filter.contains("foo"));
//! assert!(filter.contains("bar"));
//! assert_eq!(filter.generations(), 1);
//! ```
#![warn(missing_docs)]
#![allow(clippy::bool_assert_comparison)]

pub mod bitvec;
pub mod bloom;
pub mod config;
pub mod error;
pub mod scalable;

pub use bloom::BloomFilter;
pub use config::{Config, Saturation};
pub use error::{Error, LoadError};
pub use scalable::{GenerationInfo, ScalableBloomFilter};
