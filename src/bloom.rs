// Copyright (c) 2018 Aleksandr Bezobchuk
// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! A fixed-capacity Bloom filter using double hashing.

use std::f64;
use std::fmt;
use std::hash::Hasher;

use parking_lot::RwLock;
use siphasher::sip128::{Hasher128, SipHasher13};

use crate::bitvec::BitVec;
use crate::error::Error;

/// The default false positive probability value, 1%.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// `ln` squared.
const LN_SQR: f64 = f64::consts::LN_2 * f64::consts::LN_2;

/// Key used for SipHash.
const HASHER_KEY: [u8; 16] = [
    136, 168, 28, 251, 141, 239, 69, 38, 166, 209, 98, 201, 2, 169, 146, 170,
];

/// Mutable part of a filter, guarded by a single lock.
struct State {
    bits: BitVec,
    /// Number of inserts that set at least one new bit.
    len: usize,
}

/// A Bloom filter over byte sequences, sized for a fixed capacity.
///
/// The filter is internally synchronized: inserts take an exclusive lock on
/// the bit array and queries a shared one, so a filter can be shared between
/// threads as is.
pub struct BloomFilter {
    state: RwLock<State>,
    nbits: usize,
    nhashes: usize,
    capacity: usize,
    fp_rate: f64,
}

impl BloomFilter {
    /// Return a new Bloom filter with a given approximate item capacity.
    /// The false positive probability is [`DEFAULT_FALSE_POSITIVE_RATE`].
    pub fn new(capacity: usize) -> Result<Self, Error> {
        Self::with_rate(capacity, DEFAULT_FALSE_POSITIVE_RATE)
    }

    /// Return a new Bloom filter with a given approximate item capacity
    /// and a desired false positive rate.
    pub fn with_rate(capacity: usize, fp_rate: f64) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity);
        }
        if !(fp_rate > 0. && fp_rate < 1.) {
            return Err(Error::InvalidFalsePositiveRate(fp_rate));
        }
        Ok(Self::from_params(capacity, fp_rate))
    }

    /// Build a filter from parameters already known to be in range.
    pub(crate) fn from_params(capacity: usize, fp_rate: f64) -> Self {
        let nbits = optimal_bits(capacity, fp_rate).max(1);
        let nhashes = optimal_hashes(nbits, capacity);

        Self {
            state: RwLock::new(State {
                bits: BitVec::new(nbits),
                len: 0,
            }),
            nbits,
            nhashes,
            capacity,
            fp_rate,
        }
    }

    /// Set an item in the Bloom filter.
    ///
    /// Returns `true` if at least one bit was newly set, ie. the item was
    /// probably not in the filter before. A `false` return may also be a
    /// false positive of a new item.
    pub fn insert<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> bool {
        let (h1, h2) = seeds(item.as_ref());
        let mut state = self.state.write();
        let mut fresh = false;

        for i in 0..self.nhashes {
            fresh |= state.bits.test_and_set(self.index(h1, h2, i as u64));
        }
        if fresh {
            state.len += 1;
        }
        fresh
    }

    /// Return whether or not a given item is likely in the Bloom filter or not. There is a
    /// possibility for a false positive with the probability being under the Bloom filter's `p`
    /// value, but a false negative will never occur.
    pub fn contains<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> bool {
        let (h1, h2) = seeds(item.as_ref());
        let state = self.state.read();

        (0..self.nhashes).all(|i| state.bits.is_set(self.index(h1, h2, i as u64)))
    }

    /// Return the number of bits in this filter (`m` parameter).
    pub fn bits(&self) -> usize {
        self.nbits
    }

    /// Number of hashes used (`k` parameter).
    pub fn hashes(&self) -> usize {
        self.nhashes
    }

    /// Number of items the filter was sized for (`n` parameter).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Target false positive rate the filter was sized for (`p` parameter).
    pub fn fp_rate(&self) -> f64 {
        self.fp_rate
    }

    /// Number of inserts that set at least one new bit. Repeated items, and
    /// new items colliding with existing ones, aren't counted.
    pub fn len(&self) -> usize {
        self.state.read().len
    }

    /// Whether nothing was inserted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the filter holds as many items as it was sized for.
    pub fn is_saturated(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Count the approximate number of items in the filter, from the density
    /// of set bits.
    pub fn count(&self) -> usize {
        let nbits = self.nbits as f64;
        let nbits_set = self.state.read().bits.count_ones() as f64;
        let nhashes = self.nhashes as f64;
        let count = -(nbits / nhashes) * (1. - (nbits_set / nbits)).ln();

        count.round() as usize
    }

    /// The false positive rate expected at the current fill level.
    pub fn estimated_fp_rate(&self) -> f64 {
        false_positive_rate(self.nbits, self.len(), self.nhashes)
    }

    fn index(&self, h1: u32, h2: u32, i: u64) -> usize {
        let r = (h1 as u64).wrapping_add(i.wrapping_mul(h2 as u64));
        (r % self.nbits as u64) as usize
    }
}

impl fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("bits", &self.nbits)
            .field("hashes", &self.nhashes)
            .field("capacity", &self.capacity)
            .field("fp_rate", &self.fp_rate)
            .field("len", &self.len())
            .finish()
    }
}

/// Derive the two double hashing seeds from a 128-bit digest of the item.
fn seeds(item: &[u8]) -> (u32, u32) {
    let mut sip = SipHasher13::new_with_key(&HASHER_KEY);
    sip.write(item);

    let digest = sip.finish128();

    (digest.h1 as u32, (digest.h1 >> 32) as u32)
}

/// Return the optimal bit vector size for a Bloom filter given an approximate
/// size and a desired false positive rate.
pub fn optimal_bits(capacity: usize, fp_rate: f64) -> usize {
    (-((fp_rate.ln() * (capacity as f64)) / LN_SQR)).ceil() as usize
}

/// Return the optimal number of hash functions for a Bloom filter given a
/// bit vector size and an approximate set size.
///
/// Also called `k`. Never less than one.
pub fn optimal_hashes(nbits: usize, capacity: usize) -> usize {
    let k = ((nbits as f64 / capacity as f64) * f64::consts::LN_2).round() as usize;
    k.max(1)
}

/// Return the false positive rate of a filter of `nbits` bits and `nhashes`
/// hashes holding `len` items: `(1 - e^(-kn/m))^k`.
pub fn false_positive_rate(nbits: usize, len: usize, nhashes: usize) -> f64 {
    if nbits == 0 {
        return 1.;
    }
    let exponent = -(nhashes as f64) * (len as f64) / (nbits as f64);
    (1. - exponent.exp()).powi(nhashes as i32)
}
