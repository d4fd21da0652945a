// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Scalable filter configuration.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, LoadError};

/// When the newest generation of a [`crate::ScalableBloomFilter`] is considered full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Saturation {
    /// Full as soon as an insert sets no new bit. Hash collisions on a young
    /// filter trigger this early, and a crowded filter may never trigger it.
    #[default]
    Collision,
    /// Full once the number of newly inserted items reaches the designed
    /// capacity, whatever the hashes do.
    Capacity,
}

/// Parameters of a scalable Bloom filter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// False positive rate of the first generation.
    pub initial_fp: f64,
    /// Factor by which each generation's capacity grows.
    pub growth_factor: f64,
    /// Factor by which each generation's false positive rate shrinks.
    pub tightening_ratio: f64,
    /// Expected number of items of the first generation.
    pub initial_capacity: i64,
    /// Generation saturation policy.
    #[serde(default)]
    pub saturation: Saturation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_fp: 0.01,
            growth_factor: 2.0,
            tightening_ratio: 0.5,
            initial_capacity: 1000,
            saturation: Saturation::default(),
        }
    }
}

impl Config {
    /// Read and validate a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let json = fs::read_to_string(path)?;

        Self::from_json(&json)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;

        Ok(config)
    }

    /// Set the saturation policy.
    pub fn with_saturation(mut self, saturation: Saturation) -> Self {
        self.saturation = saturation;
        self
    }

    /// Check that every parameter is in range.
    pub fn validate(&self) -> Result<(), Error> {
        // Negated comparisons so that NaN is rejected too.
        if !(self.tightening_ratio > 0. && self.tightening_ratio < 1.) {
            return Err(Error::InvalidTighteningRatio(self.tightening_ratio));
        }
        if !(self.growth_factor > 1. && self.growth_factor.is_finite()) {
            return Err(Error::InvalidGrowthFactor(self.growth_factor));
        }
        if !(self.initial_fp > 0. && self.initial_fp < 1.) {
            return Err(Error::InvalidInitialFp(self.initial_fp));
        }
        if self.initial_capacity <= 0 {
            return Err(Error::InvalidInitialCapacity(self.initial_capacity));
        }
        Ok(())
    }
}
