// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Error types.
use thiserror::Error;

/// Errors raised while constructing a filter.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum Error {
    /// Tightening ratio must lie in `(0, 1)`.
    #[error("invalid tightening ratio {0}: must be between 0 and 1")]
    InvalidTighteningRatio(f64),

    /// Growth factor must be finite and greater than one.
    #[error("invalid growth factor {0}: must be greater than 1")]
    InvalidGrowthFactor(f64),

    /// Initial false positive rate must lie in `(0, 1)`.
    #[error("invalid initial false positive rate {0}: must be between 0 and 1")]
    InvalidInitialFp(f64),

    /// Initial capacity must be positive.
    #[error("invalid initial capacity {0}: must be greater than 0")]
    InvalidInitialCapacity(i64),

    /// A Bloom filter can't be built for zero items.
    #[error("invalid capacity: must be greater than 0")]
    InvalidCapacity,

    /// A Bloom filter's false positive rate must lie in `(0, 1)`.
    #[error("invalid false positive rate {0}: must be between 0 and 1")]
    InvalidFalsePositiveRate(f64),
}

/// Errors raised while loading a [`crate::Config`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The configuration could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid JSON for a config record.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration parsed but its values are out of range.
    #[error(transparent)]
    Invalid(#[from] Error),
}
