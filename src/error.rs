//! Error type shared by both engines.

use thiserror::Error;

/// Failures reported by [`OrderedIndex`](crate::OrderedIndex) and
/// [`HashTable`](crate::HashTable).
///
/// None of these are transient: the engines are pure in-memory structures, so
/// an error is reported once and never retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Positional access outside `[0, len)`.
    #[error("index {index} out of range for collection of {len} items")]
    IndexOutOfRange {
        /// The rejected index
        index: usize,
        /// Number of items at the time of the call
        len: usize,
    },

    /// A lookup that requires the key to be present did not find it.
    #[error("key not found")]
    KeyNotFound,

    /// The structure changed between two pulls of a cursor.
    #[error("collection was modified while being enumerated")]
    ConcurrentModification,

    /// Growing the table would exceed the largest supported capacity.
    #[error("collection too large: room for {requested} items requested")]
    CollectionTooLarge {
        /// Number of occupied slots the growth had to accommodate
        requested: usize,
    },

    /// A configuration value was rejected.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// What was wrong with it
        message: String,
    },
}

impl Error {
    /// Create an index out of range error
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
