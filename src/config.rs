//! Hash table sizing configuration.

use crate::error::{Error, Result};

/// Smallest non-zero table size.
pub const MIN_SIZE: usize = 16;
/// Largest table size; growth past it fails with
/// [`Error::CollectionTooLarge`].
pub const MAX_CAPACITY: usize = 1 << 30;
pub const DEFAULT_LOAD_FACTOR: f32 = 0.70;
pub const MIN_LOAD_FACTOR: f32 = 0.25;
pub const MAX_LOAD_FACTOR: f32 = 0.95;

/// Construction settings for [`HashTable`](crate::HashTable).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HashTableConfig {
    /// Maximum ratio of used slots to capacity, within `[0.25, 0.95]`.
    pub load_factor: f32,
    /// Items to make room for up front.
    pub capacity: usize,
}

impl Default for HashTableConfig {
    fn default() -> Self {
        Self {
            load_factor: DEFAULT_LOAD_FACTOR,
            capacity: 0,
        }
    }
}

impl HashTableConfig {
    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        LoadFactor::new(self.load_factor)?;
        if self.capacity > MAX_CAPACITY {
            return Err(Error::invalid_configuration(format!(
                "capacity {} exceeds {}",
                self.capacity, MAX_CAPACITY
            )));
        }
        Ok(())
    }
}

/// A load factor known to be within `[0.25, 0.95]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct LoadFactor(f32);

impl LoadFactor {
    pub fn new(value: f32) -> Result<Self> {
        // Written so NaN fails too.
        if !(MIN_LOAD_FACTOR..=MAX_LOAD_FACTOR).contains(&value) {
            return Err(Error::invalid_configuration(format!(
                "load factor {} outside [{}, {}]",
                value, MIN_LOAD_FACTOR, MAX_LOAD_FACTOR
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Used slots a table of `size` may hold before it must grow.
    #[inline]
    pub(crate) fn grow_threshold(self, size: usize) -> usize {
        (size as f32 * self.0) as usize
    }

    /// Item count under which a table with `grow_threshold` shrinks. Small
    /// tables use 1, so they shrink only once empty.
    #[inline]
    pub(crate) fn shrink_threshold(grow_threshold: usize) -> usize {
        let shrink = grow_threshold / 3;
        if shrink <= MIN_SIZE {
            1
        } else {
            shrink
        }
    }
}

impl Default for LoadFactor {
    fn default() -> Self {
        Self(DEFAULT_LOAD_FACTOR)
    }
}
