//! HashTable: open addressing with double hashing and per-slot collision
//! markers.

use core::fmt;
use core::hash::Hash;

use crate::change_stamp::{ChangeStamp, Snapshot};
use crate::config::{HashTableConfig, LoadFactor, MAX_CAPACITY, MIN_SIZE};
use crate::equivalence::{Equivalence, Hashed};
use crate::error::{Error, Result};
use crate::policy::Insertion;
use crate::slot::Slot;

/// Unique items under an [`Equivalence`], with expected O(1) insert, find and
/// delete.
///
/// Capacity is zero or a power of two. The table grows by doubling when the
/// slots in use would exceed `capacity * load_factor` and shrinks when the
/// item count falls under a third of that. Deleted slots keep their
/// collision marker and stay counted as used until the next rehash.
#[derive(Clone)]
pub struct HashTable<T, E = Hashed> {
    slots: Vec<Slot<T>>,
    equivalence: E,
    load_factor: LoadFactor,
    count: usize,
    // Occupied or collision-marked slots.
    used_slots: usize,
    threshold_grow: usize,
    threshold_shrink: usize,
    mask: u32,
    secondary_shift: u32,
    stamp: ChangeStamp,
}

impl<T: Hash + Eq> HashTable<T> {
    pub fn new() -> Self {
        Self::with_equivalence(Hashed::default())
    }
}

impl<T: Hash + Eq> Default for HashTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E: Equivalence<T>> HashTable<T, E> {
    pub fn with_equivalence(equivalence: E) -> Self {
        let load_factor = LoadFactor::default();
        Self {
            slots: Vec::new(),
            equivalence,
            load_factor,
            count: 0,
            used_slots: 0,
            threshold_grow: 0,
            threshold_shrink: LoadFactor::shrink_threshold(0),
            mask: 0,
            secondary_shift: 0,
            stamp: ChangeStamp::new(),
        }
    }

    /// Validate `config`, then build a table with room for
    /// `config.capacity` items.
    pub fn with_config(config: HashTableConfig, equivalence: E) -> Result<Self> {
        config.validate()?;
        let mut table = Self::with_equivalence(equivalence);
        table.load_factor = LoadFactor::new(config.load_factor)?;
        table.reserve(config.capacity)?;
        Ok(table)
    }

    pub fn equivalence(&self) -> &E {
        &self.equivalence
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of slots in the backing array.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor.get()
    }

    /// Change the load factor. A lower factor may grow the table right away,
    /// a higher one may shrink it.
    pub fn set_load_factor(&mut self, load_factor: f32) -> Result<()> {
        let load_factor = LoadFactor::new(load_factor)?;
        log::debug!(
            "hash table load factor {} -> {}",
            self.load_factor.get(),
            load_factor.get()
        );
        self.stamp.bump();
        let tighter = load_factor < self.load_factor;
        self.load_factor = load_factor;
        self.configure(self.slots.len());
        if tighter {
            self.ensure_slots(0)
        } else {
            self.shrink_if_needed();
            Ok(())
        }
    }

    /// Make room for `additional` more used slots without further growth.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.ensure_slots(additional)
    }

    /// Insert `item`. An equivalent stored item is overwritten when
    /// `replace_on_duplicate` is set, otherwise kept and reported.
    ///
    /// Fails only if the table would have to grow past its maximum capacity.
    pub fn insert(&mut self, item: T, replace_on_duplicate: bool) -> Result<Insertion<'_, T>> {
        self.stamp.bump();
        self.ensure_slots(1)?;

        let hash = self.full_hash(&item);
        let (mut bucket, skip) = self.probe_start(hash);
        let mut empty = None;
        let mut duplicate_possible = true;

        let target = loop {
            let slot = &mut self.slots[bucket];
            if slot.is_empty() {
                let target = *empty.get_or_insert(bucket);
                // A clear marker here, or earlier on an occupied slot, ends
                // every chain that could hold a duplicate.
                if !duplicate_possible || !slot.collision() {
                    break target;
                }
            } else if slot.hash() == hash
                && slot
                    .item()
                    .is_some_and(|stored| self.equivalence.equivalent(stored, &item))
            {
                return Ok(if replace_on_duplicate {
                    Insertion::Replaced(slot.replace(item))
                } else {
                    Insertion::Duplicate {
                        rejected: item,
                        existing: self.slots[bucket].stored(),
                    }
                });
            } else if empty.is_none() {
                slot.mark_collision();
            } else if !slot.collision() {
                duplicate_possible = false;
            }
            bucket = (bucket + skip) & self.mask as usize;
        };

        let slot = &mut self.slots[target];
        if !slot.collision() {
            self.used_slots += 1;
        }
        slot.fill(hash, item);
        self.count += 1;
        Ok(Insertion::Inserted)
    }

    /// The stored item equivalent to `key`.
    pub fn find(&self, key: &T) -> Option<&T> {
        self.find_slot(key).and_then(|bucket| self.slots[bucket].item())
    }

    /// Like [`find`](Self::find), but absence is an error.
    pub fn lookup(&self, key: &T) -> Result<&T> {
        self.find(key).ok_or(Error::KeyNotFound)
    }

    pub fn contains(&self, key: &T) -> bool {
        self.find_slot(key).is_some()
    }

    /// Overwrite the stored item equivalent to `item`, returning it. When
    /// nothing is equivalent, `item` is handed back.
    pub fn replace(&mut self, item: T) -> core::result::Result<T, T> {
        match self.find_slot(&item) {
            Some(bucket) => Ok(self.slots[bucket].replace(item)),
            None => Err(item),
        }
    }

    /// Remove and return the item equivalent to `key`.
    pub fn delete(&mut self, key: &T) -> Option<T> {
        let bucket = self.find_slot(key)?;
        let slot = &mut self.slots[bucket];
        let marked = slot.collision();
        let item = slot.take()?;
        self.count -= 1;
        if !marked {
            self.used_slots -= 1;
        }
        self.stamp.bump();
        self.shrink_if_needed();
        Some(item)
    }

    pub fn clear(&mut self) {
        log::trace!("hash table cleared ({} items)", self.count);
        self.stamp.bump();
        self.slots = Vec::new();
        self.count = 0;
        self.used_slots = 0;
        self.configure(0);
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.count,
        }
    }

    /// A detached cursor over every item; see [`SlotCursor`].
    pub fn cursor(&self) -> SlotCursor {
        SlotCursor {
            position: 0,
            snapshot: self.stamp.snapshot(),
        }
    }

    /// Copy the table, mapping each item through `transform`. The transform
    /// must keep every item's hash and equivalence class.
    pub fn clone_with<F>(&self, mut transform: F) -> Self
    where
        F: FnMut(&T) -> T,
        E: Clone,
    {
        Self {
            slots: self
                .slots
                .iter()
                .map(|slot| slot.map_with(&mut transform))
                .collect(),
            equivalence: self.equivalence.clone(),
            load_factor: self.load_factor,
            count: self.count,
            used_slots: self.used_slots,
            threshold_grow: self.threshold_grow,
            threshold_shrink: self.threshold_shrink,
            mask: self.mask,
            secondary_shift: self.secondary_shift,
            stamp: ChangeStamp::new(),
        }
    }

    /// Equivalence hash folded to 31 bits, mixed, never zero.
    fn full_hash(&self, item: &T) -> u32 {
        let wide = self.equivalence.hash(item);
        let mut h = (wide ^ (wide >> 32)) as u32;
        h = h.wrapping_add(!(h << 15));
        h ^= h >> 10;
        h = h.wrapping_add(h << 3);
        h ^= h >> 6;
        h = h.wrapping_add(!(h << 11));
        h ^= h >> 16;
        h &= 0x7FFF_FFFF;
        if h == 0 {
            0x7FFF_FFFF
        } else {
            h
        }
    }

    /// Initial bucket and odd probe step for `hash`.
    #[inline]
    fn probe_start(&self, hash: u32) -> (usize, usize) {
        let bucket = hash & self.mask;
        let skip = ((hash >> self.secondary_shift) & self.mask) | 1;
        (bucket as usize, skip as usize)
    }

    fn find_slot(&self, key: &T) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let hash = self.full_hash(key);
        let (mut bucket, skip) = self.probe_start(hash);
        loop {
            let slot = &self.slots[bucket];
            if slot.hash() == hash
                && slot
                    .item()
                    .is_some_and(|stored| self.equivalence.equivalent(stored, key))
            {
                return Some(bucket);
            }
            if !slot.collision() {
                return None;
            }
            bucket = (bucket + skip) & self.mask as usize;
        }
    }

    /// Recompute the size-derived fields for a table of `size` slots.
    fn configure(&mut self, size: usize) {
        debug_assert!(size == 0 || size.is_power_of_two());
        self.threshold_grow = self.load_factor.grow_threshold(size);
        self.threshold_shrink = LoadFactor::shrink_threshold(self.threshold_grow);
        if size == 0 {
            self.mask = 0;
            self.secondary_shift = 0;
        } else {
            self.mask = (size - 1) as u32;
            self.secondary_shift = 31 - size.trailing_zeros();
        }
    }

    /// Grow, if needed, so `additional` more used slots fit under the
    /// threshold.
    fn ensure_slots(&mut self, additional: usize) -> Result<()> {
        let needed = self
            .used_slots
            .checked_add(additional)
            .ok_or(Error::CollectionTooLarge {
                requested: usize::MAX,
            })?;
        if needed <= self.threshold_grow {
            return Ok(());
        }
        let mut size = self.slots.len().max(MIN_SIZE);
        while self.load_factor.grow_threshold(size) < needed {
            size = size
                .checked_mul(2)
                .filter(|&doubled| doubled <= MAX_CAPACITY)
                .ok_or(Error::CollectionTooLarge { requested: needed })?;
        }
        self.resize(size);
        Ok(())
    }

    fn shrink_if_needed(&mut self) {
        if self.count >= self.threshold_shrink {
            return;
        }
        let size = if self.count == 0 {
            0
        } else {
            let mut size = MIN_SIZE;
            while self.load_factor.grow_threshold(size) < self.count {
                size *= 2;
            }
            size
        };
        if size == 0 && self.slots.is_empty() {
            return;
        }
        self.resize(size);
    }

    /// Rehash every live item into a fresh array of `size` slots.
    fn resize(&mut self, size: usize) {
        log::debug!(
            "hash table resize {} -> {} slots ({} items, {} used)",
            self.slots.len(),
            size,
            self.count,
            self.used_slots
        );
        let mut fresh = Vec::with_capacity(size);
        fresh.resize_with(size, Slot::empty);
        let old = core::mem::replace(&mut self.slots, fresh);
        self.configure(size);
        for (hash, item) in old.into_iter().filter_map(Slot::into_parts) {
            self.place(hash, item);
        }
        self.used_slots = self.count;
        self.stamp.bump();
    }

    /// Put an item known to be absent into the first empty slot of its probe
    /// sequence.
    fn place(&mut self, hash: u32, item: T) {
        let (mut bucket, skip) = self.probe_start(hash);
        loop {
            let slot = &mut self.slots[bucket];
            if slot.is_empty() {
                slot.fill(hash, item);
                return;
            }
            slot.mark_collision();
            bucket = (bucket + skip) & self.mask as usize;
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> core::result::Result<(), String> {
        let size = self.slots.len();
        if size != 0 && !(size.is_power_of_two() && size >= MIN_SIZE && size <= MAX_CAPACITY) {
            return Err(format!("bad capacity {}", size));
        }
        let occupied = self.slots.iter().filter(|s| !s.is_empty()).count();
        if occupied != self.count {
            return Err(format!("count {} but {} occupied", self.count, occupied));
        }
        let used = self
            .slots
            .iter()
            .filter(|s| !s.is_empty() || s.collision())
            .count();
        if used != self.used_slots {
            return Err(format!("used {} but {} in use", self.used_slots, used));
        }
        if size != 0 && self.used_slots > self.threshold_grow {
            return Err(format!(
                "used {} over threshold {}",
                self.used_slots, self.threshold_grow
            ));
        }
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(item) = slot.item() {
                if slot.hash() != self.full_hash(item) {
                    return Err(format!("slot {} holds a stale hash", index));
                }
                if self.find_slot(item) != Some(index) {
                    return Err(format!("slot {} unreachable by probing", index));
                }
            }
        }
        Ok(())
    }
}

impl<T: fmt::Debug, E> fmt::Debug for HashTable<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.slots.iter().filter_map(Slot::item))
            .finish()
    }
}

impl<'a, T, E: Equivalence<T>> IntoIterator for &'a HashTable<T, E> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a table's items in slot order.
pub struct Iter<'a, T> {
    slots: core::slice::Iter<'a, Slot<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        let item = self.slots.find_map(Slot::item)?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Pull-based cursor that does not borrow the table between pulls.
///
/// Every pull after a structural change to the table (insert, delete,
/// clear, resize or load factor change) fails with
/// [`Error::ConcurrentModification`].
pub struct SlotCursor {
    position: usize,
    snapshot: Snapshot,
}

impl SlotCursor {
    #[allow(clippy::should_implement_trait)]
    pub fn next<'a, T, E>(&mut self, table: &'a HashTable<T, E>) -> Result<Option<&'a T>>
    where
        E: Equivalence<T>,
    {
        table.stamp.verify(&self.snapshot)?;
        while let Some(slot) = table.slots.get(self.position) {
            self.position += 1;
            if let Some(item) = slot.item() {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}
