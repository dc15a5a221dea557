//! OrderedIndex: public order-statistics tree over a caller-supplied ordering.

use core::fmt;
use core::ops::Bound;

use crate::change_stamp::{ChangeStamp, Snapshot};
use crate::comparator::{Comparator, Natural};
use crate::error::{Error, Result};
use crate::policy::{DuplicatePolicy, Insertion};
use crate::range::{BoundedRange, EntireRange, EqualRange, RangeClassifier};
use crate::raw_tree::{RawTree, Traversal};

/// Items kept in comparator order, duplicates allowed, with O(log n) rank
/// and range queries.
///
/// Façades choose the duplicate behavior per insert; see
/// [`DuplicatePolicy`]. Ranges are described by a [`RangeClassifier`]; the
/// index hands out ready-made ones through [`entire_range`],
/// [`equal_range`] and [`bounded_range`].
///
/// [`entire_range`]: OrderedIndex::entire_range
/// [`equal_range`]: OrderedIndex::equal_range
/// [`bounded_range`]: OrderedIndex::bounded_range
///
/// # Time Complexity
/// | Method | Complexity |
/// |-|-|
/// | `insert`, `delete`, `find` | `O(log n)` |
/// | `get_by_index`, `find_index`, `count_range` | `O(log n)` |
/// | `delete_range` | `O(k log n)` for `k` removed |
/// | `clone` | `O(n)` |
pub struct OrderedIndex<T, C = Natural> {
    tree: RawTree<T>,
    comparator: C,
    stamp: ChangeStamp,
}

impl<T: Ord> OrderedIndex<T> {
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<T: Ord> Default for OrderedIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Comparator<T>> OrderedIndex<T, C> {
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            tree: RawTree::new(),
            comparator,
            stamp: ChangeStamp::new(),
        }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `item`, resolving an equal stored item according to `policy`.
    ///
    /// Insertion may rebalance the tree even when nothing is added, so any
    /// open cursor is invalidated.
    pub fn insert(&mut self, item: T, policy: DuplicatePolicy) -> Insertion<'_, T> {
        self.stamp.bump();
        let comparator = &self.comparator;
        self.tree
            .insert(item, policy, |a, b| comparator.compare(a, b))
    }

    /// The first (or last) stored item equal to `key`.
    pub fn find(&self, key: &T, first: bool) -> Option<&T> {
        let comparator = &self.comparator;
        let equal = |item: &T| comparator.compare(item, key);
        self.tree
            .locate(&equal, first)
            .map(|(_, node)| self.tree.item(node))
    }

    /// Like [`find`](Self::find) for the first equal item, but absence is an
    /// error.
    pub fn lookup(&self, key: &T) -> Result<&T> {
        self.find(key, true).ok_or(Error::KeyNotFound)
    }

    pub fn contains(&self, key: &T) -> bool {
        self.find(key, true).is_some()
    }

    /// Overwrite the first (or last) item equal to `item` in place and return
    /// the previous one. When nothing is equal, `item` is handed back.
    ///
    /// The replacement must compare equal to what it replaces.
    pub fn replace(&mut self, item: T, first: bool) -> core::result::Result<T, T> {
        let comparator = &self.comparator;
        let equal = |stored: &T| comparator.compare(stored, &item);
        match self.tree.locate(&equal, first) {
            Some((_, node)) => Ok(core::mem::replace(self.tree.item_mut(node), item)),
            None => Err(item),
        }
    }

    /// Rank of the first (or last) item equal to `key`.
    pub fn find_index(&self, key: &T, first: bool) -> Option<usize> {
        let comparator = &self.comparator;
        let equal = |item: &T| comparator.compare(item, key);
        self.tree.locate(&equal, first).map(|(index, _)| index)
    }

    /// The item of rank `index`.
    pub fn get_by_index(&self, index: usize) -> Result<&T> {
        self.tree
            .get_by_index(index)
            .ok_or_else(|| Error::index_out_of_range(index, self.len()))
    }

    pub fn first(&self) -> Option<&T> {
        self.tree.get_by_index(0)
    }

    pub fn last(&self) -> Option<&T> {
        self.len()
            .checked_sub(1)
            .and_then(|i| self.tree.get_by_index(i))
    }

    /// Remove the first (or last) item equal to `key`.
    pub fn delete(&mut self, key: &T, first: bool) -> Option<T> {
        self.stamp.bump();
        let comparator = &self.comparator;
        let equal = |item: &T| comparator.compare(item, key);
        self.tree.delete(&equal, first)
    }

    /// Remove the first (or last) item within `range`.
    pub fn delete_in_range<R>(&mut self, range: &R, first: bool) -> Option<T>
    where
        R: RangeClassifier<T> + ?Sized,
    {
        self.stamp.bump();
        self.tree.delete(range, first)
    }

    /// Remove every item within `range`; returns how many were removed.
    pub fn delete_range<R>(&mut self, range: &R) -> usize
    where
        R: RangeClassifier<T> + ?Sized,
    {
        if range.is_entire() {
            let removed = self.len();
            self.clear();
            return removed;
        }
        self.stamp.bump();
        let mut removed = 0;
        while self.tree.delete(range, true).is_some() {
            removed += 1;
        }
        removed
    }

    /// Number of items within `range`.
    pub fn count_range<R>(&self, range: &R) -> usize
    where
        R: RangeClassifier<T> + ?Sized,
    {
        self.tree.count_range(range)
    }

    /// Lowest-ranked item within `range`, with its rank.
    pub fn first_in_range<R>(&self, range: &R) -> Option<(usize, &T)>
    where
        R: RangeClassifier<T> + ?Sized,
    {
        self.tree
            .locate(range, true)
            .map(|(index, node)| (index, self.tree.item(node)))
    }

    /// Highest-ranked item within `range`, with its rank.
    pub fn last_in_range<R>(&self, range: &R) -> Option<(usize, &T)>
    where
        R: RangeClassifier<T> + ?Sized,
    {
        self.tree
            .locate(range, false)
            .map(|(index, node)| (index, self.tree.item(node)))
    }

    pub fn clear(&mut self) {
        self.stamp.bump();
        log::trace!("ordered index cleared ({} items)", self.len());
        self.tree.clear();
    }

    pub fn iter(&self) -> RangeIter<'_, T, EntireRange> {
        self.range(EntireRange)
    }

    pub fn iter_rev(&self) -> RangeIter<'_, T, EntireRange> {
        self.range_rev(EntireRange)
    }

    /// Items within `range` in ascending order.
    pub fn range<R: RangeClassifier<T>>(&self, range: R) -> RangeIter<'_, T, R> {
        RangeIter {
            tree: &self.tree,
            range,
            traversal: Traversal::new(false),
        }
    }

    /// Items within `range` in descending order.
    pub fn range_rev<R: RangeClassifier<T>>(&self, range: R) -> RangeIter<'_, T, R> {
        RangeIter {
            tree: &self.tree,
            range,
            traversal: Traversal::new(true),
        }
    }

    /// A detached ascending cursor over `range`; see [`RangeCursor`].
    pub fn cursor<R: RangeClassifier<T>>(&self, range: R) -> RangeCursor<R> {
        RangeCursor {
            range,
            traversal: Traversal::new(false),
            snapshot: self.stamp.snapshot(),
        }
    }

    /// A detached descending cursor over `range`.
    pub fn cursor_rev<R: RangeClassifier<T>>(&self, range: R) -> RangeCursor<R> {
        RangeCursor {
            range,
            traversal: Traversal::new(true),
            snapshot: self.stamp.snapshot(),
        }
    }

    pub fn entire_range(&self) -> EntireRange {
        EntireRange
    }

    /// Classifier for items equal to `key`.
    pub fn equal_range(&self, key: T) -> EqualRange<T, C>
    where
        C: Clone,
    {
        EqualRange::new(key, self.comparator.clone())
    }

    /// Classifier for items between `lower` and `upper`.
    pub fn bounded_range(&self, lower: Bound<T>, upper: Bound<T>) -> BoundedRange<T, C>
    where
        C: Clone,
    {
        BoundedRange::new(lower, upper, self.comparator.clone())
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> core::result::Result<usize, String> {
        self.tree.check_invariants()
    }
}

impl<T: Clone, C: Clone> Clone for OrderedIndex<T, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            comparator: self.comparator.clone(),
            stamp: ChangeStamp::new(),
        }
    }
}

impl<T: fmt::Debug, C: Comparator<T>> fmt::Debug for OrderedIndex<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, C: Comparator<T>> Extend<T> for OrderedIndex<T, C> {
    /// Adds every item after its equals, as a multiset would.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            let _ = self.insert(item, DuplicatePolicy::InsertLast);
        }
    }
}

impl<T: Ord> FromIterator<T> for OrderedIndex<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

impl<'a, T, C: Comparator<T>> IntoIterator for &'a OrderedIndex<T, C> {
    type Item = &'a T;
    type IntoIter = RangeIter<'a, T, EntireRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over the items within a range.
///
/// The borrow keeps the index immutable for the iterator's lifetime.
pub struct RangeIter<'a, T, R> {
    tree: &'a RawTree<T>,
    range: R,
    traversal: Traversal,
}

impl<'a, T, R: RangeClassifier<T>> Iterator for RangeIter<'a, T, R> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        self.traversal.next(self.tree, &self.range)
    }
}

/// Pull-based cursor that does not borrow the index between pulls.
///
/// Each call to [`next`](RangeCursor::next) takes the index it was created
/// from and checks that no structural change happened since creation. If
/// one did, that pull (and every later one) fails with
/// [`Error::ConcurrentModification`]; earlier pulls are unaffected.
pub struct RangeCursor<R> {
    range: R,
    traversal: Traversal,
    snapshot: Snapshot,
}

impl<R> RangeCursor<R> {
    #[allow(clippy::should_implement_trait)]
    pub fn next<'a, T, C>(&mut self, index: &'a OrderedIndex<T, C>) -> Result<Option<&'a T>>
    where
        R: RangeClassifier<T>,
        C: Comparator<T>,
    {
        index.stamp.verify(&self.snapshot)?;
        Ok(self.traversal.next(&index.tree, &self.range))
    }
}
