//! Range classifiers.
//!
//! A classifier answers, for one item, whether it lies before (`Less`),
//! within (`Equal`) or after (`Greater`) a contiguous range under the
//! index's ordering. Counting, bounded enumeration, range deletion and
//! equal-key lookup are all driven by this single contract.

use core::cmp::Ordering;
use core::ops::Bound;

use crate::comparator::Comparator;

/// Classifies items relative to a contiguous range.
///
/// The answers must be monotonic in the index order: every `Less` item sorts
/// before every `Equal` item, which sorts before every `Greater` item.
pub trait RangeClassifier<T: ?Sized> {
    fn classify(&self, item: &T) -> Ordering;

    /// True when every item is within the range. Enumeration then skips
    /// classification altogether.
    fn is_entire(&self) -> bool {
        false
    }
}

impl<T: ?Sized, F> RangeClassifier<T> for F
where
    F: Fn(&T) -> Ordering,
{
    #[inline]
    fn classify(&self, item: &T) -> Ordering {
        self(item)
    }
}

/// The whole collection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EntireRange;

impl<T: ?Sized> RangeClassifier<T> for EntireRange {
    #[inline]
    fn classify(&self, _item: &T) -> Ordering {
        Ordering::Equal
    }

    fn is_entire(&self) -> bool {
        true
    }
}

/// Items comparing equal to a single key.
#[derive(Clone, Debug)]
pub struct EqualRange<T, C> {
    key: T,
    comparator: C,
}

impl<T, C> EqualRange<T, C> {
    pub fn new(key: T, comparator: C) -> Self {
        Self { key, comparator }
    }

    pub fn key(&self) -> &T {
        &self.key
    }
}

impl<T, C: Comparator<T>> RangeClassifier<T> for EqualRange<T, C> {
    #[inline]
    fn classify(&self, item: &T) -> Ordering {
        self.comparator.compare(item, &self.key)
    }
}

/// Items between two bounds, each independently inclusive, exclusive or
/// absent.
///
/// `Bound::Unbounded` on one side gives the "bounded below" and "bounded
/// above" views; both unbounded is equivalent to [`EntireRange`].
#[derive(Clone, Debug)]
pub struct BoundedRange<T, C> {
    lower: Bound<T>,
    upper: Bound<T>,
    comparator: C,
}

impl<T, C> BoundedRange<T, C> {
    pub fn new(lower: Bound<T>, upper: Bound<T>, comparator: C) -> Self {
        Self {
            lower,
            upper,
            comparator,
        }
    }

    pub fn lower(&self) -> Bound<&T> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Bound<&T> {
        self.upper.as_ref()
    }
}

impl<T, C: Comparator<T>> RangeClassifier<T> for BoundedRange<T, C> {
    fn classify(&self, item: &T) -> Ordering {
        let below = match &self.lower {
            Bound::Included(lo) => self.comparator.compare(item, lo) == Ordering::Less,
            Bound::Excluded(lo) => self.comparator.compare(item, lo) != Ordering::Greater,
            Bound::Unbounded => false,
        };
        if below {
            return Ordering::Less;
        }
        let above = match &self.upper {
            Bound::Included(hi) => self.comparator.compare(item, hi) == Ordering::Greater,
            Bound::Excluded(hi) => self.comparator.compare(item, hi) != Ordering::Less,
            Bound::Unbounded => false,
        };
        if above {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    fn is_entire(&self) -> bool {
        matches!(
            (&self.lower, &self.upper),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::Natural;

    /// Invariant: Each bound kind places its endpoint on the correct side.
    #[test]
    fn bounded_endpoints() {
        let r = BoundedRange::new(Bound::Included(20), Bound::Excluded(80), Natural);
        assert_eq!(r.classify(&19), Ordering::Less);
        assert_eq!(r.classify(&20), Ordering::Equal);
        assert_eq!(r.classify(&79), Ordering::Equal);
        assert_eq!(r.classify(&80), Ordering::Greater);

        let r = BoundedRange::new(Bound::Excluded(20), Bound::Included(80), Natural);
        assert_eq!(r.classify(&20), Ordering::Less);
        assert_eq!(r.classify(&80), Ordering::Equal);
        assert_eq!(r.classify(&81), Ordering::Greater);
    }

    /// Invariant: Single-sided bounds never report the open side.
    #[test]
    fn single_sided_bounds() {
        let below = BoundedRange::new(Bound::Included(5), Bound::Unbounded, Natural);
        assert_eq!(below.classify(&i32::MAX), Ordering::Equal);
        assert_eq!(below.classify(&4), Ordering::Less);
        let above = BoundedRange::new(Bound::Unbounded, Bound::Excluded(5), Natural);
        assert_eq!(above.classify(&i32::MIN), Ordering::Equal);
        assert_eq!(above.classify(&5), Ordering::Greater);
        assert!(!above.is_entire());
        let all: BoundedRange<i32, Natural> =
            BoundedRange::new(Bound::Unbounded, Bound::Unbounded, Natural);
        assert!(all.is_entire());
    }

    /// Invariant: EqualRange is within only for equal items.
    #[test]
    fn equal_range_classification() {
        let r = EqualRange::new(10, Natural);
        assert_eq!(r.classify(&9), Ordering::Less);
        assert_eq!(r.classify(&10), Ordering::Equal);
        assert_eq!(r.classify(&11), Ordering::Greater);
        assert_eq!(*r.key(), 10);
    }
}
