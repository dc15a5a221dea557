//! Item orderings for [`OrderedIndex`](crate::OrderedIndex).

use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;

/// A total order over `T`.
///
/// Implemented for [`Natural`], [`ByKey`], [`Reversed`] and any
/// `Fn(&T, &T) -> Ordering`.
pub trait Comparator<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Orders items by their `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Natural;

impl<T: Ord + ?Sized> Comparator<T> for Natural {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Inverts another comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for Reversed<C> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(b, a)
    }
}

/// Orders composite items by a projected key, so key+payload items sort by
/// key alone.
pub struct ByKey<F, K: ?Sized> {
    key: F,
    _key: PhantomData<fn(&K)>,
}

impl<F, K: ?Sized> ByKey<F, K> {
    pub fn new<T: ?Sized>(key: F) -> Self
    where
        F: Fn(&T) -> &K,
    {
        Self {
            key,
            _key: PhantomData,
        }
    }
}

impl<T: ?Sized, K: Ord + ?Sized, F> Comparator<T> for ByKey<F, K>
where
    F: Fn(&T) -> &K,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.key)(a).cmp((self.key)(b))
    }
}

impl<F: Clone, K: ?Sized> Clone for ByKey<F, K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            _key: PhantomData,
        }
    }
}

impl<F, K: ?Sized> fmt::Debug for ByKey<F, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByKey").finish_non_exhaustive()
    }
}
