//! Hash + equality contracts for [`HashTable`](crate::HashTable).

use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;

use hashbrown::hash_map::DefaultHashBuilder;

/// A hash function paired with the equality it must agree with.
///
/// Items that are `equivalent` must produce the same `hash`.
pub trait Equivalence<T: ?Sized> {
    fn hash(&self, item: &T) -> u64;
    fn equivalent(&self, a: &T, b: &T) -> bool;
}

/// `T: Hash + Eq` through a [`BuildHasher`].
#[derive(Clone, Debug, Default)]
pub struct Hashed<S = DefaultHashBuilder> {
    build: S,
}

impl<S> Hashed<S> {
    pub fn with_hasher(build: S) -> Self {
        Self { build }
    }
}

impl<T, S> Equivalence<T> for Hashed<S>
where
    T: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, item: &T) -> u64 {
        self.build.hash_one(item)
    }

    #[inline]
    fn equivalent(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Hashes and compares a projected key, so key+payload items are unique by
/// key alone.
pub struct HashedByKey<F, K: ?Sized, S = DefaultHashBuilder> {
    key: F,
    build: S,
    _key: PhantomData<fn(&K)>,
}

impl<F, K: ?Sized> HashedByKey<F, K> {
    pub fn new<T: ?Sized>(key: F) -> Self
    where
        F: Fn(&T) -> &K,
    {
        Self::with_hasher::<T>(key, DefaultHashBuilder::default())
    }
}

impl<F, K: ?Sized, S> HashedByKey<F, K, S> {
    pub fn with_hasher<T: ?Sized>(key: F, build: S) -> Self
    where
        F: Fn(&T) -> &K,
    {
        Self {
            key,
            build,
            _key: PhantomData,
        }
    }
}

impl<T, K, F, S> Equivalence<T> for HashedByKey<F, K, S>
where
    T: ?Sized,
    K: Hash + Eq + ?Sized,
    F: Fn(&T) -> &K,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, item: &T) -> u64 {
        self.build.hash_one((self.key)(item))
    }

    #[inline]
    fn equivalent(&self, a: &T, b: &T) -> bool {
        (self.key)(a) == (self.key)(b)
    }
}

impl<F: Clone, K: ?Sized, S: Clone> Clone for HashedByKey<F, K, S> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            build: self.build.clone(),
            _key: PhantomData,
        }
    }
}

impl<F, K: ?Sized, S> fmt::Debug for HashedByKey<F, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedByKey").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name<'a>(pair: &'a (&'static str, u32)) -> &'a &'static str {
        &pair.0
    }

    /// Invariant: Projected-key equivalence ignores the payload, hash included.
    #[test]
    fn by_key_ignores_payload() {
        let e = HashedByKey::new(name);
        let a = ("alpha", 1);
        let b = ("alpha", 2);
        assert!(e.equivalent(&a, &b));
        assert_eq!(e.hash(&a), e.hash(&b));
        assert!(!e.equivalent(&a, &("beta", 1)));
    }

    /// Invariant: One Hashed value hashes equal items identically.
    #[test]
    fn hashed_is_deterministic_per_instance() {
        let e = Hashed::<DefaultHashBuilder>::default();
        assert_eq!(Equivalence::<str>::hash(&e, "x"), Equivalence::<str>::hash(&e, "x"));
        assert!(Equivalence::<str>::equivalent(&e, "x", "x"));
        assert!(!Equivalence::<str>::equivalent(&e, "x", "y"));
    }
}
