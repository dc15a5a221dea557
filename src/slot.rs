//! Packed hash table slot.

const COLLISION: u32 = 1 << 31;
const HASH_MASK: u32 = !COLLISION;

/// One table entry. The low 31 bits hold the item's hash (zero = empty), the
/// top bit is the collision marker: some probe sequence walked past this
/// slot without stopping.
#[derive(Clone, Debug)]
pub(crate) struct Slot<T> {
    hash_collision: u32,
    item: Option<T>,
}

impl<T> Slot<T> {
    pub(crate) fn empty() -> Self {
        Self {
            hash_collision: 0,
            item: None,
        }
    }

    #[inline]
    pub(crate) fn hash(&self) -> u32 {
        self.hash_collision & HASH_MASK
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.hash() == 0
    }

    #[inline]
    pub(crate) fn collision(&self) -> bool {
        self.hash_collision & COLLISION != 0
    }

    #[inline]
    pub(crate) fn mark_collision(&mut self) {
        self.hash_collision |= COLLISION;
    }

    #[inline]
    pub(crate) fn item(&self) -> Option<&T> {
        self.item.as_ref()
    }

    /// Occupy an empty slot; the collision marker is kept.
    pub(crate) fn fill(&mut self, hash: u32, item: T) {
        debug_assert!(self.is_empty() && hash != 0 && hash & COLLISION == 0);
        self.hash_collision |= hash;
        self.item = Some(item);
    }

    /// The item of an occupied slot.
    pub(crate) fn stored(&self) -> &T {
        self.item.as_ref().expect("slot is occupied")
    }

    /// Swap the stored item for an equivalent one.
    pub(crate) fn replace(&mut self, item: T) -> T {
        self.item
            .replace(item)
            .expect("replace targets an occupied slot")
    }

    /// Empty the slot; the collision marker is kept.
    pub(crate) fn take(&mut self) -> Option<T> {
        self.hash_collision &= COLLISION;
        self.item.take()
    }

    pub(crate) fn into_parts(self) -> Option<(u32, T)> {
        let hash = self.hash();
        self.item.map(|item| (hash, item))
    }

    /// Same hash and marker, item mapped through `f`.
    pub(crate) fn map_with<F: FnMut(&T) -> T>(&self, f: F) -> Self {
        Self {
            hash_collision: self.hash_collision,
            item: self.item.as_ref().map(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: Taking an item leaves the collision marker in place.
    #[test]
    fn take_keeps_marker() {
        let mut s = Slot::empty();
        s.mark_collision();
        s.fill(0x1234, "a");
        assert_eq!(s.hash(), 0x1234);
        assert!(s.collision());
        assert_eq!(s.take(), Some("a"));
        assert!(s.is_empty());
        assert!(s.collision());
    }

    /// Invariant: The largest hash never reads as the marker or as empty.
    #[test]
    fn full_width_hash_is_distinct_from_marker() {
        let mut s = Slot::empty();
        s.fill(HASH_MASK, 1u8);
        assert!(!s.collision());
        assert!(!s.is_empty());
        assert_eq!(s.into_parts(), Some((HASH_MASK, 1)));
    }
}
