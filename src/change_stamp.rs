//! Change stamps for enumeration invalidation.
//!
//! Every engine embeds one `ChangeStamp` and bumps it on each structural
//! mutation. A detached cursor captures a `Snapshot` when it is created and
//! verifies it on every pull; a mismatch means the structure was changed (or
//! the cursor is being used against a different structure) and the pull
//! fails with [`Error::ConcurrentModification`].

use core::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

// Owner ids only need to be distinct; a relaxed counter is enough.
static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Per-instance generation counter. Cloning yields a fresh owner so a
/// clone never validates cursors taken from the original.
#[derive(Debug)]
pub(crate) struct ChangeStamp {
    owner: u64,
    generation: u64,
}

/// Value captured by a cursor at traversal start.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Snapshot {
    owner: u64,
    generation: u64,
}

impl ChangeStamp {
    pub(crate) fn new() -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            generation: 0,
        }
    }

    /// Record a structural change.
    #[inline]
    pub(crate) fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            owner: self.owner,
            generation: self.generation,
        }
    }

    /// Fails if anything changed since `snapshot` was taken.
    #[inline]
    pub(crate) fn verify(&self, snapshot: &Snapshot) -> Result<()> {
        if snapshot.owner == self.owner && snapshot.generation == self.generation {
            Ok(())
        } else {
            log::trace!(
                "enumeration invalidated: stamp {}:{} now {}:{}",
                snapshot.owner,
                snapshot.generation,
                self.owner,
                self.generation
            );
            Err(Error::ConcurrentModification)
        }
    }
}

impl Clone for ChangeStamp {
    fn clone(&self) -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: An untouched stamp verifies its own snapshot.
    #[test]
    fn snapshot_verifies_until_bumped() {
        let mut s = ChangeStamp::new();
        let snap = s.snapshot();
        assert!(s.verify(&snap).is_ok());
        s.bump();
        assert_eq!(s.verify(&snap), Err(Error::ConcurrentModification));
        // A fresh snapshot is valid again.
        let snap = s.snapshot();
        assert!(s.verify(&snap).is_ok());
    }

    /// Invariant: A clone is a different owner even at the same generation.
    #[test]
    fn clone_does_not_share_owner() {
        let s = ChangeStamp::new();
        let c = s.clone();
        assert!(c.verify(&s.snapshot()).is_err());
        assert!(s.verify(&c.snapshot()).is_err());
    }
}
