//! Duplicate handling on insert and the outcome it produces.

/// What [`OrderedIndex::insert`](crate::OrderedIndex::insert) does when an
/// equal item is already stored.
///
/// Unique-key façades pick `DoNothing` or one of the replace policies;
/// multisets and multi-maps pick `InsertFirst` or `InsertLast`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DuplicatePolicy {
    /// Store the new item before all equal items.
    InsertFirst,
    /// Store the new item after all equal items.
    InsertLast,
    /// Overwrite the first equal item.
    ReplaceFirst,
    /// Overwrite the last equal item.
    ReplaceLast,
    /// Leave the collection unchanged.
    DoNothing,
}

impl DuplicatePolicy {
    pub(crate) const fn replaces(self) -> bool {
        matches!(self, Self::ReplaceFirst | Self::ReplaceLast)
    }
}

/// Outcome of an insert.
///
/// A rejected duplicate is a normal outcome, not an error. It borrows the
/// collection so the kept item can be read without a second lookup.
#[derive(Debug, Eq, PartialEq)]
#[must_use]
pub enum Insertion<'a, T> {
    /// The item was added; the collection grew by one.
    Inserted,
    /// An equal item was overwritten; the previous item is returned.
    Replaced(T),
    /// An equal item exists and was kept.
    Duplicate {
        /// The new item, handed back untouched.
        rejected: T,
        /// The stored item it collided with.
        existing: &'a T,
    },
}

impl<'a, T> Insertion<'a, T> {
    /// True if the collection grew.
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }

    /// The equal item found on insert: the overwritten one or the kept one.
    pub fn previous(&self) -> Option<&T> {
        match self {
            Self::Inserted => None,
            Self::Replaced(item) => Some(item),
            Self::Duplicate { existing, .. } => Some(existing),
        }
    }

    /// The item that left the collection or was refused, if any.
    pub fn into_inner(self) -> Option<T> {
        match self {
            Self::Inserted => None,
            Self::Replaced(item) | Self::Duplicate { rejected: item, .. } => Some(item),
        }
    }
}
