//! ordhash: the two storage engines behind a family of set, bag and
//! dictionary collections: an order-statistics red-black tree and an
//! open-addressing hash table.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep all of the algorithmic work in two independent engines so
//!   that sets, bags, dictionaries and multi-dictionaries can be thin
//!   façades choosing a comparator or equivalence and a duplicate policy.
//! - Engines:
//!   - OrderedIndex<T, C>: items in comparator order, duplicates allowed,
//!     O(log n) insert/delete/find plus rank (`get_by_index`,
//!     `find_index`) and range (`count_range`, bounded enumeration,
//!     `delete_range`) queries.
//!   - HashTable<T, E>: unique items under an equivalence, expected O(1)
//!     insert/find/delete, amortized doubling and shrinking.
//!
//! OrderedIndex layout
//! - Nodes live in a `slotmap` arena (`raw_tree`); links are
//!   `Option<NodeKey>` and there are no parent pointers. Top-down insert and
//!   delete keep their ancestors in an explicit path vector.
//! - Every node caches its subtree size. Insert and delete adjust the sizes
//!   along the path as they descend and roll the adjustment back when they
//!   end without changing the item count.
//! - All range work goes through one contract, `RangeClassifier`: for each
//!   item, is it before, within or after the range? Counting returns a
//!   cached size as soon as a subtree is known to lie inside both bounds.
//!
//! HashTable layout
//! - A flat `Vec` of slots. Each slot packs a 31-bit hash (zero = empty)
//!   and a collision marker bit into one `u32` next to an `Option<T>`.
//! - Double hashing: the bucket comes from the low bits of the mixed hash,
//!   the odd step from its high bits, so a probe visits every slot.
//! - Delete leaves the collision marker set; chains through the slot stay
//!   intact until the next full rehash.
//!
//! Enumeration and invalidation
//! - Borrowing iterators (`iter`, `range`) rule out mutation statically.
//! - Detached cursors (`cursor`) take the collection on each pull and
//!   compare a change stamp captured at creation. Any structural change in
//!   between fails the next pull with `ConcurrentModification`. Each
//!   collection, and each clone, has its own stamp owner id.
//!
//! Constraints
//! - Single-threaded; no interior mutability, no unsafe code.
//! - Comparators and equivalences are values (traits with closure impls),
//!   never inheritance.
//!
//! Notes and non-goals
//! - No serialization or persistence.
//! - The façades themselves are not part of this crate.

mod change_stamp;
pub mod comparator;
pub mod config;
pub mod equivalence;
pub mod error;
pub mod hash_table;
mod hash_table_proptest;
pub mod ordered_index;
mod ordered_index_proptest;
mod policy;
pub mod range;
mod raw_tree;
mod slot;

// Public surface
pub use comparator::{ByKey, Comparator, Natural, Reversed};
pub use config::HashTableConfig;
pub use equivalence::{Equivalence, Hashed, HashedByKey};
pub use error::{Error, Result};
pub use hash_table::{HashTable, SlotCursor};
pub use ordered_index::{OrderedIndex, RangeCursor, RangeIter};
pub use policy::{DuplicatePolicy, Insertion};
pub use range::{BoundedRange, EntireRange, EqualRange, RangeClassifier};
