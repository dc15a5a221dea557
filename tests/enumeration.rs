// Enumeration, invalidation and clone independence for both engines.
//
// The core invariants exercised:
// - A detached cursor fails on the first pull after a structural change,
//   never on an earlier one, and keeps failing afterwards.
// - Reads do not invalidate cursors.
// - A cursor only validates against the collection it came from.
// - Clones are independent in both directions.
use ordhash::{DuplicatePolicy, EntireRange, Error, HashTable, OrderedIndex};
use std::ops::Bound;

// Test: ordered cursor invalidation.
// Verifies: pulls before the change succeed, the pull after fails.
#[test]
fn ordered_cursor_fails_after_delete() {
    let mut idx: OrderedIndex<i32> = (0..10).collect();
    let mut cur = idx.cursor(EntireRange);
    assert_eq!(cur.next(&idx), Ok(Some(&0)));
    assert_eq!(cur.next(&idx), Ok(Some(&1)));
    assert_eq!(idx.find(&5, true), Some(&5));
    assert_eq!(idx.count_range(&EntireRange), 10);
    assert_eq!(cur.next(&idx), Ok(Some(&2)));
    let _ = idx.delete(&9, true);
    assert_eq!(cur.next(&idx), Err(Error::ConcurrentModification));
    assert_eq!(cur.next(&idx), Err(Error::ConcurrentModification));
}

// Test: ordered cursor over a reversed bounded range.
// Verifies: the cursor yields the range in reverse, then Ok(None) for
// every further pull.
#[test]
fn ordered_reverse_cursor_runs_dry() {
    let idx: OrderedIndex<i32> = (0..30).collect();
    let mut cur = idx.cursor_rev(idx.bounded_range(Bound::Included(5), Bound::Excluded(8)));
    let mut seen = Vec::new();
    while let Some(x) = cur.next(&idx).unwrap() {
        seen.push(*x);
    }
    assert_eq!(seen, [7, 6, 5]);
    assert_eq!(cur.next(&idx), Ok(None));
}

// Test: cursor used against a clone.
// Verifies: a clone never validates a cursor taken from its source.
#[test]
fn cursor_rejects_clone() {
    let idx: OrderedIndex<i32> = (0..4).collect();
    let copy = idx.clone();
    let mut cur = idx.cursor(EntireRange);
    assert_eq!(cur.next(&copy), Err(Error::ConcurrentModification));

    let mut t: HashTable<i32> = HashTable::new();
    let _ = t.insert(1, false).unwrap();
    let t2 = t.clone();
    let mut cur = t.cursor();
    assert_eq!(cur.next(&t2), Err(Error::ConcurrentModification));
    assert_eq!(cur.next(&t), Ok(Some(&1)));
}

// Test: hash cursor invalidation.
// Verifies: every structural operation invalidates, reads do not.
#[test]
fn hash_cursor_fails_after_structural_change() {
    let mut t: HashTable<u32> = HashTable::new();
    for i in 0..8 {
        let _ = t.insert(i, false).unwrap();
    }
    let mut cur = t.cursor();
    assert!(cur.next(&t).unwrap().is_some());
    assert!(t.contains(&3));
    assert!(cur.next(&t).unwrap().is_some());
    t.set_load_factor(0.5).unwrap();
    assert_eq!(cur.next(&t), Err(Error::ConcurrentModification));

    let mut cur = t.cursor();
    let mut pulled = 0;
    while cur.next(&t).unwrap().is_some() {
        pulled += 1;
    }
    assert_eq!(pulled, 8);
    t.clear();
    assert_eq!(cur.next(&t), Err(Error::ConcurrentModification));
}

// Test: clone independence.
// Verifies: mutating either side after cloning leaves the other intact.
#[test]
fn clones_are_independent() {
    let mut idx: OrderedIndex<i32> = (0..100).collect();
    let mut copy = idx.clone();
    let _ = copy.insert(1000, DuplicatePolicy::InsertLast);
    let _ = idx.delete(&0, true);
    assert_eq!(idx.len(), 99);
    assert_eq!(copy.len(), 101);
    assert_eq!(idx.first(), Some(&1));
    assert_eq!(copy.first(), Some(&0));
    assert_eq!(idx.find(&1000, true), None);

    let mut t: HashTable<i32> = HashTable::new();
    for i in 0..50 {
        let _ = t.insert(i, false).unwrap();
    }
    let mut t2 = t.clone();
    let _ = t2.delete(&7);
    let _ = t.insert(500, false).unwrap();
    assert_eq!(t.find(&7), Some(&7));
    assert_eq!(t2.find(&500), None);
    assert_eq!((t.len(), t2.len()), (51, 49));
}
