// End-to-end scenarios for both engines.
//
// Each test walks one complete usage story and checks the observable
// numbers at every interesting point: counts, ranks, capacities and how
// much work a range count performs.
use ordhash::{DuplicatePolicy, HashTable, OrderedIndex};
use std::cell::Cell;
use std::cmp::Ordering;

// Test: duplicates in a large naturally ordered index.
// Assumes: InsertLast lands after every equal item.
// Verifies: ranks of the first and last 500, and that deleting the equal
// range removes the original 500 together with the three duplicates.
#[test]
fn thousand_integers_with_duplicate_run() {
    let mut idx = OrderedIndex::new();
    for i in 1..=1000 {
        assert!(idx.insert(i, DuplicatePolicy::DoNothing).is_inserted());
    }
    for _ in 0..3 {
        assert!(idx.insert(500, DuplicatePolicy::InsertLast).is_inserted());
    }
    assert_eq!(idx.len(), 1003);
    assert_eq!(idx.find_index(&500, true), Some(499));
    assert_eq!(idx.find_index(&500, false), Some(502));
    assert_eq!(idx.get_by_index(503), Ok(&501));

    let fives = idx.equal_range(500);
    assert_eq!(idx.count_range(&fives), 4);
    assert_eq!(idx.delete_range(&fives), 4);
    assert_eq!(idx.len(), 999);
    assert_eq!(idx.find(&500, true), None);
    assert_eq!(idx.get_by_index(499), Ok(&501));
}

// Test: growth of a hash table fed one key at a time.
// Assumes: default load factor 0.70, table starts empty.
// Verifies: 26 keys end in 64 slots, the load factor holds after every
// insert, and capacity changes exactly at inserts 1, 12 and 23.
#[test]
fn alphabet_growth() {
    let mut table: HashTable<String> = HashTable::new();
    assert_eq!(table.capacity(), 0);
    let mut changes = Vec::new();
    for (i, c) in ('a'..='z').enumerate() {
        let before = table.capacity();
        assert!(table.insert(c.to_string(), false).unwrap().is_inserted());
        let after = table.capacity();
        if after != before {
            changes.push((i + 1, before, after));
        }
        assert!(table.len() as f32 <= after as f32 * 0.70);
    }
    assert_eq!(table.len(), 26);
    assert_eq!(table.capacity(), 64);
    assert_eq!(changes, [(1, 0, 16), (12, 16, 32), (23, 32, 64)]);
    for c in 'a'..='z' {
        assert_eq!(table.find(&c.to_string()), Some(&c.to_string()));
    }
}

// Test: counting a range classifies only boundary nodes.
// Assumes: 100 sequential integers, range [20, 80).
// Verifies: the count is 60 and the classifier runs far fewer than 100
// times, while enumerating the same range visits every item inside it.
#[test]
fn count_range_touches_only_boundaries() {
    let idx: OrderedIndex<i32> = (0..100).collect();
    let calls = Cell::new(0usize);
    let window = |x: &i32| {
        calls.set(calls.get() + 1);
        if *x < 20 {
            Ordering::Less
        } else if *x >= 80 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    };
    assert_eq!(idx.count_range(&window), 60);
    let counted = calls.get();
    assert!(counted > 0 && counted < 40, "classified {} nodes", counted);

    let listed: Vec<i32> = idx.range(window).copied().collect();
    assert_eq!(listed, (20..80).collect::<Vec<_>>());
}
