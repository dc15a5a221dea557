#![cfg(test)]

// Property tests for OrderedIndex kept inside the crate so they can reach the
// structural invariant checker.

use crate::comparator::ByKey;
use crate::ordered_index::OrderedIndex;
use crate::policy::{DuplicatePolicy, Insertion};
use crate::range::RangeClassifier;
use core::cmp::Ordering;
use core::ops::Bound;
use proptest::prelude::*;

// Key plus a unique tag, ordered by key alone, so the position of each
// duplicate is observable.
type Item = (i32, u32);
type Index = OrderedIndex<Item, ByKey<fn(&Item) -> &i32, i32>>;

fn key(item: &Item) -> &i32 {
    &item.0
}

fn new_index() -> Index {
    OrderedIndex::with_comparator(ByKey::new(key as fn(&Item) -> &i32))
}

#[derive(Clone, Debug)]
enum Op {
    Insert(i32, DuplicatePolicy),
    Delete(i32, bool),
    DeleteRange(i32, i32),
    Find(i32, bool),
    Count(i32, i32),
    Replace(i32, bool),
    Iterate,
}

fn arb_policy() -> impl Strategy<Value = DuplicatePolicy> {
    prop_oneof![
        Just(DuplicatePolicy::InsertFirst),
        Just(DuplicatePolicy::InsertLast),
        Just(DuplicatePolicy::ReplaceFirst),
        Just(DuplicatePolicy::ReplaceLast),
        Just(DuplicatePolicy::DoNothing),
    ]
}

// Small key space so duplicates and range hits are frequent.
fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let k = 0..24i32;
    let op = prop_oneof![
        4 => (k.clone(), arb_policy()).prop_map(|(k, p)| Op::Insert(k, p)),
        2 => (k.clone(), any::<bool>()).prop_map(|(k, f)| Op::Delete(k, f)),
        1 => (k.clone(), 0..8i32).prop_map(|(k, w)| Op::DeleteRange(k, k + w)),
        1 => (k.clone(), any::<bool>()).prop_map(|(k, f)| Op::Find(k, f)),
        1 => (k.clone(), 0..12i32).prop_map(|(k, w)| Op::Count(k, k + w)),
        1 => (k.clone(), any::<bool>()).prop_map(|(k, f)| Op::Replace(k, f)),
        1 => Just(Op::Iterate),
    ];
    proptest::collection::vec(op, 1..120)
}

// Equal run `[lo, hi)` for `k` in the sorted model.
fn run(model: &[Item], k: i32) -> (usize, usize) {
    (
        model.partition_point(|x| x.0 < k),
        model.partition_point(|x| x.0 <= k),
    )
}

// Property: State-machine equivalence against a sorted Vec.
// Invariants exercised across random operation sequences:
// - Each duplicate policy lands, replaces or refuses at the model's position.
// - Deletes take the first or last of an equal run; range deletes take all.
// - find/find_index/get_by_index/count_range agree with the model.
// - After every step: red-black shape, subtree counts and in-order content.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in arb_ops()) {
        let mut sut = new_index();
        let mut model: Vec<Item> = Vec::new();

        for (step, op) in ops.into_iter().enumerate() {
            let tag = step as u32;
            match op {
                Op::Insert(k, policy) => {
                    let (lo, hi) = run(&model, k);
                    let outcome = sut.insert((k, tag), policy);
                    if policy == DuplicatePolicy::DoNothing && lo < hi {
                        // Any member of the equal run may be the one reported.
                        prop_assert!(
                            matches!(
                                &outcome,
                                Insertion::Duplicate { rejected, existing }
                                    if *rejected == (k, tag) && model[lo..hi].contains(*existing)
                            ),
                            "unexpected outcome {:?}",
                            outcome
                        );
                    } else {
                        let expected = match policy {
                            DuplicatePolicy::InsertFirst => {
                                model.insert(lo, (k, tag));
                                Insertion::Inserted
                            }
                            _ if lo == hi => {
                                model.insert(lo, (k, tag));
                                Insertion::Inserted
                            }
                            DuplicatePolicy::InsertLast => {
                                model.insert(hi, (k, tag));
                                Insertion::Inserted
                            }
                            DuplicatePolicy::ReplaceFirst => {
                                Insertion::Replaced(core::mem::replace(&mut model[lo], (k, tag)))
                            }
                            DuplicatePolicy::ReplaceLast => {
                                Insertion::Replaced(core::mem::replace(&mut model[hi - 1], (k, tag)))
                            }
                            DuplicatePolicy::DoNothing => unreachable!("equal runs are handled above"),
                        };
                        prop_assert_eq!(outcome, expected);
                    }
                }
                Op::Delete(k, first) => {
                    let (lo, hi) = run(&model, k);
                    let expected = if lo == hi {
                        None
                    } else if first {
                        Some(model.remove(lo))
                    } else {
                        Some(model.remove(hi - 1))
                    };
                    prop_assert_eq!(sut.delete(&(k, 0), first), expected);
                }
                Op::DeleteRange(a, b) => {
                    let range = sut.bounded_range(Bound::Included((a, 0)), Bound::Excluded((b, 0)));
                    let before = model.len();
                    model.retain(|x| !(a <= x.0 && x.0 < b));
                    prop_assert_eq!(sut.delete_range(&range), before - model.len());
                }
                Op::Find(k, first) => {
                    let (lo, hi) = run(&model, k);
                    let (found, rank) = if lo == hi {
                        (None, None)
                    } else if first {
                        (Some(&model[lo]), Some(lo))
                    } else {
                        (Some(&model[hi - 1]), Some(hi - 1))
                    };
                    prop_assert_eq!(sut.find(&(k, 0), first), found);
                    prop_assert_eq!(sut.find_index(&(k, 0), first), rank);
                }
                Op::Count(a, b) => {
                    let range = sut.bounded_range(Bound::Excluded((a, 0)), Bound::Included((b, 0)));
                    let inside: Vec<usize> = (0..model.len())
                        .filter(|&i| range.classify(&model[i]) == Ordering::Equal)
                        .collect();
                    prop_assert_eq!(sut.count_range(&range), inside.len());
                    prop_assert_eq!(
                        sut.first_in_range(&range),
                        inside.first().map(|&i| (i, &model[i]))
                    );
                    prop_assert_eq!(
                        sut.last_in_range(&range),
                        inside.last().map(|&i| (i, &model[i]))
                    );
                    let rev: Vec<Item> = sut.range_rev(range).copied().collect();
                    let expected: Vec<Item> = inside.iter().rev().map(|&i| model[i]).collect();
                    prop_assert_eq!(rev, expected);
                }
                Op::Replace(k, first) => {
                    let (lo, hi) = run(&model, k);
                    let result = sut.replace((k, tag), first);
                    if lo == hi {
                        prop_assert_eq!(result, Err((k, tag)));
                    } else {
                        let at = if first { lo } else { hi - 1 };
                        prop_assert_eq!(result, Ok(core::mem::replace(&mut model[at], (k, tag))));
                    }
                }
                Op::Iterate => {
                    for (i, item) in model.iter().enumerate() {
                        prop_assert_eq!(sut.get_by_index(i), Ok(item));
                    }
                    prop_assert!(sut.get_by_index(model.len()).is_err());
                    let rev: Vec<Item> = sut.iter_rev().copied().collect();
                    let expected: Vec<Item> = model.iter().rev().copied().collect();
                    prop_assert_eq!(rev, expected);
                }
            }

            // Post-conditions after each op
            let counted = sut.check_invariants();
            prop_assert_eq!(counted, Ok(model.len()));
            let seen: Vec<Item> = sut.iter().copied().collect();
            prop_assert_eq!(&seen, &model);
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }
    }
}

// Property: A clone evolves independently of its source.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_clone_independent(keys in proptest::collection::vec(0..50i32, 0..80), cut in 0..50i32) {
        let mut source = new_index();
        for (i, k) in keys.iter().enumerate() {
            let _ = source.insert((*k, i as u32), DuplicatePolicy::InsertLast);
        }
        let before: Vec<Item> = source.iter().copied().collect();
        let mut copy = source.clone();
        let below = copy.bounded_range(Bound::Unbounded, Bound::Excluded((cut, 0)));
        let removed = copy.delete_range(&below);
        let _ = copy.insert((cut, u32::MAX), DuplicatePolicy::InsertFirst);

        let after: Vec<Item> = source.iter().copied().collect();
        prop_assert_eq!(after, before);
        prop_assert_eq!(copy.len(), source.len() - removed + 1);
        prop_assert_eq!(copy.check_invariants(), Ok(copy.len()));
        prop_assert_eq!(source.check_invariants(), Ok(source.len()));
    }
}
