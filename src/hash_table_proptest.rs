#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can reach the
// slot-level invariant checker.

use crate::equivalence::HashedByKey;
use crate::hash_table::HashTable;
use crate::policy::Insertion;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hasher};

type Item = (u16, i32);
type Table<S> = HashTable<Item, HashedByKey<fn(&Item) -> &u16, u16, S>>;

fn key(item: &Item) -> &u16 {
    &item.0
}

fn new_table<S: BuildHasher>(build: S) -> Table<S> {
    HashTable::with_equivalence(HashedByKey::with_hasher(
        key as fn(&Item) -> &u16,
        build,
    ))
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, i32, bool),
    Delete(u16),
    Find(u16),
    Replace(u16, i32),
    LoadFactor(f32),
    Iterate,
    Clear,
}

fn arb_ops(keys: u16) -> impl Strategy<Value = Vec<Op>> {
    let k = 0..keys;
    let op = prop_oneof![
        6 => (k.clone(), any::<i32>(), any::<bool>()).prop_map(|(k, v, r)| Op::Insert(k, v, r)),
        4 => k.clone().prop_map(Op::Delete),
        2 => k.clone().prop_map(Op::Find),
        1 => (k.clone(), any::<i32>()).prop_map(|(k, v)| Op::Replace(k, v)),
        1 => proptest::sample::select(vec![0.1f32, 0.25, 0.5, 0.7, 0.95, 1.5]).prop_map(Op::LoadFactor),
        1 => Just(Op::Iterate),
        1 => Just(Op::Clear),
    ];
    proptest::collection::vec(op, 1..300)
}

fn run_ops<S: BuildHasher>(mut sut: Table<S>, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model: HashMap<u16, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v, replace) => {
                let outcome = sut.insert((k, v), replace).expect("far below maximum capacity");
                match model.get(&k).copied() {
                    None => {
                        prop_assert_eq!(outcome, Insertion::Inserted);
                        model.insert(k, v);
                    }
                    Some(old) if replace => {
                        prop_assert_eq!(outcome, Insertion::Replaced((k, old)));
                        model.insert(k, v);
                    }
                    Some(old) => {
                        let stored = (k, old);
                        prop_assert_eq!(
                            outcome,
                            Insertion::Duplicate {
                                rejected: (k, v),
                                existing: &stored
                            }
                        );
                    }
                }
            }
            Op::Delete(k) => {
                let expected = model.remove(&k).map(|v| (k, v));
                prop_assert_eq!(sut.delete(&(k, 0)), expected);
            }
            Op::Find(k) => {
                let expected = model.get(&k).map(|&v| (k, v));
                prop_assert_eq!(sut.find(&(k, 0)).copied(), expected);
            }
            Op::Replace(k, v) => {
                let result = sut.replace((k, v));
                match model.get_mut(&k) {
                    Some(old) => {
                        prop_assert_eq!(result, Ok((k, *old)));
                        *old = v;
                    }
                    None => prop_assert_eq!(result, Err((k, v))),
                }
            }
            Op::LoadFactor(f) => {
                let before = sut.load_factor();
                let valid = (0.25..=0.95).contains(&f);
                prop_assert_eq!(sut.set_load_factor(f).is_ok(), valid);
                prop_assert_eq!(sut.load_factor(), if valid { f } else { before });
            }
            Op::Iterate => {
                let mut seen: Vec<Item> = sut.iter().copied().collect();
                seen.sort_unstable();
                let mut expected: Vec<Item> = model.iter().map(|(&k, &v)| (k, v)).collect();
                expected.sort_unstable();
                prop_assert_eq!(seen, expected);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), 0);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.check_invariants(), Ok(()));
        prop_assert_eq!(sut.len(), model.len());
        let cap = sut.capacity();
        prop_assert!(cap == 0 || cap.is_power_of_two());
        prop_assert!(sut.len() as f32 <= cap as f32 * sut.load_factor());
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert reports Inserted/Replaced/Duplicate exactly as the model predicts.
// - delete/find/replace parity; absent keys leave the table untouched.
// - Load factor changes are validated and applied.
// - After every step: power-of-two capacity, used slots under the grow
//   threshold, every item reachable by probing from its own bucket.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in arb_ops(200)) {
        run_ops(new_table(hashbrown::hash_map::DefaultHashBuilder::default()), ops)?;
    }
}

// Collision variant using a constant hasher: every item shares one probe
// sequence, so deletes leave long chains of collision markers behind.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants under worst-case collisions.
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions(ops in arb_ops(24)) {
        run_ops(new_table(ConstBuildHasher), ops)?;
    }
}
