//! A reference model for equivalence testing against `std::collections::BTreeMap`.

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{WavlError, WavlTree};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    /// Resolves to an existing key, picked by position.
    Index(usize),
    /// A key that may or may not be present.
    Random(i16),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in -500i16..500,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Get(ItemValue),
    Delete(ItemValue),
    Select(usize),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    fn finalize(self, sorted: &[i64]) -> FinalOp {
        fn get_key(v: &[i64], i: ItemValue) -> i64 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as i64
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(k) => k.into(),
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_key(sorted, item)),
            Op::Get(item) => FinalOp::Get(get_key(sorted, item)),
            Op::Delete(item) => FinalOp::Delete(get_key(sorted, item)),
            // Reach one past either end now and then.
            Op::Select(i) => FinalOp::Select(i % (sorted.len() + 2)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(i64),
    Get(i64),
    Delete(i64),
    Select(usize),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Get),
        value_strategy().prop_map(Op::Delete),
        (0usize..1000).prop_map(Op::Select),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

/// Applies `ops` to both a [`WavlTree`] and a `BTreeMap`, asserting that every result agrees and
/// that the tree's invariants hold after each step.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut btree = BTreeMap::new();
    let mut wavl: WavlTree<u64> = WavlTree::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let sorted: Vec<i64> = btree.keys().copied().collect();
        let final_op = op.finalize(&sorted);

        // Values are derived from the op index, so a stale value is distinguishable.
        let value = op_id as u64;

        match final_op {
            FinalOp::Insert(key) => {
                let from_btree = if btree.contains_key(&key) {
                    Err(WavlError::DuplicateKey(key))
                } else {
                    btree.insert(key, value);
                    Ok(())
                };
                let from_wavl = wavl.insert(key, value).map(|_| ());

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(key) => {
                let from_btree = btree.get(&key);
                let from_wavl = wavl.get(key);

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(btree.contains_key(&key), wavl.contains_key(key));
            }

            FinalOp::Delete(key) => {
                let from_btree = btree.remove(&key).ok_or(WavlError::NotFound(key)).map(|_| ());
                let from_wavl = wavl.delete(key).map(|_| ());

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Select(i) => {
                let from_btree = i.checked_sub(1).and_then(|i| btree.values().nth(i));
                let from_wavl = wavl.select(i);

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first_key_value().map(|(&k, v)| (k, v));
                let from_wavl = wavl.first_key_value();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(from_btree.map(|(_, v)| v), wavl.min());
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_wavl = wavl.pop_first();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last_key_value().map(|(&k, v)| (k, v));
                let from_wavl = wavl.last_key_value();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(from_btree.map(|(_, v)| v), wavl.max());
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_wavl = wavl.pop_last();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        wavl.assert_invariants();
        assert_eq!(btree.len(), wavl.len());
        assert_eq!(btree.is_empty(), wavl.is_empty());
        assert!(btree.iter().map(|(&k, v)| (k, v)).eq(wavl.iter()));
    }
}
