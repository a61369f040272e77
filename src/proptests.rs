use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;
use std::ops::ControlFlow;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 50)]
    Put(#[proptest(strategy = "key_strategy()")] Vec<u8>, Option<u64>),
    #[proptest(weight = 25)]
    Remove(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 25)]
    Get(#[proptest(strategy = "key_strategy()")] Vec<u8>),
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    // Mostly a tiny alphabet so keys share prefixes and force splits, with the
    // occasional arbitrary byte to stretch child windows.
    let byte = prop_oneof![
        8 => b'a'..=b'd',
        1 => any::<u8>(),
    ];
    prop::collection::vec(byte, 0..=12)
}

fn keys_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(key_strategy(), 0..=200)
}

fn model_of(keys: &[Vec<u8>]) -> (Trie<usize>, BTreeMap<Vec<u8>, usize>) {
    let mut t = Trie::new();
    let mut m = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(t.insert(k, i), m.insert(k.clone(), i));
    }
    (t, m)
}

fn for_each_keys<V>(t: &Trie<V>) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    t.for_each(|k, _| {
        out.push(k.to_vec());
        ControlFlow::Continue(())
    });
    out
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=1000)) {
        let mut t: Trie<u64> = Trie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    let old_m = match value {
                        Some(v) => m.insert(key.clone(), v),
                        None => m.remove(&key),
                    };
                    prop_assert_eq!(t.put(&key, value), old_m);
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(&key), m.remove(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key).copied(), m.get(&key).copied());
                    prop_assert_eq!(t.contains_key(&key), m.contains_key(&key));
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        prop_assert_eq!(t.check_invariants(), Ok(()));
        let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
        prop_assert_eq!(for_each_keys(&t), m.keys().cloned().collect::<Vec<_>>());
    }

    #[test]
    fn prop_prefix_scope_is_subset(keys in keys_strategy(), prefix in key_strategy()) {
        let (t, _) = model_of(&keys);
        let expected: Vec<Vec<u8>> = for_each_keys(&t)
            .into_iter()
            .filter(|k| k.starts_with(&prefix))
            .collect();

        let mut scoped = Vec::new();
        t.for_each_with_prefix(&prefix, |k, v| {
            assert_eq!(t.get(k), Some(v));
            scoped.push(k.to_vec());
            ControlFlow::Continue(())
        });
        prop_assert_eq!(&scoped, &expected);

        let pulled: Vec<Vec<u8>> = t.iter_prefix(&prefix).map(|(k, _)| k).collect();
        prop_assert_eq!(pulled, expected);
    }

    #[test]
    fn prop_prefix_queries_match_model(keys in keys_strategy(), query in key_strategy()) {
        let (t, m) = model_of(&keys);

        let expected: Vec<(&[u8], usize)> = (0..=query.len())
            .rev()
            .filter_map(|i| m.get(&query[..i]).map(|v| (&query[..i], *v)))
            .collect();
        let got: Vec<(&[u8], usize)> = t
            .find_all_prefixes(&query)
            .into_iter()
            .map(|(k, v)| (k, *v))
            .collect();
        prop_assert_eq!(&got, &expected);

        let longest = t.find_prefix(&query).map(|(k, v)| (k, *v));
        prop_assert_eq!(longest, expected.first().copied());
    }

    #[test]
    fn prop_prefix_queries_survive_removals(
        keys in keys_strategy(),
        drop_mask in prop::collection::vec(any::<bool>(), 200),
        query in key_strategy(),
    ) {
        let (mut t, mut m) = model_of(&keys);
        let dropped: Vec<Vec<u8>> = keys
            .iter()
            .zip(&drop_mask)
            .filter(|(_, d)| **d)
            .map(|(k, _)| k.clone())
            .collect();
        for k in &dropped {
            prop_assert_eq!(t.remove(k), m.remove(k));
        }
        prop_assert_eq!(t.check_invariants(), Ok(()));

        let scoped_model: Vec<(Vec<u8>, usize)> = m
            .iter()
            .filter(|(k, _)| k.starts_with(&query))
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        let mut scoped = Vec::new();
        t.for_each_with_prefix(&query, |k, v| {
            scoped.push((k.to_vec(), *v));
            ControlFlow::Continue(())
        });
        prop_assert_eq!(&scoped, &scoped_model);
        let pulled: Vec<(Vec<u8>, usize)> = t.iter_prefix(&query).map(|(k, v)| (k, *v)).collect();
        prop_assert_eq!(&pulled, &scoped_model);

        let expected: Vec<(&[u8], usize)> = (0..=query.len())
            .rev()
            .filter_map(|i| m.get(&query[..i]).map(|v| (&query[..i], *v)))
            .collect();
        let got: Vec<(&[u8], usize)> = t
            .find_all_prefixes(&query)
            .into_iter()
            .map(|(k, v)| (k, *v))
            .collect();
        prop_assert_eq!(&got, &expected);
        prop_assert_eq!(t.find_prefix(&query).map(|(k, v)| (k, *v)), expected.first().copied());

        for (i, k) in dropped.iter().enumerate() {
            let v = usize::MAX - i;
            prop_assert_eq!(t.insert(k, v), m.insert(k.clone(), v));
        }
        prop_assert_eq!(t.check_invariants(), Ok(()));
        let got: Vec<(Vec<u8>, usize)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(Vec<u8>, usize)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_no_accidental_prefixes(keys in keys_strategy()) {
        let (t, m) = model_of(&keys);
        for k in &keys {
            for i in 0..k.len() {
                prop_assert_eq!(t.get(&k[..i]).copied(), m.get(&k[..i]).copied());
            }
        }
    }

    #[test]
    fn prop_overwrite_keeps_one_entry(keys in keys_strategy(), key in key_strategy()) {
        let (mut t, _) = model_of(&keys);
        t.insert(&key, usize::MAX - 1);
        let before = t.iter().count();
        prop_assert_eq!(t.insert(&key, usize::MAX), Some(usize::MAX - 1));
        prop_assert_eq!(t.get(&key), Some(&usize::MAX));
        prop_assert_eq!(t.iter().count(), before);
        prop_assert_eq!(t.len(), before);
    }
}

/// Visits every ordering of `items`, swapping in place (Heap's algorithm).
fn each_ordering<T: Clone>(items: &[T], mut visit: impl FnMut(&[T])) {
    let mut order = items.to_vec();
    let mut counters = vec![0usize; order.len()];
    visit(&order);

    let mut i = 1;
    while i < order.len() {
        if counters[i] < i {
            let j = if i % 2 == 0 { 0 } else { counters[i] };
            order.swap(j, i);
            visit(&order);
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
}

fn small_set() -> Vec<Vec<u8>> {
    vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
        b"ba".to_vec(),
        b"abc".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_set();

    each_ordering(&keys, |order| {
        let (t, m) = model_of(order);

        assert_eq!(t.check_invariants(), Ok(()));
        let got: Vec<(Vec<u8>, usize)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(Vec<u8>, usize)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys = small_set();
    let (base_trie, base_map) = model_of(&keys);

    each_ordering(&keys, |order| {
        let mut t = base_trie.clone();
        let mut m = base_map.clone();

        for k in order {
            assert_eq!(t.remove(k), m.remove(k));
            assert_eq!(t.len(), m.len());
            assert_eq!(t.check_invariants(), Ok(()));
            assert_eq!(for_each_keys(&t), m.keys().cloned().collect::<Vec<_>>());
        }
        assert!(t.is_empty());
        assert_eq!(t.iter().count(), 0);
    });
}

#[test]
fn exhaustive_sibling_bytes() {
    // Every ordered pair of sibling selector bytes, including the ones that
    // land just below an existing window.
    for first in 0..=255u8 {
        for second in 0..=255u8 {
            let mut t: Trie<u8> = Trie::new();
            t.insert([b'p', first], first);
            t.insert([b'p', second], second);
            t.insert([b'p', first.wrapping_sub(1)], first.wrapping_sub(1));

            assert_eq!(t.get([b'p', first]), Some(&first));
            assert_eq!(t.get([b'p', second]), Some(&second));
            assert_eq!(t.get([b'p', first.wrapping_sub(1)]), Some(&first.wrapping_sub(1)));
            assert_eq!(t.check_invariants(), Ok(()));

            let keys: Vec<Vec<u8>> = t.iter().map(|(k, _)| k).collect();
            assert!(keys.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
