use itertools::Itertools;
use llrb_tree::{InsertOutcome, RedBlackTree};
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use std::collections::BTreeMap;

const OPS: usize = 20_000;

fn simulate(seed_size: usize) {
    let mut tree = RedBlackTree::new();
    tree.reserve(seed_size * 4).unwrap();
    let mut rng = thread_rng();
    let mut map: BTreeMap<u64, u64> = BTreeMap::new();
    let mut keys: Vec<u64> = Vec::new();

    for _ in 0..seed_size {
        let k = rng.gen::<u64>();
        let v = rng.gen::<u64>();
        assert_eq!(tree.insert(k, v).unwrap(), InsertOutcome::Inserted);
        map.insert(k, v);
        keys.push(k);
        assert_eq!(tree.len(), map.len());
    }

    for _ in 0..OPS {
        assert_eq!(tree.len(), map.len());
        let sample: f64 = rng.gen();
        if sample < 0.34 {
            let k = rng.gen::<u64>();
            let v = rng.gen::<u64>();
            let outcome = tree.insert(k, v).unwrap();
            if map.insert(k, v).is_none() {
                assert_eq!(outcome, InsertOutcome::Inserted);
                keys.push(k);
            } else {
                assert_eq!(outcome, InsertOutcome::AlreadyPresent);
            }
        } else if sample < 0.67 {
            if keys.is_empty() {
                continue;
            }
            let j = rng.gen_range(0, keys.len());
            let key = keys.swap_remove(j);
            assert_eq!(tree.get(&key), map.get(&key));
            let expected_value = map.remove(&key);
            assert_eq!(tree.delete(&key), expected_value.map(|v| (key, v)));
        } else {
            if keys.is_empty() {
                continue;
            }
            let j = rng.gen_range(0, keys.len());
            let key = keys[j];
            let v = rng.gen::<u64>();
            tree.update(key, v).unwrap();
            map.insert(key, v);
        }
        assert!(tree.is_valid_llrb());
    }

    for (k1, k2) in map.keys().zip(tree.iter().map(|(k, _)| k)) {
        assert_eq!(k1, k2);
    }
    for (k, v) in map.iter() {
        assert_eq!(tree.get(k), Some(v));
    }
}

#[test]
fn simulate_against_btreemap_oracle() {
    simulate(2_000);
}

#[test]
fn range_matches_btreemap_range_for_random_trees() {
    let mut rng: ThreadRng = thread_rng();
    let mut tree = RedBlackTree::new();
    let mut map = BTreeMap::new();
    for _ in 0..5_000 {
        let k = rng.gen::<u32>();
        let v = rng.gen::<u32>();
        if tree.insert(k, v).unwrap() == InsertOutcome::Inserted {
            map.insert(k, v);
        }
    }

    for _ in 0..200 {
        let (mut lo, mut hi) = (rng.gen::<u32>(), rng.gen::<u32>());
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        let expected: Vec<u32> = map.range(lo..=hi).map(|(&k, _)| k).collect();
        let via_iterator: Vec<u32> = tree.range_iterator(lo, hi).collect();
        assert_eq!(expected, via_iterator);

        let mut buf = vec![0u32; expected.len() + 4];
        let count = tree.range(&lo, &hi, &mut buf);
        assert_eq!(&buf[..count], expected.as_slice());
    }
}

#[test]
fn shuffled_deletion_order_preserves_equivalence() {
    let mut tree = RedBlackTree::new();
    let mut map = BTreeMap::new();
    let mut rng = thread_rng();
    let mut keys: Vec<i64> = (0..3_000).collect();
    keys.shuffle(&mut rng);
    for &k in &keys {
        tree.insert(k, k.to_string()).unwrap();
        map.insert(k, k.to_string());
    }

    let ordered_keys: Vec<i64> = tree.iter().map(|(&k, _)| k).collect();
    assert!(ordered_keys.iter().tuple_windows().all(|(a, b)| a < b));

    keys.shuffle(&mut rng);
    for &k in &keys {
        assert_eq!(tree.delete(&k).map(|(k, _)| k), Some(k));
        map.remove(&k);
        assert!(tree.is_valid_llrb());
    }
    assert!(tree.is_empty());
    assert_eq!(map.len(), 0);
}
