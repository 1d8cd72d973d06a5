// Throughput smoke-measurements for insert/get/delete/range. Plain
// `std::time::Instant` timing rather than the nightly `#[bench]]`
// harness, so this runs on stable via `cargo bench --bench bench` with
// `harness = false` (see Cargo.toml).

use llrb_tree::RedBlackTree;
use rand::Rng;
use std::time::Instant;

const N: usize = 50_000;

fn timed(label: &str, f: impl FnOnce()) {
    let start = Instant::now();
    f();
    println!("{label}: {:?} for {N} ops", start.elapsed());
}

fn main() {
    let mut rng = rand::thread_rng();
    let keys: Vec<u64> = (0..N as u64).collect();
    let values: Vec<u64> = (0..N).map(|_| rng.gen()).collect();

    let mut tree = RedBlackTree::new();
    tree.reserve(N).unwrap();
    timed("insert", || {
        for i in 0..N {
            tree.insert(keys[i], values[i]).unwrap();
        }
    });

    timed("get", || {
        for &k in &keys {
            assert!(tree.get(&k).is_some());
        }
    });

    timed("range (full span)", || {
        let mut buf = vec![0u64; N];
        let count = tree.range(&keys[0], &keys[N - 1], &mut buf);
        assert_eq!(count, N);
    });

    timed("delete", || {
        for &k in &keys {
            assert!(tree.delete(&k).is_some());
        }
    });
}
