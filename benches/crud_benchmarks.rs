use btree_index::BTree;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;
use std::hint::black_box;

const N: usize = 10_000;
const MAX_ENTRIES: usize = 64;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys.sort_unstable();
    keys.dedup();
    // Restore a scrambled order after dropping duplicates.
    let len = keys.len();
    for i in 0..len {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.swap(i, (x >> 33) as usize % len);
    }
    keys
}

fn build_tree(keys: &[i64]) -> BTree<i64, i64> {
    let mut tree = BTree::new(MAX_ENTRIES);
    for &k in keys {
        tree.insert(k, k).unwrap();
    }
    tree
}

fn build_map(keys: &[i64]) -> BTreeMap<i64, i64> {
    keys.iter().map(|&k| (k, k)).collect()
}

// ─── Insert ─────────────────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion, name: &str, keys: &[i64]) {
    let mut group = c.benchmark_group(name);

    group.bench_function(BenchmarkId::new("BTree", keys.len()), |b| {
        b.iter(|| build_tree(black_box(keys)));
    });

    group.bench_function(BenchmarkId::new("BTreeMap", keys.len()), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in black_box(keys) {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_insert_ordered(c: &mut Criterion) {
    bench_insert(c, "insert_ordered", &ordered_keys(N));
}

fn bench_insert_random(c: &mut Criterion) {
    bench_insert(c, "insert_random", &random_keys(N));
}

// ─── Find ───────────────────────────────────────────────────────────────────

fn bench_find(c: &mut Criterion, name: &str, keys: &[i64]) {
    let tree = build_tree(keys);
    let map = build_map(keys);
    let mut group = c.benchmark_group(name);

    group.bench_function(BenchmarkId::new("BTree", keys.len()), |b| {
        b.iter(|| {
            for k in keys {
                black_box(tree.find(k).ok());
            }
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", keys.len()), |b| {
        b.iter(|| {
            for k in keys {
                black_box(map.get(k));
            }
        });
    });

    group.finish();
}

fn bench_find_ordered(c: &mut Criterion) {
    bench_find(c, "find_ordered", &ordered_keys(N));
}

fn bench_find_random(c: &mut Criterion) {
    bench_find(c, "find_random", &random_keys(N));
}

// ─── Delete ─────────────────────────────────────────────────────────────────

fn bench_delete(c: &mut Criterion, name: &str, keys: &[i64]) {
    let tree = build_tree(keys);
    let map = build_map(keys);
    let mut group = c.benchmark_group(name);

    group.bench_function(BenchmarkId::new("BTree", keys.len()), |b| {
        b.iter_batched(
            || tree.clone(),
            |mut tree| {
                for k in keys {
                    black_box(tree.delete(k));
                }
                tree
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", keys.len()), |b| {
        b.iter_batched(
            || map.clone(),
            |mut map| {
                for k in keys {
                    black_box(map.remove(k));
                }
                map
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn bench_delete_ordered(c: &mut Criterion) {
    bench_delete(c, "delete_ordered", &ordered_keys(N));
}

fn bench_delete_random(c: &mut Criterion) {
    bench_delete(c, "delete_random", &random_keys(N));
}

criterion_group!(
    benches,
    bench_insert_ordered,
    bench_insert_random,
    bench_find_ordered,
    bench_find_random,
    bench_delete_ordered,
    bench_delete_random,
);
criterion_main!(benches);
