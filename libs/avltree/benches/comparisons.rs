use std::collections::BTreeSet;
use std::hint::black_box;

use avltree::AvlTree;
use criterion::{Criterion, criterion_group, criterion_main};
use rand::prelude::SliceRandom;
use rand::{Rng, rng};

fn avl(inserts: &[u64]) -> AvlTree<u64> {
    let mut tree = AvlTree::new();
    for i in inserts {
        tree.insert(*i);
    }
    tree
}

fn btree(inserts: &[u64]) -> BTreeSet<u64> {
    let mut set = BTreeSet::new();
    for i in inserts {
        set.insert(*i);
    }
    set
}

fn bench_inserts(c: &mut Criterion) {
    let mut rng = rng();

    let mut nums = (0..10_000).collect::<Vec<_>>();
    nums.shuffle(&mut rng);

    let mut group = c.benchmark_group("Insertions");
    group.bench_function("AvlTree", |b| b.iter(|| avl(black_box(&nums))));
    group.bench_function("BTreeSet", |b| b.iter(|| btree(black_box(&nums))));
    group.finish();
}

fn bench_range_count(c: &mut Criterion) {
    let mut rng = rng();

    let nums = (0..100_000)
        .map(|_| rng.random_range(0..1_000_000_000))
        .collect::<Vec<u64>>();
    let tree = avl(&nums);
    let set = btree(&nums);

    let queries = (0..1_000)
        .map(|_| {
            let a = rng.random_range(0..1_000_000_000);
            let b = rng.random_range(a..=1_000_000_000);
            (a, b)
        })
        .collect::<Vec<(u64, u64)>>();

    let mut group = c.benchmark_group("Range counts");
    group.bench_function("AvlTree", |b| {
        b.iter(|| {
            queries
                .iter()
                .map(|(a, b)| tree.range_count(a, b))
                .sum::<usize>()
        })
    });
    group.bench_function("BTreeSet", |b| {
        b.iter(|| {
            queries
                .iter()
                .map(|(a, b)| set.range(a..=b).count())
                .sum::<usize>()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_inserts, bench_range_count);
criterion_main!(benches);
