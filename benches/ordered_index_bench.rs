use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ordhash::{DuplicatePolicy, OrderedIndex};
use std::ops::Bound;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn filled(seed: u64, n: usize) -> OrderedIndex<u64> {
    let mut idx = OrderedIndex::new();
    for x in lcg(seed).take(n) {
        let _ = idx.insert(x % 1_000_000, DuplicatePolicy::InsertLast);
    }
    idx
}

fn bench_insert_random_100k(c: &mut Criterion) {
    c.bench_function("ordered::insert_random_100k", |b| {
        b.iter_batched(
            OrderedIndex::<u64>::new,
            |mut idx| {
                for x in lcg(1).take(100_000) {
                    let _ = idx.insert(x, DuplicatePolicy::InsertLast);
                }
                black_box(idx)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_ascending_100k(c: &mut Criterion) {
    c.bench_function("ordered::insert_ascending_100k", |b| {
        b.iter_batched(
            OrderedIndex::<u64>::new,
            |mut idx| {
                for x in 0..100_000u64 {
                    let _ = idx.insert(x, DuplicatePolicy::DoNothing);
                }
                black_box(idx)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_delete_random_10k(c: &mut Criterion) {
    c.bench_function("ordered::delete_random_10k_of_100k", |b| {
        b.iter_batched(
            || {
                let idx = filled(5, 100_000);
                let victims: Vec<u64> = lcg(5).take(10_000).map(|x| x % 1_000_000).collect();
                (idx, victims)
            },
            |(mut idx, victims)| {
                for v in &victims {
                    let _ = idx.delete(v, true);
                }
                black_box(idx)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_rank_queries(c: &mut Criterion) {
    let idx = filled(7, 100_000);
    let n = idx.len();
    c.bench_function("ordered::get_by_index_10k_on_100k", |b| {
        let mut s = 0x9e3779b97f4a7c15u64;
        let ranks: Vec<usize> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                (s as usize) % n
            })
            .collect();
        b.iter(|| {
            for &r in &ranks {
                black_box(idx.get_by_index(r).ok());
            }
        })
    });

    c.bench_function("ordered::count_range_10k_on_100k", |b| {
        let bounds: Vec<(u64, u64)> = lcg(17)
            .take(10_000)
            .map(|x| {
                let lo = x % 1_000_000;
                (lo, lo + 50_000)
            })
            .collect();
        b.iter(|| {
            for &(lo, hi) in &bounds {
                let r = idx.bounded_range(Bound::Included(lo), Bound::Excluded(hi));
                black_box(idx.count_range(&r));
            }
        })
    });
}

fn bench_iterate(c: &mut Criterion) {
    let idx = filled(999, 100_000);
    c.bench_function("ordered::iter_all_100k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for v in idx.iter() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });

    c.bench_function("ordered::range_rev_10pct_100k", |b| {
        b.iter(|| {
            let r = idx.bounded_range(Bound::Included(400_000), Bound::Excluded(500_000));
            black_box(idx.range_rev(r).count())
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_random_100k, bench_insert_ascending_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_delete_random_10k,
              bench_rank_queries,
              bench_iterate
}
criterion_main!(benches_insert, benches_ops);
