use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use ordhash::HashTable;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("table::insert_fresh_100k", |b| {
        b.iter_batched(
            HashTable::<String>::new,
            |mut t| {
                for x in lcg(1).take(100_000) {
                    let _ = t.insert(key(x), false).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_reserved_100k(c: &mut Criterion) {
    c.bench_function("table::insert_reserved_100k", |b| {
        b.iter_batched(
            || {
                let mut t = HashTable::<String>::new();
                t.reserve(100_000).unwrap();
                t
            },
            |mut t| {
                for x in lcg(3).take(100_000) {
                    let _ = t.insert(key(x), false).unwrap();
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_delete_random_10k(c: &mut Criterion) {
    c.bench_function("table::delete_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let mut t = HashTable::new();
                let keys: Vec<String> = lcg(5).take(110_000).map(key).collect();
                for k in &keys {
                    let _ = t.insert(k.clone(), false).unwrap();
                }
                let n = keys.len();
                let mut s = 0x9e3779b97f4a7c15u64;
                let victims: Vec<String> = (0..10_000)
                    .map(|_| {
                        s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                        keys[(s as usize) % n].clone()
                    })
                    .collect();
                (t, victims)
            },
            |(mut t, victims)| {
                for k in &victims {
                    let _ = t.delete(k);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit_10k(c: &mut Criterion) {
    c.bench_function("table::find_hit_10k_on_100k", |b| {
        let mut t = HashTable::new();
        let keys: Vec<_> = lcg(7).take(100_000).map(key).collect();
        for k in &keys {
            let _ = t.insert(k.clone(), false).unwrap();
        }
        let n = keys.len();
        let mut s = 0x9e3779b97f4a7c15u64;
        let queries: Vec<String> = (0..10_000)
            .map(|_| {
                s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                keys[(s as usize) % n].clone()
            })
            .collect();
        b.iter(|| {
            for k in &queries {
                black_box(t.find(k));
            }
        })
    });
}

fn bench_find_miss_10k(c: &mut Criterion) {
    c.bench_function("table::find_miss_10k_on_100k", |b| {
        let mut t = HashTable::new();
        for x in lcg(11).take(100_000) {
            let _ = t.insert(key(x), false).unwrap();
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for k in miss.by_ref().take(10_000).map(key) {
                black_box(t.find(&k));
            }
        })
    });
}

fn bench_iterate_100k(c: &mut Criterion) {
    c.bench_function("table::iter_all_100k", |b| {
        let mut t = HashTable::new();
        for x in lcg(999).take(100_000) {
            let _ = t.insert(x, false).unwrap();
        }
        b.iter(|| {
            let mut sum = 0u64;
            for v in t.iter() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
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
    targets = bench_insert_fresh_100k, bench_insert_reserved_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_delete_random_10k,
              bench_find_hit_10k,
              bench_find_miss_10k,
              bench_iterate_100k
}
criterion_main!(benches_insert, benches_ops);
