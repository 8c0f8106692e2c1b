//! Benchmarks for Shelfmark indexes
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use shelfmark::catalog::{Book, Catalog};
use shelfmark::config::CatalogConfig;
use shelfmark::{KeyRule, KeyedIndex, LinkedStore, RangeStatsTree};

fn create_test_books(count: usize) -> Vec<Book> {
    (0..count)
        .map(|i| {
            Book::new(
                format!("978-{:010}", i),
                format!("Title {:05}", (i * 7919) % count),
                format!("Author {:04}", i % 997),
                1900 + (i % 124) as i32,
                "Bench",
            )
        })
        .collect()
}

fn title_index(store: &LinkedStore<Book>) -> KeyedIndex<Book> {
    let mut index = KeyedIndex::new(KeyRule::case_insensitive("title", |b: &Book| b.title.clone()));
    index.rebuild(store.iter());
    index
}

fn bench_keyed_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed_index");

    for size in [100, 1000, 10000] {
        let mut store = LinkedStore::new();
        for book in create_test_books(size) {
            store.append(book);
        }

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("build_{}", size), |b| {
            b.iter(|| title_index(black_box(&store)))
        });

        let index = title_index(&store);

        group.bench_function(format!("find_exact_{}", size), |b| {
            b.iter(|| index.find_exact(black_box("title 00042")))
        });

        group.bench_function(format!("find_prefix_{}", size), |b| {
            b.iter(|| index.find_by_prefix(black_box("title 000")))
        });
    }

    group.finish();
}

fn bench_range_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_stats");

    let mut tree = RangeStatsTree::from_range(1900..=2023).unwrap();

    group.bench_function("update", |b| {
        b.iter(|| tree.update(black_box(1949), 1, 0))
    });

    group.bench_function("query_full_domain", |b| {
        b.iter(|| tree.query(black_box(1900), black_box(2023)))
    });

    group.bench_function("query_decade", |b| {
        b.iter(|| tree.query(black_box(1950), black_box(1959)))
    });

    group.finish();
}

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");
    let config = CatalogConfig::default();

    group.bench_function("remove_and_rebuild_1000", |b| {
        b.iter_batched(
            || Catalog::from_books(&config, create_test_books(1000)).unwrap(),
            |mut catalog| catalog.remove_book(black_box("978-0000000500")).unwrap(),
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_keyed_index, bench_range_stats, bench_catalog);
criterion_main!(benches);
