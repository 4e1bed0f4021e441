use criterion::{black_box, criterion_group, criterion_main, Criterion};
use search_core::persist::{save_stopwords, write_index, IndexPaths};
use search_core::{Config, Engine, InvertedIndex};
use tempfile::tempdir;

const WORDS: [&str; 12] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet", "kilo", "lima",
];

/// 2000 documents over twelve terms, split into three shards.
fn build(dir: &std::path::Path) {
    let paths = IndexPaths::new(dir);
    let mut index = InvertedIndex::new();
    for id in 0..2000u32 {
        index.add_document(id, format!("https://bench.example/{id}"), 1.0 + f64::from(id % 7));
        for (i, word) in WORDS.iter().enumerate() {
            if (id as usize + i) % (i + 2) == 0 {
                index.add_posting(*word, id, 1 + id % 5);
            }
        }
    }
    write_index(&paths, &index, "bench_", &["d".to_string(), "i".to_string()]).unwrap();
    save_stopwords(&paths.stopwords(), &["the", "of"]).unwrap();
}

fn bench_search(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    build(dir.path());

    let cached = Engine::open(dir.path(), Config::default()).unwrap();
    c.bench_function("search_cached", |b| {
        b.iter(|| cached.search(black_box("alpha golf kilo the"), false).unwrap())
    });

    // no cache: every term seeks its shard
    let uncached = Engine::open(dir.path(), Config { cache_size: 0, ..Config::default() }).unwrap();
    c.bench_function("search_from_disk", |b| {
        b.iter(|| uncached.search(black_box("alpha golf kilo the"), false).unwrap())
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
