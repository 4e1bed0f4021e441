use criterion::{black_box, criterion_group, criterion_main, Criterion};
use search_core::simhash::fingerprint_text;
use search_core::tokenizer::stem_all;

const TEXT: &str = "Search engines resolve free-text queries against an inverted index. \
    Each term maps to a postings list of documents and frequencies; the ranker weighs \
    terms by tf-idf, accumulates cosine scores and divides by document length. \
    Near-duplicate pages are suppressed at crawl time by comparing SimHash fingerprints.";

fn bench_tokenize(c: &mut Criterion) {
    let text = TEXT.repeat(50);
    c.bench_function("stem_all", |b| b.iter(|| stem_all(black_box(&text))));
    c.bench_function("fingerprint_text", |b| b.iter(|| fingerprint_text(black_box(&text))));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
