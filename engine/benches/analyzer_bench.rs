use criterion::{criterion_group, criterion_main, Criterion};
use scribe_engine::{Analyzer, AnalyzerConfig};

fn bench_analyze(c: &mut Criterion) {
    let analyzer = Analyzer::new(AnalyzerConfig::default());
    let text = "An information retrieval system accepts short records of titles \
                and abstracts, normalizes them into index terms, and answers \
                boolean and ranked queries against the resulting inverted index. "
        .repeat(64);
    c.bench_function("analyze_abstracts", |b| b.iter(|| analyzer.analyze(&text)));
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
