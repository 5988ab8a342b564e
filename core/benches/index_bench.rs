use criterion::{criterion_group, criterion_main, Criterion};
use recommend_core::{build_index, IndexConfig};

fn corpus() -> Vec<(String, String)> {
    let words = ["rust", "compiler", "rover", "mars", "garlic", "onion", "async", "lander", "moon", "borrow"];
    (0..300)
        .map(|i| {
            let text: Vec<&str> = (0..40).map(|k| words[(i * 7 + k * 3) % words.len()]).collect();
            (format!("article {i}"), text.join(" "))
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let docs = corpus();
    c.bench_function("build_index_300", |b| b.iter(|| build_index(docs.clone(), &IndexConfig::default())));
}

fn bench_recommend(c: &mut Criterion) {
    let index = build_index(corpus(), &IndexConfig::default()).expect("valid corpus");
    c.bench_function("recommend_top5", |b| b.iter(|| index.recommend("article 42", 5)));
}

criterion_group!(benches, bench_build, bench_recommend);
criterion_main!(benches);
