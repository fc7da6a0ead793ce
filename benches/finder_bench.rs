use afaire::finder::{FileFilter, FilterKind, FuzzyFinder};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn candidates() -> Vec<String> {
    (0..64).map(|i| format!("note-{:03}-meeting-minutes.md", i)).collect()
}

fn bench_filters(c: &mut Criterion) {
    let names = candidates();

    for (label, kind) in [
        ("substring", FilterKind::Substring { case_sensitive: false }),
        ("subsequence", FilterKind::Subsequence { case_sensitive: false }),
    ] {
        c.bench_function(&format!("filter_{}", label), |b| {
            b.iter(|| {
                names
                    .iter()
                    .filter(|name| kind.matches(black_box("mtg"), name))
                    .count()
            })
        });
    }
}

fn bench_resolve(c: &mut Criterion) {
    let names = candidates();
    let filter = FilterKind::default();
    let mut finder = FuzzyFinder::new();
    finder.open();
    finder.set_query("meeting", &names, &filter);

    c.bench_function("finder_resolve", |b| {
        b.iter(|| finder.resolve(black_box(&names), &filter))
    });
}

criterion_group!(benches, bench_filters, bench_resolve);
criterion_main!(benches);
