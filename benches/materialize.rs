use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lazyseq::prelude::*;

fn naturals() -> LazySequence<i64> {
    let rule: lazyseq::generator::Rule<i64> =
        Rc::new(|prefix: &[i64]| prefix.last().map(|n| n + 1).unwrap_or(0));
    LazySequence::generated(rule, Vec::new())
}

fn bench_materialize_through_rule(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize_naturals");
    for n in [100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let seq = naturals();
                for i in 0..n {
                    black_box(seq.get(i).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn bench_materialize_through_map_and_where(c: &mut Criterion) {
    let mut group = c.benchmark_group("materialize_map_where");
    for n in [100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let base = naturals();
                // Drive the base's own generator first -- `where_`/`map`
                // views carry no generator of their own (see
                // `LazySequence::where_`), so every element they will read
                // through must already be materialized on the base.
                black_box(base.get(n - 1).unwrap());
                let evens = base.where_(Rc::new(|x: &i64| x % 2 == 0));
                let doubled = evens.map(Rc::new(|x: i64| x * 2));
                black_box(doubled.get(n / 4).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_materialize_through_rule,
    bench_materialize_through_map_and_where
);
criterion_main!(benches);
