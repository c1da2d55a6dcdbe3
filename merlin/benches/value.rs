//! Value comparison benchmarks for Merlin.
//!
//! Measures equality paths across scalar, coerced, and structural values.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use merlin::Value;

fn generate_list(n: i64) -> Value {
    Value::list((0..n).map(Value::from).collect())
}

fn generate_map(n: i64) -> Value {
    Value::map_of((0..n).map(|i| (format!("key{i}"), Value::from(i))))
}

fn bench_scalar_equality(c: &mut Criterion) {
    let a = Value::from(42);
    let b = Value::from(42.0);

    c.bench_function("value/loose_numeric", |bench| {
        bench.iter(|| black_box(a.loose_eq(&b)));
    });
    c.bench_function("value/strict_numeric", |bench| {
        bench.iter(|| black_box(a.strict_eq(&b)));
    });
}

fn bench_string_coercion(c: &mut Criterion) {
    let number = Value::from(12345);
    let text = Value::from("12345");

    c.bench_function("value/loose_numeric_string", |bench| {
        bench.iter(|| black_box(number.loose_eq(&text)));
    });
}

fn bench_structural_equality(c: &mut Criterion) {
    let mut group = c.benchmark_group("value/structural");

    for size in &[10_i64, 100, 1000] {
        let left = generate_list(*size);
        let right = generate_list(*size);
        group.bench_with_input(BenchmarkId::new("list", size), &(left, right), |b, (l, r)| {
            b.iter(|| black_box(l.strict_eq(r)));
        });
    }

    for size in &[10_i64, 100] {
        let left = generate_map(*size);
        let right = generate_map(*size);
        group.bench_with_input(BenchmarkId::new("map", size), &(left, right), |b, (l, r)| {
            b.iter(|| black_box(l.strict_eq(r)));
        });
    }

    group.finish();
}

fn bench_shared_composite(c: &mut Criterion) {
    // Clones share the backing allocation, so equality can short-circuit
    // on pointer identity before walking elements.
    let original = generate_list(1000);
    let clone = original.clone();

    c.bench_function("value/shared_list", |bench| {
        bench.iter(|| black_box(original.strict_eq(&clone)));
    });
}

criterion_group!(
    benches,
    bench_scalar_equality,
    bench_string_coercion,
    bench_structural_equality,
    bench_shared_composite,
);
criterion_main!(benches);
