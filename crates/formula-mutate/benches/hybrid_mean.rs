use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use formula_frame::{Column, Grouping, Table};
use formula_mutate::{Expr, MutateEngine, MutateOptions, NamedExpr};
use std::time::Duration;

fn bench_rows() -> usize {
    std::env::var("FORMULA_MUTATE_BENCH_ROWS")
        .ok()
        .and_then(|v| v.replace('_', "").parse::<usize>().ok())
        .filter(|&v| (10_000..=5_000_000).contains(&v))
        .unwrap_or(200_000)
}

fn build_table(rows: usize) -> Table {
    let groups = 1_000i64;
    Table::new(vec![
        ("g", Column::integer((0..rows as i64).map(|i| Some(i % groups)))),
        (
            "x",
            Column::double((0..rows).map(|i| (i % 97 != 0).then_some((i % 100) as f64 * 0.5))),
        ),
    ])
    .unwrap()
}

fn bench_hybrid_mean(c: &mut Criterion) {
    let rows = bench_rows();
    let table = build_table(rows);
    let grouping = Grouping::by_keys(&table, &["g"]).unwrap();
    let exprs = vec![NamedExpr::new(
        "m",
        Expr::call("mean", [Expr::symbol("x")]).named_arg("drop_missing", true.into()),
    )];

    let hybrid = MutateEngine::default();
    let generic =
        MutateEngine::default().with_options(MutateOptions::default().with_hybrid(false));

    let mut group = c.benchmark_group("grouped_mean");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_with_input(BenchmarkId::new("hybrid", rows), &rows, |b, _| {
        b.iter(|| black_box(hybrid.transform(&table, &grouping, &exprs).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("generic", rows), &rows, |b, _| {
        b.iter(|| black_box(generic.transform(&table, &grouping, &exprs).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_hybrid_mean);
criterion_main!(benches);
