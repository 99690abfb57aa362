//! Benchmarks for comparison and fingerprinting
//!
//! These measure both engines on generated schemas of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use schemadiff_core::{
    Column, Constraint, DatabaseType, IgnoreFilter, Index, Schema, Sequence, Table, View,
};
use schemadiff_engine::{compare, fingerprint, FingerprintOptions};

/// Generate a schema with N tables of 12 columns each, plus views and sequences
fn generate_schema(num_tables: usize) -> Schema {
    let mut schema = Schema::new("bench", DatabaseType::Postgresql);

    for i in 0..num_tables {
        let name = format!("table_{}", i);
        let mut table = Table::new(&name).with_comment(format!("Generated table {}", i));

        for c in 0..12 {
            let column = Column::new(format!("col_{}", c), if c % 3 == 0 { "bigint" } else { "text" })
                .with_position(c + 1);
            table = table.with_column(column);
        }

        table = table
            .with_constraint(Constraint::primary_key(format!("pk_{}", name), ["col_0"]))
            .with_index(Index::new(format!("idx_{}_lookup", name), &name, ["col_1", "col_2"]));

        if i > 0 {
            table = table.with_constraint(Constraint::foreign_key(
                format!("fk_{}_parent", name),
                ["col_3"],
                format!("table_{}", i - 1),
                ["col_0"],
            ));
        }

        schema = schema
            .with_table(table)
            .with_view(View::new(format!("view_{}", i), format!("SELECT * FROM {}", name)))
            .with_sequence(Sequence::new(format!("seq_{}", i)));
    }

    schema
}

/// Same schema with every tenth table's second column retyped
fn drifted(schema: &Schema) -> Schema {
    let mut schema = schema.clone();
    for table in schema.tables.iter_mut().step_by(10) {
        table.columns[1].data_type = "varchar(255)".to_string();
    }
    schema
}

/// Benchmark: compare identical and drifted schemas (100, 500, 1000 tables)
fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    for num_tables in [100, 500, 1000].iter() {
        let source = generate_schema(*num_tables);
        let target = drifted(&source);

        group.bench_with_input(BenchmarkId::new("identical", num_tables), num_tables, |b, _| {
            b.iter(|| black_box(compare(&source, &source, None)));
        });

        group.bench_with_input(BenchmarkId::new("drifted", num_tables), num_tables, |b, _| {
            b.iter(|| black_box(compare(&source, &target, None)));
        });
    }

    group.finish();
}

/// Benchmark: compare with ignore patterns applied
fn bench_compare_filtered(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_filtered");
    let filter = IgnoreFilter::compile(["table:table_1*", "column:col_1?", "view:*"])
        .expect("valid ignore patterns");

    let source = generate_schema(500);
    let target = drifted(&source);

    group.bench_function("500_tables", |b| {
        b.iter(|| black_box(compare(&source, &target, Some(&filter))));
    });

    group.finish();
}

/// Benchmark: fingerprint with and without comments (100, 500, 1000 tables)
fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");

    for num_tables in [100, 500, 1000].iter() {
        let schema = generate_schema(*num_tables);
        let plain = FingerprintOptions::default();
        let with_comments = FingerprintOptions::default().with_comments(true);

        group.bench_with_input(BenchmarkId::new("default", num_tables), num_tables, |b, _| {
            b.iter(|| black_box(fingerprint(&schema, &plain)));
        });

        group.bench_with_input(BenchmarkId::new("with_comments", num_tables), num_tables, |b, _| {
            b.iter(|| black_box(fingerprint(&schema, &with_comments)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compare, bench_compare_filtered, bench_fingerprint);

criterion_main!(benches);
