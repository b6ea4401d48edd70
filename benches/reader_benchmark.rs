use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use duckbridge::native::local::{CollectingSink, LocalDataChunk, MemoryResult};
use duckbridge::{Appender, DriverConfig, LogicalType, QueryResult, TypeCache, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use std::sync::Arc;

const ROWS: usize = 8192;

fn columns() -> Vec<LogicalType> {
    vec![
        LogicalType::BigInt,
        LogicalType::Varchar,
        LogicalType::list(LogicalType::Integer),
    ]
}

fn random_rows(rows: usize) -> Vec<Vec<Value>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..rows)
        .map(|i| {
            let name_len = rng.random_range(0..32);
            let name: String = (0..name_len).map(|_| rng.random_range('a'..='z')).collect();
            let items = (0..rng.random_range(0..5))
                .map(|_| {
                    if rng.random_bool(0.1) {
                        Value::Null
                    } else {
                        Value::Integer(rng.random())
                    }
                })
                .collect();
            vec![
                if rng.random_bool(0.05) {
                    Value::Null
                } else {
                    Value::BigInt(i as i64)
                },
                Value::from(name),
                Value::list(items),
            ]
        })
        .collect()
}

fn append_all(rows: &[Vec<Value>]) -> Vec<LocalDataChunk> {
    let mut sink = CollectingSink::new();
    {
        let mut appender = Appender::new(columns(), &mut sink, &DriverConfig::default())
            .expect("appender");
        for row in rows {
            appender.append_row(row).expect("append");
        }
        appender.close().expect("close");
    }
    sink.into_chunks()
}

fn bench_append(c: &mut Criterion) {
    let rows = random_rows(ROWS);
    let mut group = c.benchmark_group("append");
    group.throughput(Throughput::Elements(ROWS as u64));
    group.bench_function("mixed_rows", |b| b.iter(|| black_box(append_all(&rows))));
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let rows = random_rows(ROWS);
    let cache = Arc::new(TypeCache::new());
    let names = vec!["id".to_string(), "name".to_string(), "items".to_string()];
    let mut group = c.benchmark_group("read");
    group.throughput(Throughput::Elements(ROWS as u64));

    group.bench_with_input(BenchmarkId::new("typed", ROWS), &rows, |b, rows| {
        b.iter_batched(
            || MemoryResult::new(names.clone(), columns(), append_all(rows)).expect("result"),
            |source| {
                let mut result = QueryResult::new(source, Arc::clone(&cache));
                let mut total = 0i64;
                result
                    .for_each_row(|row| {
                        total += row.get::<Option<i64>>(0)?.unwrap_or(0);
                        total += row.get::<String>(1)?.len() as i64;
                        total += row.get::<Vec<Option<i32>>>(2)?.len() as i64;
                        Ok(())
                    })
                    .expect("read");
                black_box(total)
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_with_input(BenchmarkId::new("values", ROWS), &rows, |b, rows| {
        b.iter_batched(
            || MemoryResult::new(names.clone(), columns(), append_all(rows)).expect("result"),
            |source| {
                let mut result = QueryResult::new(source, Arc::clone(&cache));
                black_box(result.collect_rows().expect("read"))
            },
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_append, bench_read);
criterion_main!(benches);
