#![allow(dead_code)]

use duckbridge::native::local::{CollectingSink, MemoryResult};
use duckbridge::{Appender, DriverConfig, DuckBridgeResult, LogicalType, QueryResult, TypeCache, Value};
use std::sync::Arc;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing for test binaries. Safe to call multiple times.
pub fn init_tracing() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .init();
    });
}

/// Small chunks so tests cross chunk boundaries quickly
pub fn test_config() -> DriverConfig {
    DriverConfig::default().with_vector_capacity(64)
}

/// Column names c0, c1, ...
pub fn column_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("c{}", i)).collect()
}

/// Append `rows` through an appender and open a result over the chunks
pub fn load(types: &[LogicalType], rows: &[Vec<Value>]) -> DuckBridgeResult<QueryResult<MemoryResult>> {
    init_tracing();
    let mut sink = CollectingSink::new();
    {
        let mut appender = Appender::new(types.to_vec(), &mut sink, &test_config())?;
        for row in rows {
            appender.append_row(row)?;
        }
        appender.close()?;
    }
    let source = MemoryResult::new(column_names(types.len()), types.to_vec(), sink.into_chunks())?;
    Ok(QueryResult::new(source, Arc::new(TypeCache::new())))
}

/// Single-column convenience: every value becomes one row
pub fn load_column(logical_type: LogicalType, values: &[Value]) -> DuckBridgeResult<QueryResult<MemoryResult>> {
    let rows: Vec<Vec<Value>> = values.iter().map(|v| vec![v.clone()]).collect();
    load(&[logical_type], &rows)
}

/// Read back every row of a single-column result as `T`
pub fn read_column<T: duckbridge::FromVector>(
    result: &mut QueryResult<MemoryResult>,
) -> DuckBridgeResult<Vec<T>> {
    let mut out = Vec::new();
    result.for_each_row(|row| {
        out.push(row.get::<T>(0)?);
        Ok(())
    })?;
    Ok(out)
}
