//! Query result cursor.
//!
//! A `QueryResult` pulls data chunks from a `ChunkSource` one at a time and
//! builds a reader tree per column over each. The previous chunk is released
//! before the next one is fetched, and a `ResultChunk` borrows the result, so
//! no reader can outlive the memory it reads.

use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::config::DriverConfig;
use crate::native::DataChunkHandle;
use crate::reader::{FromVector, ReaderFactory, TypeCache, VectorReader};
use crate::types::{LogicalType, Value};
use std::sync::Arc;

/// Producer of a query's data chunks
pub trait ChunkSource {
    type Chunk: DataChunkHandle;

    fn column_names(&self) -> &[String];

    fn column_types(&self) -> &[LogicalType];

    /// Next chunk, `None` once the result is exhausted
    fn next_chunk(&mut self) -> DuckBridgeResult<Option<Self::Chunk>>;
}

pub struct QueryResult<S: ChunkSource> {
    source: S,
    factory: ReaderFactory,
    current: Option<S::Chunk>,
    chunks_read: usize,
    rows_read: usize,
}

impl<S: ChunkSource> QueryResult<S> {
    pub fn new(source: S, cache: Arc<TypeCache>) -> Self {
        Self {
            source,
            factory: ReaderFactory::new(cache),
            current: None,
            chunks_read: 0,
            rows_read: 0,
        }
    }

    pub fn with_config(source: S, cache: Arc<TypeCache>, config: &DriverConfig) -> Self {
        let mut result = Self::new(source, cache);
        result.factory = result.factory.with_strict_utf8(config.strict_utf8);
        result
    }

    pub fn column_count(&self) -> usize {
        self.source.column_types().len()
    }

    pub fn column_names(&self) -> &[String] {
        self.source.column_names()
    }

    pub fn column_types(&self) -> &[LogicalType] {
        self.source.column_types()
    }

    /// Position of a column, matched case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.source
            .column_names()
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    pub fn chunks_read(&self) -> usize {
        self.chunks_read
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Release the current chunk and move to the next non-empty one
    pub fn next_chunk(&mut self) -> DuckBridgeResult<Option<ResultChunk<'_>>> {
        self.current = None;
        let chunk = loop {
            match self.source.next_chunk()? {
                None => return Ok(None),
                Some(chunk) if chunk.row_count() == 0 => continue,
                Some(chunk) => break chunk,
            }
        };
        let expected = self.source.column_types().len();
        if chunk.column_count() != expected {
            return Err(DuckBridgeError::Engine(format!(
                "Chunk has {} columns, result has {}",
                chunk.column_count(),
                expected
            )));
        }
        self.chunks_read += 1;
        self.rows_read += chunk.row_count();
        tracing::trace!(
            "consuming chunk {} of {} rows",
            self.chunks_read,
            chunk.row_count()
        );

        let chunk = &*self.current.insert(chunk);
        let readers = (0..chunk.column_count())
            .map(|column| self.factory.create_reader(chunk.vector(column)?))
            .collect::<DuckBridgeResult<Vec<_>>>()?;
        Ok(Some(ResultChunk {
            names: self.source.column_names(),
            row_count: chunk.row_count(),
            readers,
            position: None,
        }))
    }

    /// Call `f` for every row of every remaining chunk
    pub fn for_each_row<F>(&mut self, mut f: F) -> DuckBridgeResult<()>
    where
        F: FnMut(ResultRow<'_, '_>) -> DuckBridgeResult<()>,
    {
        while let Some(chunk) = self.next_chunk()? {
            for row in 0..chunk.row_count() {
                f(ResultRow { chunk: &chunk, row })?;
            }
        }
        Ok(())
    }

    /// Every remaining row as natural values
    pub fn collect_rows(&mut self) -> DuckBridgeResult<Vec<Vec<Value>>> {
        let mut rows = Vec::new();
        self.for_each_row(|row| {
            rows.push(row.values()?);
            Ok(())
        })?;
        Ok(rows)
    }
}

impl<S: ChunkSource + std::fmt::Debug> std::fmt::Debug for QueryResult<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResult")
            .field("source", &self.source)
            .field("chunks_read", &self.chunks_read)
            .field("rows_read", &self.rows_read)
            .finish()
    }
}

/// The chunk a result currently holds, with one reader per column
#[derive(Debug)]
pub struct ResultChunk<'r> {
    names: &'r [String],
    readers: Vec<VectorReader<'r>>,
    row_count: usize,
    position: Option<usize>,
}

impl<'r> ResultChunk<'r> {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.readers.len()
    }

    /// Advance the row cursor; false once past the last row
    pub fn next_row(&mut self) -> bool {
        let next = self.position.map_or(0, |row| row + 1);
        if next < self.row_count {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.row_count);
            false
        }
    }

    /// Row under the cursor
    pub fn position(&self) -> Option<usize> {
        self.position.filter(|row| *row < self.row_count)
    }

    pub fn column(&self, column: usize) -> DuckBridgeResult<&VectorReader<'r>> {
        self.readers.get(column).ok_or_else(|| {
            DuckBridgeError::OutOfBounds(format!(
                "Column {} of a {}-column result",
                column,
                self.readers.len()
            ))
        })
    }

    fn current_row(&self) -> DuckBridgeResult<usize> {
        self.position().ok_or_else(|| {
            DuckBridgeError::InvalidArgument("No current row; call next_row first".to_string())
        })
    }

    fn describe(&self, column: usize) -> String {
        match self.names.get(column) {
            Some(name) => format!("column '{}'", name),
            None => format!("column {}", column),
        }
    }

    pub fn is_null(&self, column: usize) -> DuckBridgeResult<bool> {
        let row = self.current_row()?;
        Ok(!self.column(column)?.is_valid(row))
    }

    pub fn get_value(&self, column: usize) -> DuckBridgeResult<Value> {
        self.value_at(self.current_row()?, column)
    }

    /// Read the current row of a column into a host type
    pub fn get<T: FromVector>(&self, column: usize) -> DuckBridgeResult<T> {
        self.get_at(self.current_row()?, column)
    }

    pub fn value_at(&self, row: usize, column: usize) -> DuckBridgeResult<Value> {
        self.column(column)?.get_value(row)
    }

    pub fn get_at<T: FromVector>(&self, row: usize, column: usize) -> DuckBridgeResult<T> {
        self.column(column)?
            .get(row)
            .map_err(|e| e.within(&self.describe(column)))
    }
}

/// One row of a result chunk
#[derive(Debug, Clone, Copy)]
pub struct ResultRow<'c, 'r> {
    chunk: &'c ResultChunk<'r>,
    row: usize,
}

impl ResultRow<'_, '_> {
    /// Row number within its chunk
    pub fn index(&self) -> usize {
        self.row
    }

    pub fn is_null(&self, column: usize) -> DuckBridgeResult<bool> {
        Ok(!self.chunk.column(column)?.is_valid(self.row))
    }

    pub fn get_value(&self, column: usize) -> DuckBridgeResult<Value> {
        self.chunk.value_at(self.row, column)
    }

    pub fn get<T: FromVector>(&self, column: usize) -> DuckBridgeResult<T> {
        self.chunk.get_at(self.row, column)
    }

    pub fn values(&self) -> DuckBridgeResult<Vec<Value>> {
        (0..self.chunk.column_count())
            .map(|column| self.get_value(column))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::local::{LocalDataChunk, MemoryResult};
    use crate::native::WritableVector;
    use crate::vector::FixedWidth;

    fn int_chunk(values: &[i32]) -> LocalDataChunk {
        let mut chunk = LocalDataChunk::new(&[LogicalType::Integer], 64);
        {
            let vector = chunk.vector_mut(0).unwrap();
            for (row, value) in values.iter().enumerate() {
                value.encode(&mut vector.data_mut()[row * 4..row * 4 + 4]);
            }
        }
        chunk.set_row_count(values.len()).unwrap();
        chunk
    }

    fn result(chunks: Vec<LocalDataChunk>) -> QueryResult<MemoryResult> {
        let source = MemoryResult::new(vec!["N".to_string()], vec![LogicalType::Integer], chunks)
            .unwrap();
        QueryResult::new(source, Arc::new(TypeCache::new()))
    }

    #[test]
    fn test_empty_chunks_are_skipped() {
        let mut result = result(vec![int_chunk(&[1, 2]), int_chunk(&[]), int_chunk(&[3])]);
        let rows = result.collect_rows().unwrap();
        assert_eq!(
            rows,
            vec![
                vec![Value::Integer(1)],
                vec![Value::Integer(2)],
                vec![Value::Integer(3)]
            ]
        );
        assert_eq!(result.chunks_read(), 2);
        assert_eq!(result.rows_read(), 3);
    }

    #[test]
    fn test_row_cursor() {
        let mut result = result(vec![int_chunk(&[10, 20])]);
        let mut chunk = result.next_chunk().unwrap().unwrap();
        assert!(chunk.get::<i32>(0).is_err());
        assert!(chunk.next_row());
        assert_eq!(chunk.get::<i64>(0).unwrap(), 10);
        assert!(chunk.next_row());
        assert_eq!(chunk.position(), Some(1));
        assert!(!chunk.next_row());
        assert_eq!(chunk.position(), None);
    }

    #[test]
    fn test_column_lookup_ignores_case() {
        let result = result(vec![]);
        assert_eq!(result.column_index("n"), Some(0));
        assert_eq!(result.column_index("m"), None);
    }
}
