use super::vector_writer::VectorWriter;
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::config::DriverConfig;
use crate::native::local::LocalDataChunk;
use crate::native::{ChunkSink, DataChunkHandle};
use crate::types::{LogicalType, Value};

/// Row-by-row bulk loader.
///
/// Rows fill a data chunk of `DriverConfig::vector_capacity` rows. A full
/// chunk is handed to the sink right away; `flush` and `close` hand over a
/// partial one.
pub struct Appender<S: ChunkSink> {
    column_types: Vec<LogicalType>,
    capacity: usize,
    chunk: LocalDataChunk,
    sink: S,
    rows_appended: usize,
    closed: bool,
}

impl<S: ChunkSink> Appender<S> {
    pub fn new(column_types: Vec<LogicalType>, sink: S, config: &DriverConfig) -> DuckBridgeResult<Self> {
        config.validate()?;
        if column_types.is_empty() {
            return Err(DuckBridgeError::InvalidArgument(
                "Appender needs at least one column".to_string(),
            ));
        }
        tracing::debug!(
            "creating appender for {} columns, {} rows per chunk",
            column_types.len(),
            config.vector_capacity
        );
        Ok(Self {
            chunk: LocalDataChunk::new(&column_types, config.vector_capacity),
            capacity: config.vector_capacity,
            column_types,
            sink,
            rows_appended: 0,
            closed: false,
        })
    }

    pub fn column_types(&self) -> &[LogicalType] {
        &self.column_types
    }

    pub fn column_count(&self) -> usize {
        self.column_types.len()
    }

    /// Rows ended successfully, flushed or not
    pub fn rows_appended(&self) -> usize {
        self.rows_appended
    }

    /// Rows waiting in the current chunk
    pub fn pending_rows(&self) -> usize {
        self.chunk.row_count()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Start a row at the next free slot of the current chunk
    pub fn create_row(&mut self) -> DuckBridgeResult<AppenderRow<'_, S>> {
        self.ensure_open()?;
        if self.chunk.is_full() {
            self.flush()?;
        }
        let row = self.chunk.row_count();
        Ok(AppenderRow {
            appender: self,
            row,
            column: 0,
        })
    }

    /// Append a whole row of values
    pub fn append_row(&mut self, values: &[Value]) -> DuckBridgeResult<()> {
        let mut row = self.create_row()?;
        for value in values {
            row.append_value(value)?;
        }
        row.end_row()
    }

    /// Hand the pending rows to the sink
    pub fn flush(&mut self) -> DuckBridgeResult<()> {
        self.ensure_open()?;
        if self.chunk.row_count() == 0 {
            return Ok(());
        }
        let full = std::mem::replace(
            &mut self.chunk,
            LocalDataChunk::new(&self.column_types, self.capacity),
        );
        tracing::trace!("flushing chunk of {} rows", full.row_count());
        self.sink.append_chunk(full)
    }

    /// Flush and refuse any further rows
    pub fn close(&mut self) -> DuckBridgeResult<()> {
        if self.closed {
            return Ok(());
        }
        self.flush()?;
        self.closed = true;
        tracing::debug!("appender closed after {} rows", self.rows_appended);
        Ok(())
    }

    fn ensure_open(&self) -> DuckBridgeResult<()> {
        if self.closed {
            return Err(DuckBridgeError::InvalidArgument(
                "Appender is closed".to_string(),
            ));
        }
        Ok(())
    }

    fn end_row(&mut self, row: usize) -> DuckBridgeResult<()> {
        self.chunk.set_row_count(row + 1)?;
        self.rows_appended += 1;
        if self.chunk.is_full() {
            self.flush()?;
        }
        Ok(())
    }
}

impl<S: ChunkSink> Drop for Appender<S> {
    fn drop(&mut self) {
        if !self.closed && self.chunk.row_count() > 0 {
            tracing::warn!(
                "appender dropped with {} unflushed rows",
                self.chunk.row_count()
            );
        }
    }
}

impl<S: ChunkSink> std::fmt::Debug for Appender<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Appender")
            .field("column_types", &self.column_types)
            .field("capacity", &self.capacity)
            .field("pending_rows", &self.chunk.row_count())
            .field("rows_appended", &self.rows_appended)
            .field("closed", &self.closed)
            .finish()
    }
}

/// One row being appended. Columns are filled left to right; a failed append
/// leaves the column index where it was.
#[derive(Debug)]
pub struct AppenderRow<'a, S: ChunkSink> {
    appender: &'a mut Appender<S>,
    row: usize,
    column: usize,
}

impl<S: ChunkSink> AppenderRow<'_, S> {
    /// Index of the next column to fill
    pub fn column_index(&self) -> usize {
        self.column
    }

    fn writer(&mut self) -> DuckBridgeResult<VectorWriter<'_>> {
        let count = self.appender.column_count();
        if self.column >= count {
            return Err(DuckBridgeError::RowProtocol(format!(
                "Row already holds all {} columns",
                count
            )));
        }
        let vector = self.appender.chunk.vector_mut(self.column)?;
        Ok(VectorWriter::new(vector))
    }

    fn column_name(&self) -> String {
        format!("column {}", self.column)
    }

    pub fn append_value(&mut self, value: &Value) -> DuckBridgeResult<&mut Self> {
        let row = self.row;
        let target = self.column_name();
        self.writer()?
            .append_value(row, value)
            .map_err(|e| e.within(&target))?;
        self.column += 1;
        Ok(self)
    }

    /// Append any host value convertible into a `Value`
    pub fn append<T: Into<Value>>(&mut self, value: T) -> DuckBridgeResult<&mut Self> {
        self.append_value(&value.into())
    }

    pub fn append_null(&mut self) -> DuckBridgeResult<&mut Self> {
        let row = self.row;
        self.writer()?.append_null(row)?;
        self.column += 1;
        Ok(self)
    }

    /// Append the column default; columns carry no default here, so null
    pub fn append_default(&mut self) -> DuckBridgeResult<&mut Self> {
        self.append_null()
    }

    /// Commit the row. Every column must have been filled.
    pub fn end_row(self) -> DuckBridgeResult<()> {
        let count = self.appender.column_count();
        if self.column != count {
            return Err(DuckBridgeError::RowProtocol(format!(
                "Row ended after {} of {} columns",
                self.column, count
            )));
        }
        self.appender.end_row(self.row)
    }
}
