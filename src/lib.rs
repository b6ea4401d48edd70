//! duckbridge - vector marshaling for an embedded analytical engine
//!
//! Reads the engine's columnar data chunks into host values and writes host
//! values back into chunks, matching the engine's in-memory layout exactly:
//! validity bitmasks, the 16-byte string header, list entries, 128-bit
//! integers, scaled decimals, temporal encodings and varint blobs.
//!
//! The engine itself sits behind the traits in [`native`]; [`native::local`]
//! provides Rust-owned buffers in the same layout.

pub mod common;
pub mod config;
pub mod native;
pub mod reader;
pub mod result;
pub mod types;
pub mod vector;
pub mod writer;

// Re-export common types for convenience
pub use common::{DuckBridgeError, DuckBridgeResult};
pub use config::DriverConfig;

// Re-export type system for convenience
pub use types::{IntervalValue, LogicalType, PhysicalType, TimeTzValue, TimestampUnit, Value};

// Re-export the read and write surfaces
pub use reader::{
    EnumValue, FromStructRow, FromVector, HostEnum, ReaderFactory, Record, StructRow, TypeCache,
    VectorReader,
};
pub use result::{ChunkSource, QueryResult, ResultChunk, ResultRow};
pub use vector::{ForeignBuffer, ForeignVector, ValidityMask};
pub use writer::{Appender, AppenderRow, VectorWriter};
