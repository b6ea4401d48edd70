//! Type system of the marshaling layer
//!
//! - LogicalType: what the engine stores in a vector
//! - PhysicalType: the byte layout of one row
//! - Value: host values read from or appended to vectors
//! - codecs for the engine's integer, decimal, temporal and varint encodings

pub mod decimal;
pub mod hugeint;
pub mod interval;
pub mod logical_type;
pub mod physical_type;
pub mod temporal;
pub mod value;
pub mod varint;

pub use interval::IntervalValue;
pub use logical_type::{EnumDictionary, LogicalType, TypeTag};
pub use physical_type::PhysicalType;
pub use temporal::{TimeTzValue, TimestampUnit};
pub use value::Value;
