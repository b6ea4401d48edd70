//! Readers decoding engine vectors into host values.
//!
//! The factory turns a `ForeignVector` into a tree of `VectorReader`s, one
//! node per vector. Values come out either as the natural `Value` of a row or
//! through `FromVector`, which converts straight into a requested host type.

pub mod big_integer;
pub mod boolean;
pub mod cache;
pub mod decimal;
pub mod enumeration;
pub mod factory;
pub mod from_vector;
pub mod interval;
pub mod list;
pub mod map;
pub mod numeric;
pub mod string;
pub mod structure;
pub mod temporal;
pub mod uuid;

pub use big_integer::{BigIntegerReader, VarIntReader};
pub use boolean::BooleanReader;
pub use cache::TypeCache;
pub use decimal::DecimalReader;
pub use enumeration::{EnumReader, EnumValue, HostEnum};
pub use factory::ReaderFactory;
pub use from_vector::FromVector;
pub use interval::IntervalReader;
pub use list::ListReader;
pub use map::MapReader;
pub use numeric::{HostNumber, NumericReader};
pub use string::StringReader;
pub use structure::{FromStructRow, Record, StructBinding, StructReader, StructRow};
pub use temporal::TemporalReader;
pub use uuid::UuidReader;

use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::{LogicalType, Value};
use crate::vector::ForeignVector;

/// Common surface of every physical decoder
pub trait Decoder<'a> {
    fn vector(&self) -> &ForeignVector<'a>;

    fn is_valid(&self, offset: usize) -> bool {
        self.vector().is_valid(offset)
    }

    /// Natural host value of a valid row
    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value>;
}

/// Reader for one vector, selected by its logical type
#[derive(Debug)]
pub enum VectorReader<'a> {
    Boolean(BooleanReader<'a>),
    Numeric(NumericReader<'a>),
    BigInteger(BigIntegerReader<'a>),
    VarInt(VarIntReader<'a>),
    Decimal(DecimalReader<'a>),
    Temporal(TemporalReader<'a>),
    Interval(IntervalReader<'a>),
    String(StringReader<'a>),
    Uuid(UuidReader<'a>),
    Enum(EnumReader<'a>),
    List(ListReader<'a>),
    Struct(StructReader<'a>),
    Map(MapReader<'a>),
}

impl<'a> VectorReader<'a> {
    fn decoder(&self) -> &dyn Decoder<'a> {
        match self {
            VectorReader::Boolean(r) => r,
            VectorReader::Numeric(r) => r,
            VectorReader::BigInteger(r) => r,
            VectorReader::VarInt(r) => r,
            VectorReader::Decimal(r) => r,
            VectorReader::Temporal(r) => r,
            VectorReader::Interval(r) => r,
            VectorReader::String(r) => r,
            VectorReader::Uuid(r) => r,
            VectorReader::Enum(r) => r,
            VectorReader::List(r) => r,
            VectorReader::Struct(r) => r,
            VectorReader::Map(r) => r,
        }
    }

    pub fn vector(&self) -> &ForeignVector<'a> {
        self.decoder().vector()
    }

    pub fn logical_type(&self) -> &LogicalType {
        self.vector().logical_type()
    }

    /// Rows readable through this reader
    pub fn len(&self) -> usize {
        self.vector().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_valid(&self, offset: usize) -> bool {
        self.decoder().is_valid(offset)
    }

    /// Natural value of a row, `Value::Null` when the row is null
    pub fn get_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        self.check_row(offset)?;
        if !self.is_valid(offset) {
            return Ok(Value::Null);
        }
        self.decoder().read_value(offset)
    }

    /// Read a row into a host type
    pub fn get<T: FromVector>(&self, offset: usize) -> DuckBridgeResult<T> {
        self.check_row(offset)?;
        read_nested(self, offset, || format!("row {}", offset))
    }

    fn check_row(&self, offset: usize) -> DuckBridgeResult<()> {
        if offset >= self.len() {
            return Err(DuckBridgeError::OutOfBounds(format!(
                "Row {} outside a {} vector of {} rows",
                offset,
                self.logical_type(),
                self.len()
            )));
        }
        Ok(())
    }
}

/// Read a row of a nested vector. Nulls go through `T::from_null`, and any
/// null violation below is reported relative to `describe()`.
pub(crate) fn read_nested<T, F>(
    reader: &VectorReader<'_>,
    offset: usize,
    describe: F,
) -> DuckBridgeResult<T>
where
    T: FromVector,
    F: FnOnce() -> String,
{
    if !reader.is_valid(offset) {
        return T::from_null().ok_or_else(|| DuckBridgeError::null_violation(describe()));
    }
    T::from_valid(reader, offset).map_err(|e| match e {
        DuckBridgeError::NullViolation { .. } => e.within(&describe()),
        other => other,
    })
}

/// Type mismatch between a reader and the requested host type
pub(crate) fn mismatch<T>(reader: &VectorReader<'_>) -> DuckBridgeError {
    crate::type_mismatch_err!(
        "Cannot read {} as {}",
        reader.logical_type(),
        std::any::type_name::<T>()
    )
}
