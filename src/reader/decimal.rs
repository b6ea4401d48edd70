use super::Decoder;
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::decimal::{decimal_from_i128, decimal_from_i64, f64_from_scaled, format_scaled};
use crate::types::{LogicalType, PhysicalType, Value};
use crate::vector::ForeignVector;
use rust_decimal::Decimal;

/// DECIMAL(width, scale) over an i16, i32, i64 or i128 backing
#[derive(Debug)]
pub struct DecimalReader<'a> {
    vector: ForeignVector<'a>,
    width: u8,
    scale: u8,
    physical: PhysicalType,
}

impl<'a> DecimalReader<'a> {
    pub fn new(vector: ForeignVector<'a>) -> DuckBridgeResult<Self> {
        let (width, scale) = match vector.logical_type() {
            LogicalType::Decimal { width, scale } => (*width, *scale),
            other => {
                return Err(DuckBridgeError::Internal(format!(
                    "Decimal reader over {}",
                    other
                )))
            }
        };
        let physical = vector.logical_type().physical_type();
        Ok(Self {
            vector,
            width,
            scale,
            physical,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Backing integer of a row, widened to 128 bits
    pub fn read_scaled(&self, offset: usize) -> DuckBridgeResult<i128> {
        let data = self.vector.data();
        Ok(match self.physical {
            PhysicalType::Int16 => i128::from(data.read::<i16>(offset)?),
            PhysicalType::Int32 => i128::from(data.read::<i32>(offset)?),
            PhysicalType::Int64 => i128::from(data.read::<i64>(offset)?),
            _ => data.read::<i128>(offset)?,
        })
    }

    pub fn read_decimal(&self, offset: usize) -> DuckBridgeResult<Decimal> {
        let data = self.vector.data();
        match self.physical {
            PhysicalType::Int16 => decimal_from_i64(i64::from(data.read::<i16>(offset)?), self.scale),
            PhysicalType::Int32 => decimal_from_i64(i64::from(data.read::<i32>(offset)?), self.scale),
            PhysicalType::Int64 => decimal_from_i64(data.read::<i64>(offset)?, self.scale),
            _ => decimal_from_i128(data.read::<i128>(offset)?, self.scale),
        }
    }

    pub fn read_f64(&self, offset: usize) -> DuckBridgeResult<f64> {
        Ok(f64_from_scaled(self.read_scaled(offset)?, self.scale))
    }

    /// Exact text, independent of the host decimal's precision
    pub fn read_string(&self, offset: usize) -> DuckBridgeResult<String> {
        Ok(format_scaled(self.read_scaled(offset)?, self.scale))
    }
}

impl<'a> Decoder<'a> for DecimalReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        Ok(Value::Decimal(self.read_decimal(offset)?))
    }
}
