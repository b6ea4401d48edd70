use super::Decoder;
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::{PhysicalType, Value};
use crate::vector::ForeignVector;
use num_traits::FromPrimitive;

/// Host numeric type a vector can be read into
pub trait HostNumber: FromPrimitive + Copy + 'static {
    const IS_FLOAT: bool;
    const IS_UNSIGNED: bool;
}

macro_rules! impl_host_number {
    ($($ty:ty => $float:expr, $unsigned:expr);* $(;)?) => {
        $(
            impl HostNumber for $ty {
                const IS_FLOAT: bool = $float;
                const IS_UNSIGNED: bool = $unsigned;
            }
        )*
    };
}

impl_host_number!(
    i8 => false, false;
    i16 => false, false;
    i32 => false, false;
    i64 => false, false;
    i128 => false, false;
    u8 => false, true;
    u16 => false, true;
    u32 => false, true;
    u64 => false, true;
    u128 => false, true;
    f32 => true, false;
    f64 => true, false;
);

/// Checked conversion failure of `source` into `T`
pub(crate) fn out_of_range<T>(source: impl std::fmt::Display) -> DuckBridgeError {
    crate::overflow_err!(
        "Value {} is out of range for {}",
        source,
        std::any::type_name::<T>()
    )
}

/// Fixed-width integers and floats up to 64 bits
#[derive(Debug)]
pub struct NumericReader<'a> {
    vector: ForeignVector<'a>,
    physical: PhysicalType,
}

impl<'a> NumericReader<'a> {
    pub fn new(vector: ForeignVector<'a>) -> Self {
        let physical = vector.logical_type().physical_type();
        Self { vector, physical }
    }

    /// Read a row and convert it to `T` without wrapping. Integers narrow with
    /// an overflow check; floats only convert into floats.
    pub fn read_number<T: HostNumber>(&self, offset: usize) -> DuckBridgeResult<T> {
        let data = self.vector.data();
        match self.physical {
            PhysicalType::Int8 => {
                let v = data.read::<i8>(offset)?;
                T::from_i8(v).ok_or_else(|| out_of_range::<T>(v))
            }
            PhysicalType::Int16 => {
                let v = data.read::<i16>(offset)?;
                T::from_i16(v).ok_or_else(|| out_of_range::<T>(v))
            }
            PhysicalType::Int32 => {
                let v = data.read::<i32>(offset)?;
                T::from_i32(v).ok_or_else(|| out_of_range::<T>(v))
            }
            PhysicalType::Int64 => {
                let v = data.read::<i64>(offset)?;
                T::from_i64(v).ok_or_else(|| out_of_range::<T>(v))
            }
            PhysicalType::UInt8 => {
                let v = data.read::<u8>(offset)?;
                T::from_u8(v).ok_or_else(|| out_of_range::<T>(v))
            }
            PhysicalType::UInt16 => {
                let v = data.read::<u16>(offset)?;
                T::from_u16(v).ok_or_else(|| out_of_range::<T>(v))
            }
            PhysicalType::UInt32 => {
                let v = data.read::<u32>(offset)?;
                T::from_u32(v).ok_or_else(|| out_of_range::<T>(v))
            }
            PhysicalType::UInt64 => {
                let v = data.read::<u64>(offset)?;
                T::from_u64(v).ok_or_else(|| out_of_range::<T>(v))
            }
            PhysicalType::Float | PhysicalType::Double => {
                if !T::IS_FLOAT {
                    return Err(crate::type_mismatch_err!(
                        "Cannot read {} as {}",
                        self.vector.logical_type(),
                        std::any::type_name::<T>()
                    ));
                }
                let v = if self.physical == PhysicalType::Float {
                    f64::from(data.read::<f32>(offset)?)
                } else {
                    data.read::<f64>(offset)?
                };
                T::from_f64(v).ok_or_else(|| out_of_range::<T>(v))
            }
            other => Err(DuckBridgeError::Internal(format!(
                "Numeric reader over {} layout",
                other
            ))),
        }
    }
}

impl<'a> Decoder<'a> for NumericReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        let data = self.vector.data();
        Ok(match self.physical {
            PhysicalType::Int8 => Value::TinyInt(data.read(offset)?),
            PhysicalType::Int16 => Value::SmallInt(data.read(offset)?),
            PhysicalType::Int32 => Value::Integer(data.read(offset)?),
            PhysicalType::Int64 => Value::BigInt(data.read(offset)?),
            PhysicalType::UInt8 => Value::UTinyInt(data.read(offset)?),
            PhysicalType::UInt16 => Value::USmallInt(data.read(offset)?),
            PhysicalType::UInt32 => Value::UInteger(data.read(offset)?),
            PhysicalType::UInt64 => Value::UBigInt(data.read(offset)?),
            PhysicalType::Float => Value::Float(data.read(offset)?),
            PhysicalType::Double => Value::Double(data.read(offset)?),
            other => {
                return Err(DuckBridgeError::Internal(format!(
                    "Numeric reader over {} layout",
                    other
                )))
            }
        })
    }
}
