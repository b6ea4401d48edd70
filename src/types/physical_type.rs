use crate::common::constants::{LIST_ENTRY_SIZE, STRING_HEADER_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical types describe the byte layout of one row in a vector's data buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalType {
    /// One byte, zero or non-zero
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    /// Two 64-bit words, low then high
    Int128,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    Float,
    Double,
    /// i32 months, i32 days, i64 microseconds
    Interval,
    /// 16-byte string header, inline payload or prefix plus heap pointer
    VarcharString,
    /// 16-byte (offset, length) entry into the child vector
    List,
    /// No own data buffer, child holds `size` rows per parent row
    Array,
    /// No own data buffer, one child vector per field
    Struct,
}

impl PhysicalType {
    /// Size of one row in the data buffer (zero for child-only layouts)
    pub fn get_size(&self) -> usize {
        match self {
            PhysicalType::Bool | PhysicalType::Int8 | PhysicalType::UInt8 => 1,
            PhysicalType::Int16 | PhysicalType::UInt16 => 2,
            PhysicalType::Int32 | PhysicalType::UInt32 | PhysicalType::Float => 4,
            PhysicalType::Int64 | PhysicalType::UInt64 | PhysicalType::Double => 8,
            PhysicalType::Int128 | PhysicalType::UInt128 | PhysicalType::Interval => 16,
            PhysicalType::VarcharString => STRING_HEADER_SIZE,
            PhysicalType::List => LIST_ENTRY_SIZE,
            PhysicalType::Array | PhysicalType::Struct => 0,
        }
    }

    /// Check if this type is an integer of any width
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            PhysicalType::Int8
                | PhysicalType::Int16
                | PhysicalType::Int32
                | PhysicalType::Int64
                | PhysicalType::Int128
                | PhysicalType::UInt8
                | PhysicalType::UInt16
                | PhysicalType::UInt32
                | PhysicalType::UInt64
                | PhysicalType::UInt128
        )
    }

    /// Check if rows of this type are written directly at `base + offset * size`
    pub fn is_fixed_width(&self) -> bool {
        !matches!(
            self,
            PhysicalType::VarcharString
                | PhysicalType::List
                | PhysicalType::Array
                | PhysicalType::Struct
        )
    }

    /// Get the alignment requirement for this type
    pub fn get_alignment(&self) -> usize {
        match self {
            PhysicalType::Int128 | PhysicalType::UInt128 => 16,
            PhysicalType::Array | PhysicalType::Struct => 1,
            PhysicalType::Interval | PhysicalType::VarcharString | PhysicalType::List => 8,
            other => other.get_size(),
        }
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhysicalType::Bool => "BOOL",
            PhysicalType::Int8 => "INT8",
            PhysicalType::Int16 => "INT16",
            PhysicalType::Int32 => "INT32",
            PhysicalType::Int64 => "INT64",
            PhysicalType::Int128 => "INT128",
            PhysicalType::UInt8 => "UINT8",
            PhysicalType::UInt16 => "UINT16",
            PhysicalType::UInt32 => "UINT32",
            PhysicalType::UInt64 => "UINT64",
            PhysicalType::UInt128 => "UINT128",
            PhysicalType::Float => "FLOAT",
            PhysicalType::Double => "DOUBLE",
            PhysicalType::Interval => "INTERVAL",
            PhysicalType::VarcharString => "VARCHAR",
            PhysicalType::List => "LIST",
            PhysicalType::Array => "ARRAY",
            PhysicalType::Struct => "STRUCT",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_type_sizes() {
        assert_eq!(PhysicalType::Int8.get_size(), 1);
        assert_eq!(PhysicalType::Int32.get_size(), 4);
        assert_eq!(PhysicalType::Double.get_size(), 8);
        assert_eq!(PhysicalType::VarcharString.get_size(), 16);
        assert_eq!(PhysicalType::List.get_size(), 16);
        assert_eq!(PhysicalType::Struct.get_size(), 0);
    }

    #[test]
    fn test_fixed_width() {
        assert!(PhysicalType::Int32.is_fixed_width());
        assert!(PhysicalType::Interval.is_fixed_width());
        assert!(!PhysicalType::VarcharString.is_fixed_width());
        assert!(!PhysicalType::List.is_fixed_width());
    }

    #[test]
    fn test_alignment() {
        assert_eq!(PhysicalType::Int8.get_alignment(), 1);
        assert_eq!(PhysicalType::Int16.get_alignment(), 2);
        assert_eq!(PhysicalType::Int32.get_alignment(), 4);
        assert_eq!(PhysicalType::Int64.get_alignment(), 8);
        assert_eq!(PhysicalType::Int128.get_alignment(), 16);
    }
}
