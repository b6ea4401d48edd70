use crate::common::constants::MAX_DECIMAL_WIDTH;
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::physical_type::PhysicalType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Engine type ids as reported through the C interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum TypeTag {
    Invalid = 0,
    Boolean = 1,
    TinyInt = 2,
    SmallInt = 3,
    Integer = 4,
    BigInt = 5,
    UTinyInt = 6,
    USmallInt = 7,
    UInteger = 8,
    UBigInt = 9,
    Float = 10,
    Double = 11,
    Timestamp = 12,
    Date = 13,
    Time = 14,
    Interval = 15,
    HugeInt = 16,
    Varchar = 17,
    Blob = 18,
    Decimal = 19,
    TimestampS = 20,
    TimestampMs = 21,
    TimestampNs = 22,
    Enum = 23,
    List = 24,
    Struct = 25,
    Map = 26,
    Uuid = 27,
    Union = 28,
    Bit = 29,
    TimeTz = 30,
    TimestampTz = 31,
    UHugeInt = 32,
    Array = 33,
    Any = 34,
    VarInt = 35,
    SqlNull = 36,
}

impl TypeTag {
    /// Map a raw engine type id onto a tag
    pub fn from_raw(raw: u32) -> DuckBridgeResult<TypeTag> {
        use TypeTag::*;
        let tag = match raw {
            0 => Invalid,
            1 => Boolean,
            2 => TinyInt,
            3 => SmallInt,
            4 => Integer,
            5 => BigInt,
            6 => UTinyInt,
            7 => USmallInt,
            8 => UInteger,
            9 => UBigInt,
            10 => Float,
            11 => Double,
            12 => Timestamp,
            13 => Date,
            14 => Time,
            15 => Interval,
            16 => HugeInt,
            17 => Varchar,
            18 => Blob,
            19 => Decimal,
            20 => TimestampS,
            21 => TimestampMs,
            22 => TimestampNs,
            23 => Enum,
            24 => List,
            25 => Struct,
            26 => Map,
            27 => Uuid,
            28 => Union,
            29 => Bit,
            30 => TimeTz,
            31 => TimestampTz,
            32 => UHugeInt,
            33 => Array,
            34 => Any,
            35 => VarInt,
            36 => SqlNull,
            other => {
                return Err(DuckBridgeError::Engine(format!(
                    "Unknown engine type id {}",
                    other
                )))
            }
        };
        Ok(tag)
    }
}

/// Dictionary of an enum type, shared between all vectors of that type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumDictionary(Arc<[String]>);

impl EnumDictionary {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EnumDictionary(values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.0.iter().position(|entry| entry == value)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

/// Logical types describe what the engine stores in a vector.
/// Each maps onto exactly one physical layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    /// Boolean type (TRUE/FALSE)
    Boolean,
    /// 8-bit signed integer
    TinyInt,
    /// 16-bit signed integer
    SmallInt,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    BigInt,
    /// 128-bit signed integer
    HugeInt,
    /// 8-bit unsigned integer
    UTinyInt,
    /// 16-bit unsigned integer
    USmallInt,
    /// 32-bit unsigned integer
    UInteger,
    /// 64-bit unsigned integer
    UBigInt,
    /// 128-bit unsigned integer
    UHugeInt,
    /// 32-bit floating point
    Float,
    /// 64-bit double precision
    Double,
    /// Decimal with total digits and fractional digits
    Decimal { width: u8, scale: u8 },
    /// Days since 1970-01-01
    Date,
    /// Microseconds since midnight
    Time,
    /// Microseconds since midnight plus a zone offset, packed into 64 bits
    TimeTz,
    /// Microseconds since the epoch
    Timestamp,
    /// Seconds since the epoch
    TimestampS,
    /// Milliseconds since the epoch
    TimestampMs,
    /// Nanoseconds since the epoch
    TimestampNs,
    /// Microseconds since the epoch, UTC
    TimestampTz,
    /// Months, days and microseconds
    Interval,
    /// Variable length UTF-8 string
    Varchar,
    /// Binary large object
    Blob,
    /// UUID stored as a sign-flipped 128-bit integer
    Uuid,
    /// Enum with a dictionary of values
    Enum(EnumDictionary),
    /// Variable length list
    List(Box<LogicalType>),
    /// Fixed length list
    Array { child: Box<LogicalType>, size: usize },
    /// Struct with named fields
    Struct(Vec<(String, LogicalType)>),
    /// Map type with key and value types
    Map {
        key: Box<LogicalType>,
        value: Box<LogicalType>,
    },
    /// Arbitrary precision integer
    VarInt,
}

impl LogicalType {
    /// Create a decimal type with validation
    pub fn decimal(width: u8, scale: u8) -> DuckBridgeResult<LogicalType> {
        if width == 0 || width > MAX_DECIMAL_WIDTH {
            return Err(DuckBridgeError::InvalidArgument(format!(
                "Decimal width must be between 1 and {}, got {}",
                MAX_DECIMAL_WIDTH, width
            )));
        }
        if scale > width {
            return Err(DuckBridgeError::InvalidArgument(format!(
                "Decimal scale ({}) cannot be greater than width ({})",
                scale, width
            )));
        }
        Ok(LogicalType::Decimal { width, scale })
    }

    pub fn list(child: LogicalType) -> LogicalType {
        LogicalType::List(Box::new(child))
    }

    pub fn array(child: LogicalType, size: usize) -> LogicalType {
        LogicalType::Array {
            child: Box::new(child),
            size,
        }
    }

    pub fn map(key: LogicalType, value: LogicalType) -> LogicalType {
        LogicalType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn struct_of<S: Into<String>>(fields: Vec<(S, LogicalType)>) -> LogicalType {
        LogicalType::Struct(fields.into_iter().map(|(n, t)| (n.into(), t)).collect())
    }

    pub fn enumeration<I, S>(values: I) -> LogicalType
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LogicalType::Enum(EnumDictionary::new(values))
    }

    /// Engine type id of this type
    pub fn tag(&self) -> TypeTag {
        match self {
            LogicalType::Boolean => TypeTag::Boolean,
            LogicalType::TinyInt => TypeTag::TinyInt,
            LogicalType::SmallInt => TypeTag::SmallInt,
            LogicalType::Integer => TypeTag::Integer,
            LogicalType::BigInt => TypeTag::BigInt,
            LogicalType::HugeInt => TypeTag::HugeInt,
            LogicalType::UTinyInt => TypeTag::UTinyInt,
            LogicalType::USmallInt => TypeTag::USmallInt,
            LogicalType::UInteger => TypeTag::UInteger,
            LogicalType::UBigInt => TypeTag::UBigInt,
            LogicalType::UHugeInt => TypeTag::UHugeInt,
            LogicalType::Float => TypeTag::Float,
            LogicalType::Double => TypeTag::Double,
            LogicalType::Decimal { .. } => TypeTag::Decimal,
            LogicalType::Date => TypeTag::Date,
            LogicalType::Time => TypeTag::Time,
            LogicalType::TimeTz => TypeTag::TimeTz,
            LogicalType::Timestamp => TypeTag::Timestamp,
            LogicalType::TimestampS => TypeTag::TimestampS,
            LogicalType::TimestampMs => TypeTag::TimestampMs,
            LogicalType::TimestampNs => TypeTag::TimestampNs,
            LogicalType::TimestampTz => TypeTag::TimestampTz,
            LogicalType::Interval => TypeTag::Interval,
            LogicalType::Varchar => TypeTag::Varchar,
            LogicalType::Blob => TypeTag::Blob,
            LogicalType::Uuid => TypeTag::Uuid,
            LogicalType::Enum(_) => TypeTag::Enum,
            LogicalType::List(_) => TypeTag::List,
            LogicalType::Array { .. } => TypeTag::Array,
            LogicalType::Struct(_) => TypeTag::Struct,
            LogicalType::Map { .. } => TypeTag::Map,
            LogicalType::VarInt => TypeTag::VarInt,
        }
    }

    /// Get the physical layout backing this logical type
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            LogicalType::Boolean => PhysicalType::Bool,
            LogicalType::TinyInt => PhysicalType::Int8,
            LogicalType::SmallInt => PhysicalType::Int16,
            LogicalType::Integer | LogicalType::Date => PhysicalType::Int32,
            LogicalType::BigInt
            | LogicalType::Time
            | LogicalType::Timestamp
            | LogicalType::TimestampS
            | LogicalType::TimestampMs
            | LogicalType::TimestampNs
            | LogicalType::TimestampTz => PhysicalType::Int64,
            LogicalType::TimeTz => PhysicalType::UInt64,
            LogicalType::HugeInt | LogicalType::Uuid => PhysicalType::Int128,
            LogicalType::UTinyInt => PhysicalType::UInt8,
            LogicalType::USmallInt => PhysicalType::UInt16,
            LogicalType::UInteger => PhysicalType::UInt32,
            LogicalType::UBigInt => PhysicalType::UInt64,
            LogicalType::UHugeInt => PhysicalType::UInt128,
            LogicalType::Float => PhysicalType::Float,
            LogicalType::Double => PhysicalType::Double,
            LogicalType::Decimal { width, .. } => match width {
                0..=4 => PhysicalType::Int16,
                5..=9 => PhysicalType::Int32,
                10..=18 => PhysicalType::Int64,
                _ => PhysicalType::Int128,
            },
            LogicalType::Interval => PhysicalType::Interval,
            LogicalType::Varchar | LogicalType::Blob | LogicalType::VarInt => {
                PhysicalType::VarcharString
            }
            LogicalType::Enum(dictionary) => {
                if dictionary.len() <= u8::MAX as usize {
                    PhysicalType::UInt8
                } else if dictionary.len() <= u16::MAX as usize {
                    PhysicalType::UInt16
                } else {
                    PhysicalType::UInt32
                }
            }
            LogicalType::List(_) | LogicalType::Map { .. } => PhysicalType::List,
            LogicalType::Array { .. } => PhysicalType::Array,
            LogicalType::Struct(_) => PhysicalType::Struct,
        }
    }

    /// Check if this type is an integer of any width
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            LogicalType::TinyInt
                | LogicalType::SmallInt
                | LogicalType::Integer
                | LogicalType::BigInt
                | LogicalType::HugeInt
                | LogicalType::UTinyInt
                | LogicalType::USmallInt
                | LogicalType::UInteger
                | LogicalType::UBigInt
                | LogicalType::UHugeInt
        )
    }

    /// Check if this type is floating point
    pub fn is_floating_point(&self) -> bool {
        matches!(self, LogicalType::Float | LogicalType::Double)
    }

    /// Check if this type is temporal (date/time related)
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            LogicalType::Date
                | LogicalType::Time
                | LogicalType::TimeTz
                | LogicalType::Timestamp
                | LogicalType::TimestampS
                | LogicalType::TimestampMs
                | LogicalType::TimestampNs
                | LogicalType::TimestampTz
        )
    }

    /// Check if this type is a nested type (contains other types)
    pub fn is_nested(&self) -> bool {
        matches!(
            self,
            LogicalType::List(_)
                | LogicalType::Array { .. }
                | LogicalType::Struct(_)
                | LogicalType::Map { .. }
        )
    }

    /// Struct layout of a map's child vector
    pub fn map_entry_type(key: &LogicalType, value: &LogicalType) -> LogicalType {
        LogicalType::Struct(vec![
            ("key".to_string(), key.clone()),
            ("value".to_string(), value.clone()),
        ])
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Boolean => write!(f, "BOOLEAN"),
            LogicalType::TinyInt => write!(f, "TINYINT"),
            LogicalType::SmallInt => write!(f, "SMALLINT"),
            LogicalType::Integer => write!(f, "INTEGER"),
            LogicalType::BigInt => write!(f, "BIGINT"),
            LogicalType::HugeInt => write!(f, "HUGEINT"),
            LogicalType::UTinyInt => write!(f, "UTINYINT"),
            LogicalType::USmallInt => write!(f, "USMALLINT"),
            LogicalType::UInteger => write!(f, "UINTEGER"),
            LogicalType::UBigInt => write!(f, "UBIGINT"),
            LogicalType::UHugeInt => write!(f, "UHUGEINT"),
            LogicalType::Float => write!(f, "FLOAT"),
            LogicalType::Double => write!(f, "DOUBLE"),
            LogicalType::Decimal { width, scale } => write!(f, "DECIMAL({},{})", width, scale),
            LogicalType::Date => write!(f, "DATE"),
            LogicalType::Time => write!(f, "TIME"),
            LogicalType::TimeTz => write!(f, "TIME WITH TIME ZONE"),
            LogicalType::Timestamp => write!(f, "TIMESTAMP"),
            LogicalType::TimestampS => write!(f, "TIMESTAMP_S"),
            LogicalType::TimestampMs => write!(f, "TIMESTAMP_MS"),
            LogicalType::TimestampNs => write!(f, "TIMESTAMP_NS"),
            LogicalType::TimestampTz => write!(f, "TIMESTAMP WITH TIME ZONE"),
            LogicalType::Interval => write!(f, "INTERVAL"),
            LogicalType::Varchar => write!(f, "VARCHAR"),
            LogicalType::Blob => write!(f, "BLOB"),
            LogicalType::Uuid => write!(f, "UUID"),
            LogicalType::Enum(dictionary) => {
                write!(f, "ENUM(")?;
                for (i, value) in dictionary.values().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{}'", value)?;
                }
                write!(f, ")")
            }
            LogicalType::List(child) => write!(f, "{}[]", child),
            LogicalType::Array { child, size } => write!(f, "{}[{}]", child, size),
            LogicalType::Struct(fields) => {
                write!(f, "STRUCT(")?;
                for (i, (name, field_type)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", name, field_type)?;
                }
                write!(f, ")")
            }
            LogicalType::Map { key, value } => write!(f, "MAP({}, {})", key, value),
            LogicalType::VarInt => write!(f, "VARINT"),
        }
    }
}
