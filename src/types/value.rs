use crate::types::interval::IntervalValue;
use crate::types::temporal::TimeTzValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// A single host value read from, or appended to, a vector.
/// Nested values own their children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    HugeInt(i128),
    UTinyInt(u8),
    USmallInt(u16),
    UInteger(u32),
    UBigInt(u64),
    UHugeInt(u128),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    TimeTz(TimeTzValue),
    /// Timestamp without zone, in any stored unit
    Timestamp(NaiveDateTime),
    /// Timestamp with zone, normalised to UTC
    TimestampTz(DateTime<Utc>),
    Interval(IntervalValue),
    Varchar(String),
    Blob(Vec<u8>),
    Uuid(Uuid),
    /// Enum member by name
    Enum(String),
    VarInt(BigInt),
    List(Vec<Value>),
    /// Struct fields in declaration order
    Struct(Vec<(String, Value)>),
    /// Map entries in stored order
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value's kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::TinyInt(_) => "TINYINT",
            Value::SmallInt(_) => "SMALLINT",
            Value::Integer(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::HugeInt(_) => "HUGEINT",
            Value::UTinyInt(_) => "UTINYINT",
            Value::USmallInt(_) => "USMALLINT",
            Value::UInteger(_) => "UINTEGER",
            Value::UBigInt(_) => "UBIGINT",
            Value::UHugeInt(_) => "UHUGEINT",
            Value::Float(_) => "FLOAT",
            Value::Double(_) => "DOUBLE",
            Value::Decimal(_) => "DECIMAL",
            Value::Date(_) => "DATE",
            Value::Time(_) => "TIME",
            Value::TimeTz(_) => "TIMETZ",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::TimestampTz(_) => "TIMESTAMPTZ",
            Value::Interval(_) => "INTERVAL",
            Value::Varchar(_) => "VARCHAR",
            Value::Blob(_) => "BLOB",
            Value::Uuid(_) => "UUID",
            Value::Enum(_) => "ENUM",
            Value::VarInt(_) => "VARINT",
            Value::List(_) => "LIST",
            Value::Struct(_) => "STRUCT",
            Value::Map(_) => "MAP",
        }
    }

    /// Signed view of any fixed-width integer value
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::TinyInt(v) => Some(i128::from(*v)),
            Value::SmallInt(v) => Some(i128::from(*v)),
            Value::Integer(v) => Some(i128::from(*v)),
            Value::BigInt(v) => Some(i128::from(*v)),
            Value::HugeInt(v) => Some(*v),
            Value::UTinyInt(v) => Some(i128::from(*v)),
            Value::USmallInt(v) => Some(i128::from(*v)),
            Value::UInteger(v) => Some(i128::from(*v)),
            Value::UBigInt(v) => Some(i128::from(*v)),
            Value::UHugeInt(v) => i128::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Whether the value is a fixed-width integer of either sign
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::TinyInt(_)
                | Value::SmallInt(_)
                | Value::Integer(_)
                | Value::BigInt(_)
                | Value::HugeInt(_)
                | Value::UTinyInt(_)
                | Value::USmallInt(_)
                | Value::UInteger(_)
                | Value::UBigInt(_)
                | Value::UHugeInt(_)
        )
    }

    /// Integer value as a big integer
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Value::VarInt(v) => Some(v.clone()),
            Value::UHugeInt(v) => Some(BigInt::from(*v)),
            other => other.as_i128().map(BigInt::from),
        }
    }

    pub fn list(values: Vec<Value>) -> Self {
        Value::List(values)
    }

    pub fn struct_<S: Into<String>>(fields: Vec<(S, Value)>) -> Self {
        Value::Struct(fields.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }

    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::Map(entries)
    }
}

macro_rules! impl_from_host {
    ($($host:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$host> for Value {
                fn from(value: $host) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_host!(
    bool => Boolean,
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Integer,
    i64 => BigInt,
    i128 => HugeInt,
    u8 => UTinyInt,
    u16 => USmallInt,
    u32 => UInteger,
    u64 => UBigInt,
    u128 => UHugeInt,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    NaiveDate => Date,
    NaiveTime => Time,
    TimeTzValue => TimeTz,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    IntervalValue => Interval,
    String => Varchar,
    Vec<u8> => Blob,
    Uuid => Uuid,
    BigInt => VarInt,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::TinyInt(v) => write!(f, "{}", v),
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::HugeInt(v) => write!(f, "{}", v),
            Value::UTinyInt(v) => write!(f, "{}", v),
            Value::USmallInt(v) => write!(f, "{}", v),
            Value::UInteger(v) => write!(f, "{}", v),
            Value::UBigInt(v) => write!(f, "{}", v),
            Value::UHugeInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::TimeTz(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v),
            Value::TimestampTz(v) => write!(f, "{}", v),
            Value::Interval(v) => write!(f, "{}", v),
            Value::Varchar(s) | Value::Enum(s) => write!(f, "{}", s),
            Value::Blob(bytes) => {
                for byte in bytes {
                    write!(f, "\\x{:02X}", byte)?;
                }
                Ok(())
            }
            Value::Uuid(v) => write!(f, "{}", v.hyphenated()),
            Value::VarInt(v) => write!(f, "{}", v),
            Value::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Value::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{}': {}", name, value)?;
                }
                write!(f, "}}")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}
