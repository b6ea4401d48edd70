//! Constants fixed by the engine's in-memory layout

/// Default number of rows per data chunk
pub const STANDARD_VECTOR_SIZE: usize = 2048;

/// Rows covered by one validity word
pub const VALIDITY_WORD_BITS: usize = 64;

/// Size of the string header (length + inline payload or prefix + pointer)
pub const STRING_HEADER_SIZE: usize = 16;

/// Longest payload stored inline in the string header
pub const STRING_INLINE_LENGTH: usize = 12;

/// Bytes of the payload cached in front of the heap pointer
pub const STRING_PREFIX_LENGTH: usize = 4;

/// Size of a list entry (u64 offset + u64 length)
pub const LIST_ENTRY_SIZE: usize = 16;

/// Size of the varint header (sign flag + byte length)
pub const VARINT_HEADER_SIZE: usize = 3;

/// Widest decimal the engine supports
pub const MAX_DECIMAL_WIDTH: u8 = 38;

/// Largest scale a host `Decimal` can carry
pub const MAX_HOST_DECIMAL_SCALE: u32 = 28;

/// Largest time zone offset in seconds (15:59:59)
pub const MAX_TZ_OFFSET_SECONDS: i32 = 16 * 60 * 60 - 1;

/// Microseconds in one day
pub const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Microseconds in one second
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Nanoseconds in one second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Positive infinity sentinel for dates
pub const DATE_INFINITY: i32 = i32::MAX;

/// Negative infinity sentinel for dates
pub const DATE_NEGATIVE_INFINITY: i32 = -i32::MAX;

/// Positive infinity sentinel for timestamps
pub const TIMESTAMP_INFINITY: i64 = i64::MAX;

/// Negative infinity sentinel for timestamps
pub const TIMESTAMP_NEGATIVE_INFINITY: i64 = -i64::MAX;
