//! Borrowed views over engine-owned vector memory.
//!
//! All raw pointer handling of the reader side lives in this module. Once a
//! `ForeignBuffer` exists every access through it is bounds checked.

use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::LogicalType;
use crate::vector::validity::ValidityMask;
use byteorder::{ByteOrder, NativeEndian};

/// Primitive that occupies a fixed number of bytes in a data buffer
pub trait FixedWidth: Copy {
    const SIZE: usize;

    fn decode(bytes: &[u8]) -> Self;

    fn encode(self, out: &mut [u8]);
}

impl FixedWidth for u8 {
    const SIZE: usize = 1;

    fn decode(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn encode(self, out: &mut [u8]) {
        out[0] = self;
    }
}

impl FixedWidth for i8 {
    const SIZE: usize = 1;

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    fn encode(self, out: &mut [u8]) {
        out[0] = self as u8;
    }
}

macro_rules! impl_fixed_width {
    ($($ty:ty => $read:ident, $write:ident);* $(;)?) => {
        $(
            impl FixedWidth for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn decode(bytes: &[u8]) -> Self {
                    NativeEndian::$read(bytes)
                }

                fn encode(self, out: &mut [u8]) {
                    NativeEndian::$write(out, self)
                }
            }
        )*
    };
}

impl_fixed_width!(
    i16 => read_i16, write_i16;
    i32 => read_i32, write_i32;
    i64 => read_i64, write_i64;
    i128 => read_i128, write_i128;
    u16 => read_u16, write_u16;
    u32 => read_u32, write_u32;
    u64 => read_u64, write_u64;
    u128 => read_u128, write_u128;
    f32 => read_f32, write_f32;
    f64 => read_f64, write_f64;
);

/// A data buffer of `rows` fixed-stride elements
#[derive(Debug, Clone, Copy)]
pub struct ForeignBuffer<'a> {
    bytes: &'a [u8],
    stride: usize,
}

impl<'a> ForeignBuffer<'a> {
    /// Buffer for layouts without own data (struct, array)
    pub const fn empty() -> Self {
        Self {
            bytes: &[],
            stride: 0,
        }
    }

    /// Wrap memory already owned by the caller.
    ///
    /// # Safety
    /// Every heap pointer stored in string headers of `bytes` must be valid
    /// for reads of its declared length for `'a`. Buffers that are never read
    /// as strings carry no such pointers.
    pub unsafe fn from_slice(bytes: &'a [u8], stride: usize) -> Self {
        Self { bytes, stride }
    }

    /// Wrap a data pointer handed out by the engine.
    ///
    /// # Safety
    /// `ptr` must be valid for reads of `rows * stride` bytes for `'a`, and
    /// every heap pointer stored in string headers of this buffer must stay
    /// valid for `'a` as well.
    pub unsafe fn from_raw(ptr: *const u8, rows: usize, stride: usize) -> DuckBridgeResult<Self> {
        if ptr.is_null() {
            if rows == 0 || stride == 0 {
                return Ok(Self::empty());
            }
            return Err(DuckBridgeError::Engine(
                "Vector data pointer is null".to_string(),
            ));
        }
        let len = rows.checked_mul(stride).ok_or_else(|| {
            DuckBridgeError::OutOfBounds(format!("{} rows of {} bytes", rows, stride))
        })?;
        Ok(Self {
            bytes: std::slice::from_raw_parts(ptr, len),
            stride,
        })
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of whole elements in the buffer
    pub fn rows(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.bytes.len() / self.stride
        }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Bytes of the element at `index`
    #[inline]
    pub fn element(&self, index: usize) -> DuckBridgeResult<&'a [u8]> {
        let start = index.checked_mul(self.stride);
        start
            .and_then(|start| self.bytes.get(start..start + self.stride))
            .ok_or_else(|| {
                DuckBridgeError::OutOfBounds(format!(
                    "Element {} outside a buffer of {} rows",
                    index,
                    self.rows()
                ))
            })
    }

    /// Decode a primitive at the start of the element at `index`
    #[inline]
    pub fn read<T: FixedWidth>(&self, index: usize) -> DuckBridgeResult<T> {
        let element = self.element(index)?;
        if element.len() < T::SIZE {
            return Err(DuckBridgeError::Internal(format!(
                "Element of {} bytes read as {}",
                element.len(),
                std::any::type_name::<T>()
            )));
        }
        Ok(T::decode(&element[..T::SIZE]))
    }

    /// Follow a heap pointer stored inside this buffer.
    pub(crate) fn heap_bytes(&self, ptr: u64, len: usize) -> DuckBridgeResult<&'a [u8]> {
        if len == 0 {
            return Ok(&[]);
        }
        if ptr == 0 {
            return Err(DuckBridgeError::InvalidValue(format!(
                "String of {} bytes has a null payload pointer",
                len
            )));
        }
        // SAFETY: heap pointers inside the buffer are valid for 'a, as
        // required by the constructors.
        Ok(unsafe { std::slice::from_raw_parts(ptr as usize as *const u8, len) })
    }
}

/// One column (or nested child) of a data chunk: data, validity, type and
/// children, all borrowed from the chunk for `'a`
#[derive(Debug, Clone)]
pub struct ForeignVector<'a> {
    logical_type: LogicalType,
    data: ForeignBuffer<'a>,
    validity: ValidityMask<'a>,
    children: Vec<ForeignVector<'a>>,
    len: usize,
}

impl<'a> ForeignVector<'a> {
    pub fn new(
        logical_type: LogicalType,
        data: ForeignBuffer<'a>,
        validity: ValidityMask<'a>,
        children: Vec<ForeignVector<'a>>,
        len: usize,
    ) -> Self {
        Self {
            logical_type,
            data,
            validity,
            children,
            len,
        }
    }

    pub fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }

    pub fn data(&self) -> &ForeignBuffer<'a> {
        &self.data
    }

    pub fn validity(&self) -> &ValidityMask<'a> {
        &self.validity
    }

    /// Logical row count (list size for a list child)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_valid(&self, offset: usize) -> bool {
        self.validity.is_valid(offset)
    }

    pub fn children(&self) -> &[ForeignVector<'a>] {
        &self.children
    }

    pub fn child(&self, index: usize) -> DuckBridgeResult<&ForeignVector<'a>> {
        self.children.get(index).ok_or_else(|| {
            DuckBridgeError::OutOfBounds(format!(
                "{} vector has no child {}",
                self.logical_type, index
            ))
        })
    }

    /// Move the children out, leaving the vector childless
    pub fn take_children(&mut self) -> Vec<ForeignVector<'a>> {
        std::mem::take(&mut self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_reads() {
        let mut bytes = vec![0u8; 16];
        (-7i32).encode(&mut bytes[0..4]);
        42i32.encode(&mut bytes[4..8]);
        u64::MAX.encode(&mut bytes[8..16]);
        let ints = unsafe { ForeignBuffer::from_slice(&bytes[..8], 4) };
        assert_eq!(ints.rows(), 2);
        assert_eq!(ints.read::<i32>(0).unwrap(), -7);
        assert_eq!(ints.read::<i32>(1).unwrap(), 42);
        assert!(matches!(
            ints.read::<i32>(2),
            Err(DuckBridgeError::OutOfBounds(_))
        ));
        let wide = unsafe { ForeignBuffer::from_slice(&bytes, 8) };
        assert_eq!(wide.read::<u64>(1).unwrap(), u64::MAX);
    }

    #[test]
    fn test_null_raw_pointer() {
        let empty = unsafe { ForeignBuffer::from_raw(std::ptr::null(), 0, 4) }.unwrap();
        assert_eq!(empty.rows(), 0);
        assert!(unsafe { ForeignBuffer::from_raw(std::ptr::null(), 3, 4) }.is_err());
    }

    #[test]
    fn test_heap_bytes() {
        let payload = b"outside the header".to_vec();
        let buffer = ForeignBuffer::empty();
        let read = buffer
            .heap_bytes(payload.as_ptr() as usize as u64, payload.len())
            .unwrap();
        assert_eq!(read, payload.as_slice());
        assert!(buffer.heap_bytes(0, 4).is_err());
    }

    #[test]
    fn test_vector_children() {
        let child = ForeignVector::new(
            LogicalType::Integer,
            ForeignBuffer::empty(),
            ValidityMask::all_valid(),
            vec![],
            0,
        );
        let mut parent = ForeignVector::new(
            LogicalType::list(LogicalType::Integer),
            ForeignBuffer::empty(),
            ValidityMask::all_valid(),
            vec![child],
            0,
        );
        assert!(parent.child(0).is_ok());
        assert!(parent.child(1).is_err());
        assert_eq!(parent.take_children().len(), 1);
        assert!(parent.children().is_empty());
    }
}
