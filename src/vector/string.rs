//! The engine's 16-byte string header.
//!
//! ```text
//! inline  (len <= 12): | u32 len | 12 bytes payload, zero padded   |
//! pointer (len >  12): | u32 len | 4 byte prefix | 8 byte pointer |
//! ```

use crate::common::constants::{STRING_HEADER_SIZE, STRING_INLINE_LENGTH, STRING_PREFIX_LENGTH};
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::vector::foreign::{FixedWidth, ForeignBuffer};

const LENGTH_SIZE: usize = 4;
const POINTER_OFFSET: usize = LENGTH_SIZE + STRING_PREFIX_LENGTH;

/// Whether a payload of `len` bytes is stored inside the header
#[inline]
pub const fn is_inlined(len: usize) -> bool {
    len <= STRING_INLINE_LENGTH
}

/// Payload bytes of the string at `index`, never reading past its length.
/// Heap pointers are trusted as the buffer's unsafe constructors require.
pub fn read_string_bytes<'a>(buffer: &ForeignBuffer<'a>, index: usize) -> DuckBridgeResult<&'a [u8]> {
    let header = buffer.element(index)?;
    if header.len() != STRING_HEADER_SIZE {
        return Err(DuckBridgeError::Internal(format!(
            "String header of {} bytes",
            header.len()
        )));
    }
    let len = u32::decode(&header[..LENGTH_SIZE]) as usize;
    if is_inlined(len) {
        Ok(&header[LENGTH_SIZE..LENGTH_SIZE + len])
    } else {
        let ptr = u64::decode(&header[POINTER_OFFSET..STRING_HEADER_SIZE]);
        buffer.heap_bytes(ptr, len)
    }
}

/// Header for a payload short enough to inline
pub fn inline_header(payload: &[u8]) -> DuckBridgeResult<[u8; STRING_HEADER_SIZE]> {
    if !is_inlined(payload.len()) {
        return Err(DuckBridgeError::InvalidArgument(format!(
            "{} bytes do not fit inline",
            payload.len()
        )));
    }
    let mut header = [0u8; STRING_HEADER_SIZE];
    (payload.len() as u32).encode(&mut header[..LENGTH_SIZE]);
    header[LENGTH_SIZE..LENGTH_SIZE + payload.len()].copy_from_slice(payload);
    Ok(header)
}

/// Header pointing at `heap`, which must outlive every reader of the header
pub fn pointer_header(heap: &[u8]) -> DuckBridgeResult<[u8; STRING_HEADER_SIZE]> {
    let len = u32::try_from(heap.len()).map_err(|_| {
        crate::overflow_err!("String of {} bytes exceeds the engine limit", heap.len())
    })?;
    let mut header = [0u8; STRING_HEADER_SIZE];
    len.encode(&mut header[..LENGTH_SIZE]);
    header[LENGTH_SIZE..POINTER_OFFSET].copy_from_slice(&heap[..STRING_PREFIX_LENGTH]);
    (heap.as_ptr() as usize as u64).encode(&mut header[POINTER_OFFSET..]);
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_boundary() {
        let twelve = b"abcdefghijkl";
        let header = inline_header(twelve).unwrap();
        let buffer = unsafe { ForeignBuffer::from_slice(&header, STRING_HEADER_SIZE) };
        assert_eq!(read_string_bytes(&buffer, 0).unwrap(), twelve);
        assert!(inline_header(b"abcdefghijklm").is_err());
    }

    #[test]
    fn test_pointer_layout() {
        let heap: Box<[u8]> = b"abcdefghijklm".to_vec().into_boxed_slice();
        let header = pointer_header(&heap).unwrap();
        assert_eq!(&header[4..8], b"abcd");
        let buffer = unsafe { ForeignBuffer::from_slice(&header, STRING_HEADER_SIZE) };
        assert_eq!(read_string_bytes(&buffer, 0).unwrap(), &heap[..]);
    }

    #[test]
    fn test_null_payload_pointer() {
        let mut header = [0u8; STRING_HEADER_SIZE];
        20u32.encode(&mut header[..LENGTH_SIZE]);
        let buffer = unsafe { ForeignBuffer::from_slice(&header, STRING_HEADER_SIZE) };
        assert!(matches!(
            read_string_bytes(&buffer, 0),
            Err(DuckBridgeError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_empty_string() {
        let header = inline_header(b"").unwrap();
        let buffer = unsafe { ForeignBuffer::from_slice(&header, STRING_HEADER_SIZE) };
        assert!(read_string_bytes(&buffer, 0).unwrap().is_empty());
    }
}
