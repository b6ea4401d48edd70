//! Engine boundary: the calls the marshaling layer makes into the engine's C
//! interface, expressed as traits, plus scoped ownership of logical-type
//! handles.
//!
//! `local` implements every trait over Rust-owned buffers laid out exactly
//! like the engine's, so readers and writers run without a linked engine.

pub mod local;

use crate::common::constants::STANDARD_VECTOR_SIZE;
use crate::common::error::DuckBridgeResult;
use crate::types::{EnumDictionary, LogicalType, TypeTag};
use crate::vector::ForeignVector;

/// Facts the engine reports about itself
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineInfo;

impl EngineInfo {
    /// Rows per standard data chunk
    pub const fn vector_size() -> usize {
        STANDARD_VECTOR_SIZE
    }
}

/// A data chunk the engine produced, valid until it is dropped
pub trait DataChunkHandle {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    /// Column vector, borrowing the chunk
    fn vector(&self, column: usize) -> DuckBridgeResult<ForeignVector<'_>>;
}

/// Write side of one vector of a chunk being filled
pub trait WritableVector {
    fn logical_type(&self) -> &LogicalType;

    /// Rows the data buffer can hold
    fn capacity(&self) -> usize;

    fn data_mut(&mut self) -> &mut [u8];

    /// Allocate the validity buffer with every row valid, if not yet present
    fn ensure_validity_writable(&mut self);

    fn validity_mut(&mut self) -> Option<&mut [u64]>;

    /// Copy a string or blob payload into the row's header, inline or on the
    /// vector's heap
    fn assign_string_element(&mut self, offset: usize, payload: &[u8]) -> DuckBridgeResult<()>;

    /// Rows currently used in a list vector's child
    fn list_size(&self) -> usize;

    /// Make room for at least `size` rows in a list vector's child
    fn reserve_list_child(&mut self, size: usize) -> DuckBridgeResult<()>;

    fn set_list_size(&mut self, size: usize) -> DuckBridgeResult<()>;

    /// Child vector of a list, array, map or struct
    fn child_mut(&mut self, index: usize) -> DuckBridgeResult<&mut dyn WritableVector>;
}

/// Receiver of chunks filled by an appender
pub trait ChunkSink {
    fn append_chunk(&mut self, chunk: local::LocalDataChunk) -> DuckBridgeResult<()>;
}

/// The engine's logical-type calls. Child accessors hand out new handles that
/// the caller must destroy.
pub trait TypeHandleApi {
    type Handle: Copy + std::fmt::Debug;

    fn type_id(&self, handle: Self::Handle) -> u32;

    fn decimal_width(&self, handle: Self::Handle) -> u8;

    fn decimal_scale(&self, handle: Self::Handle) -> u8;

    fn enum_dictionary_size(&self, handle: Self::Handle) -> u32;

    fn enum_dictionary_value(&self, handle: Self::Handle, index: u32) -> DuckBridgeResult<String>;

    fn list_child_type(&self, handle: Self::Handle) -> DuckBridgeResult<Self::Handle>;

    fn array_child_type(&self, handle: Self::Handle) -> DuckBridgeResult<Self::Handle>;

    fn array_size(&self, handle: Self::Handle) -> u64;

    fn map_key_type(&self, handle: Self::Handle) -> DuckBridgeResult<Self::Handle>;

    fn map_value_type(&self, handle: Self::Handle) -> DuckBridgeResult<Self::Handle>;

    fn struct_child_count(&self, handle: Self::Handle) -> u64;

    fn struct_child_name(&self, handle: Self::Handle, index: u64) -> DuckBridgeResult<String>;

    fn struct_child_type(&self, handle: Self::Handle, index: u64) -> DuckBridgeResult<Self::Handle>;

    fn destroy_type(&self, handle: Self::Handle);
}

/// Owns a type handle and destroys it on drop
pub struct TypeGuard<'api, A: TypeHandleApi + ?Sized> {
    api: &'api A,
    handle: A::Handle,
}

impl<'api, A: TypeHandleApi + ?Sized> TypeGuard<'api, A> {
    pub fn new(api: &'api A, handle: A::Handle) -> Self {
        Self { api, handle }
    }

    pub fn handle(&self) -> A::Handle {
        self.handle
    }
}

impl<A: TypeHandleApi + ?Sized> Drop for TypeGuard<'_, A> {
    fn drop(&mut self) {
        self.api.destroy_type(self.handle);
    }
}

/// Build the logical type behind `handle`. The root handle stays owned by
/// the caller; every child handle acquired on the way is released, also when
/// the description fails part-way.
pub fn describe_logical_type<A>(api: &A, handle: A::Handle) -> DuckBridgeResult<LogicalType>
where
    A: TypeHandleApi + ?Sized,
{
    let tag = TypeTag::from_raw(api.type_id(handle))?;
    let logical_type = match tag {
        TypeTag::Boolean => LogicalType::Boolean,
        TypeTag::TinyInt => LogicalType::TinyInt,
        TypeTag::SmallInt => LogicalType::SmallInt,
        TypeTag::Integer => LogicalType::Integer,
        TypeTag::BigInt => LogicalType::BigInt,
        TypeTag::HugeInt => LogicalType::HugeInt,
        TypeTag::UTinyInt => LogicalType::UTinyInt,
        TypeTag::USmallInt => LogicalType::USmallInt,
        TypeTag::UInteger => LogicalType::UInteger,
        TypeTag::UBigInt => LogicalType::UBigInt,
        TypeTag::UHugeInt => LogicalType::UHugeInt,
        TypeTag::Float => LogicalType::Float,
        TypeTag::Double => LogicalType::Double,
        TypeTag::Decimal => {
            LogicalType::decimal(api.decimal_width(handle), api.decimal_scale(handle))?
        }
        TypeTag::Date => LogicalType::Date,
        TypeTag::Time => LogicalType::Time,
        TypeTag::TimeTz => LogicalType::TimeTz,
        TypeTag::Timestamp => LogicalType::Timestamp,
        TypeTag::TimestampS => LogicalType::TimestampS,
        TypeTag::TimestampMs => LogicalType::TimestampMs,
        TypeTag::TimestampNs => LogicalType::TimestampNs,
        TypeTag::TimestampTz => LogicalType::TimestampTz,
        TypeTag::Interval => LogicalType::Interval,
        TypeTag::Varchar => LogicalType::Varchar,
        TypeTag::Blob => LogicalType::Blob,
        TypeTag::Uuid => LogicalType::Uuid,
        TypeTag::VarInt => LogicalType::VarInt,
        TypeTag::Enum => {
            let values = (0..api.enum_dictionary_size(handle))
                .map(|index| api.enum_dictionary_value(handle, index))
                .collect::<DuckBridgeResult<Vec<_>>>()?;
            LogicalType::Enum(EnumDictionary::new(values))
        }
        TypeTag::List => {
            let child = TypeGuard::new(api, api.list_child_type(handle)?);
            LogicalType::list(describe_logical_type(api, child.handle())?)
        }
        TypeTag::Array => {
            let child = TypeGuard::new(api, api.array_child_type(handle)?);
            let size = usize::try_from(api.array_size(handle))
                .map_err(|_| crate::overflow_err!("Array size exceeds the address space"))?;
            LogicalType::array(describe_logical_type(api, child.handle())?, size)
        }
        TypeTag::Map => {
            let key = TypeGuard::new(api, api.map_key_type(handle)?);
            let value = TypeGuard::new(api, api.map_value_type(handle)?);
            LogicalType::map(
                describe_logical_type(api, key.handle())?,
                describe_logical_type(api, value.handle())?,
            )
        }
        TypeTag::Struct => {
            let fields = (0..api.struct_child_count(handle))
                .map(|index| {
                    let name = api.struct_child_name(handle, index)?;
                    let child = TypeGuard::new(api, api.struct_child_type(handle, index)?);
                    Ok((name, describe_logical_type(api, child.handle())?))
                })
                .collect::<DuckBridgeResult<Vec<_>>>()?;
            LogicalType::Struct(fields)
        }
        TypeTag::Union | TypeTag::Bit | TypeTag::Any | TypeTag::SqlNull | TypeTag::Invalid => {
            return Err(crate::not_implemented_err!(
                "Engine type {:?} is not supported",
                tag
            ))
        }
    };
    tracing::trace!("described type handle {:?} as {}", handle, logical_type);
    Ok(logical_type)
}
