//! In-process stand-ins for the engine side of the boundary.
//!
//! Buffers follow the engine's layout byte for byte: fixed-width rows at
//! `offset * stride`, validity words allocated on first null, string payloads
//! longer than the inline limit kept on a per-vector heap and referenced by
//! pointer from the header.

use super::{ChunkSink, DataChunkHandle, TypeHandleApi, WritableVector};
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::result::ChunkSource;
use crate::types::{LogicalType, PhysicalType, TypeTag};
use crate::vector::string::{inline_header, is_inlined, pointer_header};
use crate::vector::{validity_words, ForeignBuffer, ForeignVector, ValidityMask};
use parking_lot::Mutex;
use std::collections::HashMap;

/// A vector owned by Rust, readable through `as_foreign`
#[derive(Debug)]
pub struct LocalVector {
    logical_type: LogicalType,
    physical: PhysicalType,
    capacity: usize,
    data: Vec<u8>,
    validity: Option<Vec<u64>>,
    heap: Vec<Box<[u8]>>,
    children: Vec<LocalVector>,
    list_size: usize,
}

impl LocalVector {
    pub fn new(logical_type: LogicalType, capacity: usize) -> Self {
        let physical = logical_type.physical_type();
        let children = match &logical_type {
            LogicalType::List(child) => vec![LocalVector::new((**child).clone(), capacity)],
            LogicalType::Map { key, value } => vec![LocalVector::new(
                LogicalType::map_entry_type(key, value),
                capacity,
            )],
            LogicalType::Array { child, size } => {
                vec![LocalVector::new((**child).clone(), capacity.saturating_mul(*size))]
            }
            LogicalType::Struct(fields) => fields
                .iter()
                .map(|(_, field)| LocalVector::new(field.clone(), capacity))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            data: vec![0u8; capacity * physical.get_size()],
            logical_type,
            physical,
            capacity,
            validity: None,
            heap: Vec::new(),
            children,
            list_size: 0,
        }
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.physical
    }

    pub fn has_validity(&self) -> bool {
        self.validity.is_some()
    }

    pub fn children(&self) -> &[LocalVector] {
        &self.children
    }

    /// Bytes held on the string heap
    pub fn heap_bytes(&self) -> usize {
        self.heap.iter().map(|payload| payload.len()).sum()
    }

    /// Grow to at least `capacity` rows, keeping written rows and pointers
    pub fn grow(&mut self, capacity: usize) {
        if capacity <= self.capacity {
            return;
        }
        self.data.resize(capacity * self.physical.get_size(), 0);
        if let Some(words) = self.validity.as_mut() {
            words.resize(validity_words(capacity), u64::MAX);
        }
        match &self.logical_type {
            LogicalType::Struct(_) => {
                for child in &mut self.children {
                    child.grow(capacity);
                }
            }
            LogicalType::Array { size, .. } => {
                let size = *size;
                for child in &mut self.children {
                    child.grow(capacity.saturating_mul(size));
                }
            }
            _ => {}
        }
        self.capacity = capacity;
    }

    /// Read-only view of the first `rows` rows
    pub fn as_foreign(&self, rows: usize) -> ForeignVector<'_> {
        let rows = rows.min(self.capacity);
        let stride = self.physical.get_size();
        // SAFETY: string headers are only written by assign_string_element,
        // whose heap payloads are boxed in self.heap and live as long as self
        let data = unsafe { ForeignBuffer::from_slice(&self.data[..rows * stride], stride) };
        let validity = self
            .validity
            .as_deref()
            .map_or_else(ValidityMask::all_valid, ValidityMask::from_words);
        let children = match &self.logical_type {
            LogicalType::List(_) | LogicalType::Map { .. } => self
                .children
                .iter()
                .map(|child| child.as_foreign(self.list_size))
                .collect(),
            LogicalType::Array { size, .. } => self
                .children
                .iter()
                .map(|child| child.as_foreign(rows.saturating_mul(*size)))
                .collect(),
            _ => self.children.iter().map(|child| child.as_foreign(rows)).collect(),
        };
        ForeignVector::new(self.logical_type.clone(), data, validity, children, rows)
    }
}

impl WritableVector for LocalVector {
    fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn data_mut(&mut self) -> &mut [u8] {
        // string headers hold heap pointers and go through assign_string_element
        if self.physical == PhysicalType::VarcharString {
            return &mut [];
        }
        &mut self.data
    }

    fn ensure_validity_writable(&mut self) {
        if self.validity.is_none() {
            self.validity = Some(vec![u64::MAX; validity_words(self.capacity)]);
        }
    }

    fn validity_mut(&mut self) -> Option<&mut [u64]> {
        self.validity.as_deref_mut()
    }

    fn assign_string_element(&mut self, offset: usize, payload: &[u8]) -> DuckBridgeResult<()> {
        if self.physical != PhysicalType::VarcharString {
            return Err(DuckBridgeError::Internal(format!(
                "String assigned to a {} vector",
                self.logical_type
            )));
        }
        if offset >= self.capacity {
            return Err(DuckBridgeError::OutOfBounds(format!(
                "String row {} outside a vector of {} rows",
                offset, self.capacity
            )));
        }
        let header = if is_inlined(payload.len()) {
            inline_header(payload)?
        } else {
            let owned: Box<[u8]> = payload.into();
            let header = pointer_header(&owned)?;
            // the boxed payload never moves, so the header pointer stays valid
            self.heap.push(owned);
            header
        };
        let start = offset * header.len();
        self.data[start..start + header.len()].copy_from_slice(&header);
        Ok(())
    }

    fn list_size(&self) -> usize {
        self.list_size
    }

    fn reserve_list_child(&mut self, size: usize) -> DuckBridgeResult<()> {
        let child = self.children.first_mut().ok_or_else(|| {
            DuckBridgeError::Internal(format!("{} vector has no list child", self.logical_type))
        })?;
        if size > child.capacity {
            child.grow(size.max(child.capacity.saturating_mul(2)));
        }
        Ok(())
    }

    fn set_list_size(&mut self, size: usize) -> DuckBridgeResult<()> {
        let capacity = self.children.first().map_or(0, |child| child.capacity);
        if size > capacity {
            return Err(DuckBridgeError::OutOfBounds(format!(
                "List size {} exceeds a child capacity of {}",
                size, capacity
            )));
        }
        self.list_size = size;
        Ok(())
    }

    fn child_mut(&mut self, index: usize) -> DuckBridgeResult<&mut dyn WritableVector> {
        let logical_type = &self.logical_type;
        self.children
            .get_mut(index)
            .map(|child| child as &mut dyn WritableVector)
            .ok_or_else(|| {
                DuckBridgeError::OutOfBounds(format!("{} vector has no child {}", logical_type, index))
            })
    }
}

/// A data chunk of `LocalVector` columns
#[derive(Debug)]
pub struct LocalDataChunk {
    vectors: Vec<LocalVector>,
    row_count: usize,
    capacity: usize,
}

impl LocalDataChunk {
    pub fn new(column_types: &[LogicalType], capacity: usize) -> Self {
        Self {
            vectors: column_types
                .iter()
                .map(|logical_type| LocalVector::new(logical_type.clone(), capacity))
                .collect(),
            row_count: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.row_count >= self.capacity
    }

    pub fn set_row_count(&mut self, row_count: usize) -> DuckBridgeResult<()> {
        if row_count > self.capacity {
            return Err(DuckBridgeError::OutOfBounds(format!(
                "{} rows in a chunk of capacity {}",
                row_count, self.capacity
            )));
        }
        self.row_count = row_count;
        Ok(())
    }

    pub fn column_types(&self) -> Vec<LogicalType> {
        self.vectors.iter().map(|v| v.logical_type.clone()).collect()
    }

    pub fn local_vector(&self, column: usize) -> DuckBridgeResult<&LocalVector> {
        self.vectors.get(column).ok_or_else(|| self.missing(column))
    }

    pub fn vector_mut(&mut self, column: usize) -> DuckBridgeResult<&mut LocalVector> {
        let columns = self.vectors.len();
        self.vectors.get_mut(column).ok_or_else(|| {
            DuckBridgeError::OutOfBounds(format!("Column {} of a {}-column chunk", column, columns))
        })
    }

    fn missing(&self, column: usize) -> DuckBridgeError {
        DuckBridgeError::OutOfBounds(format!(
            "Column {} of a {}-column chunk",
            column,
            self.vectors.len()
        ))
    }
}

impl DataChunkHandle for LocalDataChunk {
    fn row_count(&self) -> usize {
        self.row_count
    }

    fn column_count(&self) -> usize {
        self.vectors.len()
    }

    fn vector(&self, column: usize) -> DuckBridgeResult<ForeignVector<'_>> {
        Ok(self.local_vector(column)?.as_foreign(self.row_count))
    }
}

/// Sink that keeps every flushed chunk
#[derive(Debug, Default)]
pub struct CollectingSink {
    chunks: Vec<LocalDataChunk>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[LocalDataChunk] {
        &self.chunks
    }

    pub fn row_count(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.row_count).sum()
    }

    pub fn into_chunks(self) -> Vec<LocalDataChunk> {
        self.chunks
    }
}

impl ChunkSink for CollectingSink {
    fn append_chunk(&mut self, chunk: LocalDataChunk) -> DuckBridgeResult<()> {
        tracing::trace!("sink received chunk of {} rows", chunk.row_count);
        self.chunks.push(chunk);
        Ok(())
    }
}

impl<S: ChunkSink + ?Sized> ChunkSink for &mut S {
    fn append_chunk(&mut self, chunk: LocalDataChunk) -> DuckBridgeResult<()> {
        (**self).append_chunk(chunk)
    }
}

/// Query result served from chunks held in memory
#[derive(Debug)]
pub struct MemoryResult {
    column_names: Vec<String>,
    column_types: Vec<LogicalType>,
    chunks: std::vec::IntoIter<LocalDataChunk>,
}

impl MemoryResult {
    pub fn new(
        column_names: Vec<String>,
        column_types: Vec<LogicalType>,
        chunks: Vec<LocalDataChunk>,
    ) -> DuckBridgeResult<Self> {
        if column_names.len() != column_types.len() {
            return Err(DuckBridgeError::InvalidArgument(format!(
                "{} column names for {} column types",
                column_names.len(),
                column_types.len()
            )));
        }
        if let Some(chunk) = chunks.iter().find(|c| c.column_types() != column_types) {
            return Err(DuckBridgeError::InvalidArgument(format!(
                "Chunk columns ({}) differ from the result columns",
                chunk
                    .column_types()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        Ok(Self {
            column_names,
            column_types,
            chunks: chunks.into_iter(),
        })
    }

    /// Result whose column types come from engine type handles
    pub fn from_type_handles<A: TypeHandleApi + ?Sized>(
        column_names: Vec<String>,
        api: &A,
        handles: &[A::Handle],
        chunks: Vec<LocalDataChunk>,
    ) -> DuckBridgeResult<Self> {
        let column_types = handles
            .iter()
            .map(|handle| super::describe_logical_type(api, *handle))
            .collect::<DuckBridgeResult<Vec<_>>>()?;
        Self::new(column_names, column_types, chunks)
    }
}

impl ChunkSource for MemoryResult {
    type Chunk = LocalDataChunk;

    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    fn column_types(&self) -> &[LogicalType] {
        &self.column_types
    }

    fn next_chunk(&mut self) -> DuckBridgeResult<Option<LocalDataChunk>> {
        Ok(self.chunks.next())
    }
}

/// Type tree behind a registry handle
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Logical(LogicalType),
    /// A type the engine knows but the marshaling layer does not decode
    Unsupported(TypeTag),
    /// A struct whose fields may include unsupported nodes
    Struct(Vec<(String, TypeNode)>),
}

impl TypeNode {
    fn type_id(&self) -> u32 {
        match self {
            TypeNode::Logical(logical_type) => logical_type.tag() as u32,
            TypeNode::Unsupported(tag) => *tag as u32,
            TypeNode::Struct(_) => TypeTag::Struct as u32,
        }
    }

    fn struct_fields(&self) -> Vec<(String, TypeNode)> {
        match self {
            TypeNode::Struct(fields) => fields.clone(),
            TypeNode::Logical(LogicalType::Struct(fields)) => fields
                .iter()
                .map(|(name, field)| (name.clone(), TypeNode::Logical(field.clone())))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Logical-type handles over an in-memory table, counting live handles
#[derive(Debug, Default)]
pub struct LocalTypeRegistry {
    state: Mutex<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    next: u64,
    live: HashMap<u64, TypeNode>,
}

impl LocalTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a handle; release it with `destroy_type`
    pub fn acquire(&self, node: TypeNode) -> u64 {
        let mut state = self.state.lock();
        state.next += 1;
        let handle = state.next;
        state.live.insert(handle, node);
        handle
    }

    pub fn acquire_logical(&self, logical_type: LogicalType) -> u64 {
        self.acquire(TypeNode::Logical(logical_type))
    }

    /// Handles acquired and not yet destroyed
    pub fn live_handles(&self) -> usize {
        self.state.lock().live.len()
    }

    fn node(&self, handle: u64) -> DuckBridgeResult<TypeNode> {
        self.state
            .lock()
            .live
            .get(&handle)
            .cloned()
            .ok_or_else(|| DuckBridgeError::Engine(format!("Type handle {} is not live", handle)))
    }

    fn logical(&self, handle: u64) -> Option<LogicalType> {
        match self.node(handle) {
            Ok(TypeNode::Logical(logical_type)) => Some(logical_type),
            _ => None,
        }
    }

    fn child(&self, handle: u64, select: impl FnOnce(&LogicalType) -> Option<LogicalType>) -> DuckBridgeResult<u64> {
        let logical_type = self
            .logical(handle)
            .ok_or_else(|| DuckBridgeError::Engine(format!("Type handle {} has no child", handle)))?;
        let child = select(&logical_type).ok_or_else(|| {
            DuckBridgeError::Engine(format!("{} has no such child type", logical_type))
        })?;
        Ok(self.acquire_logical(child))
    }
}

impl TypeHandleApi for LocalTypeRegistry {
    type Handle = u64;

    fn type_id(&self, handle: u64) -> u32 {
        self.node(handle).map_or(TypeTag::Invalid as u32, |node| node.type_id())
    }

    fn decimal_width(&self, handle: u64) -> u8 {
        match self.logical(handle) {
            Some(LogicalType::Decimal { width, .. }) => width,
            _ => 0,
        }
    }

    fn decimal_scale(&self, handle: u64) -> u8 {
        match self.logical(handle) {
            Some(LogicalType::Decimal { scale, .. }) => scale,
            _ => 0,
        }
    }

    fn enum_dictionary_size(&self, handle: u64) -> u32 {
        match self.logical(handle) {
            Some(LogicalType::Enum(dictionary)) => dictionary.len() as u32,
            _ => 0,
        }
    }

    fn enum_dictionary_value(&self, handle: u64, index: u32) -> DuckBridgeResult<String> {
        match self.logical(handle) {
            Some(LogicalType::Enum(dictionary)) => dictionary
                .get(index as usize)
                .map(str::to_string)
                .ok_or_else(|| DuckBridgeError::Engine(format!("No enum entry {}", index))),
            _ => Err(DuckBridgeError::Engine(format!("Type handle {} is not an enum", handle))),
        }
    }

    fn list_child_type(&self, handle: u64) -> DuckBridgeResult<u64> {
        self.child(handle, |logical_type| match logical_type {
            LogicalType::List(child) => Some((**child).clone()),
            _ => None,
        })
    }

    fn array_child_type(&self, handle: u64) -> DuckBridgeResult<u64> {
        self.child(handle, |logical_type| match logical_type {
            LogicalType::Array { child, .. } => Some((**child).clone()),
            _ => None,
        })
    }

    fn array_size(&self, handle: u64) -> u64 {
        match self.logical(handle) {
            Some(LogicalType::Array { size, .. }) => size as u64,
            _ => 0,
        }
    }

    fn map_key_type(&self, handle: u64) -> DuckBridgeResult<u64> {
        self.child(handle, |logical_type| match logical_type {
            LogicalType::Map { key, .. } => Some((**key).clone()),
            _ => None,
        })
    }

    fn map_value_type(&self, handle: u64) -> DuckBridgeResult<u64> {
        self.child(handle, |logical_type| match logical_type {
            LogicalType::Map { value, .. } => Some((**value).clone()),
            _ => None,
        })
    }

    fn struct_child_count(&self, handle: u64) -> u64 {
        self.node(handle)
            .map_or(0, |node| node.struct_fields().len() as u64)
    }

    fn struct_child_name(&self, handle: u64, index: u64) -> DuckBridgeResult<String> {
        self.node(handle)?
            .struct_fields()
            .get(index as usize)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| DuckBridgeError::Engine(format!("No struct child {}", index)))
    }

    fn struct_child_type(&self, handle: u64, index: u64) -> DuckBridgeResult<u64> {
        let field = self
            .node(handle)?
            .struct_fields()
            .into_iter()
            .nth(index as usize)
            .ok_or_else(|| DuckBridgeError::Engine(format!("No struct child {}", index)))?;
        Ok(self.acquire(field.1))
    }

    fn destroy_type(&self, handle: u64) {
        self.state.lock().live.remove(&handle);
    }
}
