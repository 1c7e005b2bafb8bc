#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::builder::{BooleanBuilder, PrimitiveBuilder, StringBuilder};
use crate::error::{try_vec_with_capacity, FrameError, FrameResult};
use crate::types::{DataType, NativeType, Value};
use std::sync::Arc;

/// Shared, immutable value buffer. Cloning aliases the allocation.
pub type Buffer<T> = Arc<Vec<T>>;

/// Runs `$body` with `$v` bound to the `&Buffer<T>` of a numeric [`ChunkValues`] variant, once per
/// numeric element type.
///
/// The remaining variants are handled either by a catch-all `$other => $fallback` arm or by
/// explicit `Boolean(..)` and `Utf8(..)` arms.
#[macro_export]
macro_rules! with_numeric_values {
    (@numeric $values:expr, $v:ident => $body:expr, { $($rest:tt)* }) => {
        match $values {
            $crate::ChunkValues::Int8($v) => $body,
            $crate::ChunkValues::Int16($v) => $body,
            $crate::ChunkValues::Int32($v) => $body,
            $crate::ChunkValues::Int64($v) => $body,
            $crate::ChunkValues::UInt8($v) => $body,
            $crate::ChunkValues::UInt16($v) => $body,
            $crate::ChunkValues::UInt32($v) => $body,
            $crate::ChunkValues::UInt64($v) => $body,
            $crate::ChunkValues::Float32($v) => $body,
            $crate::ChunkValues::Float64($v) => $body,
            $($rest)*
        }
    };
    ($values:expr, $v:ident => $body:expr, Boolean($b:pat) => $bool_body:expr, Utf8($s:pat) => $str_body:expr $(,)?) => {
        $crate::with_numeric_values!(@numeric $values, $v => $body, {
            $crate::ChunkValues::Boolean($b) => $bool_body,
            $crate::ChunkValues::Utf8($s) => $str_body,
        })
    };
    ($values:expr, $v:ident => $body:expr, $other:ident => $fallback:expr $(,)?) => {
        $crate::with_numeric_values!(@numeric $values, $v => $body, { $other => $fallback, })
    };
}

/// Value storage of one segment of a column.
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkValues {
    Int8(Buffer<i8>),
    Int16(Buffer<i16>),
    Int32(Buffer<i32>),
    Int64(Buffer<i64>),
    UInt8(Buffer<u8>),
    UInt16(Buffer<u16>),
    UInt32(Buffer<u32>),
    UInt64(Buffer<u64>),
    Float32(Buffer<f32>),
    Float64(Buffer<f64>),
    Boolean(Arc<BitVec>),
    Utf8(Utf8Values),
}

impl ChunkValues {
    pub fn data_type(&self) -> DataType {
        with_numeric_values!(self, v => element_type(v),
            Boolean(_) => DataType::Boolean,
            Utf8(_) => DataType::Utf8,
        )
    }

    pub fn len(&self) -> usize {
        with_numeric_values!(self, v => v.len(),
            Boolean(bits) => bits.len(),
            Utf8(strings) => strings.len(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the raw value at `index`, ignoring validity.
    pub fn value(&self, index: usize) -> Value {
        with_numeric_values!(self, v => v[index].into_value(),
            Boolean(bits) => Value::Boolean(bits.get(index)),
            Utf8(strings) => Value::String(Arc::from(strings.value(index))),
        )
    }

    /// Whether both sides alias the same allocation.
    pub fn ptr_eq(&self, other: &ChunkValues) -> bool {
        match (self, other) {
            (ChunkValues::Int8(a), ChunkValues::Int8(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::Int16(a), ChunkValues::Int16(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::Int32(a), ChunkValues::Int32(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::Int64(a), ChunkValues::Int64(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::UInt8(a), ChunkValues::UInt8(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::UInt16(a), ChunkValues::UInt16(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::UInt32(a), ChunkValues::UInt32(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::UInt64(a), ChunkValues::UInt64(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::Float32(a), ChunkValues::Float32(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::Float64(a), ChunkValues::Float64(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::Boolean(a), ChunkValues::Boolean(b)) => Arc::ptr_eq(a, b),
            (ChunkValues::Utf8(a), ChunkValues::Utf8(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

fn element_type<T: NativeType>(_: &Buffer<T>) -> DataType {
    T::DATA_TYPE
}

/// UTF-8 strings stored as `len + 1` offsets into one shared data buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Utf8Values {
    offsets: Arc<Vec<i32>>,
    data: Arc<str>,
}

impl Utf8Values {
    pub fn try_new(offsets: Vec<i32>, data: impl Into<Arc<str>>) -> FrameResult<Self> {
        let data = data.into();
        if offsets.is_empty() {
            return Err(FrameError::shape_mismatch("string offsets", 1, 0));
        }

        let mut prev = 0usize;
        for (idx, &offset) in offsets.iter().enumerate() {
            let Ok(offset) = usize::try_from(offset) else {
                return Err(FrameError::out_of_range("string offset", idx, offsets.len()));
            };
            let in_bounds = offset <= data.len() && data.is_char_boundary(offset);
            if !in_bounds || (idx > 0 && offset < prev) {
                return Err(FrameError::out_of_range("string offset", idx, offsets.len()));
            }
            prev = offset;
        }

        Ok(Self {
            offsets: Arc::new(offsets),
            data,
        })
    }

    /// Offsets produced by a builder are valid by construction.
    pub(crate) fn from_trusted(offsets: Vec<i32>, data: impl Into<Arc<str>>) -> Self {
        debug_assert!(!offsets.is_empty());
        Self {
            offsets: Arc::new(offsets),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value(&self, index: usize) -> &str {
        let start = self.offsets[index] as usize;
        let end = self.offsets[index + 1] as usize;
        &self.data[start..end]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.len()).map(move |i| self.value(i))
    }

    pub fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn ptr_eq(&self, other: &Utf8Values) -> bool {
        Arc::ptr_eq(&self.offsets, &other.offsets) && Arc::ptr_eq(&self.data, &other.data)
    }
}

/// One contiguous storage segment: a value buffer plus optional validity.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    values: ChunkValues,
    validity: Option<BitVec>,
    null_count: usize,
}

impl Chunk {
    /// A validity bitmap with every bit set is dropped so that `null_count() == 0` exactly when
    /// [`Chunk::validity`] is `None`.
    pub fn new(values: ChunkValues, validity: Option<BitVec>) -> FrameResult<Self> {
        if let Some(bits) = &validity {
            if bits.len() != values.len() {
                return Err(FrameError::shape_mismatch(
                    "validity bitmap",
                    values.len(),
                    bits.len(),
                ));
            }
        }

        Ok(Self::from_trusted(values, validity))
    }

    /// Builders keep values and validity in step, so the length check is skipped.
    pub(crate) fn from_trusted(values: ChunkValues, validity: Option<BitVec>) -> Self {
        debug_assert!(validity.as_ref().map_or(true, |bits| bits.len() == values.len()));
        let validity = validity.filter(|bits| !bits.all_true());
        let null_count = validity.as_ref().map_or(0, BitVec::count_zeros);
        Self {
            values,
            validity,
            null_count,
        }
    }

    pub fn values(&self) -> &ChunkValues {
        &self.values
    }

    pub fn validity(&self) -> Option<&BitVec> {
        self.validity.as_ref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.validity.as_ref().map_or(true, |bits| bits.get(index))
    }

    pub fn data_type(&self) -> DataType {
        self.values.data_type()
    }
}

/// Immutable, named, typed and nullable sequence of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data_type: DataType,
    chunks: Vec<Chunk>,
    len: usize,
    null_count: usize,
}

impl Column {
    pub fn new(name: impl Into<String>, chunk: Chunk) -> Self {
        Self {
            name: name.into(),
            data_type: chunk.data_type(),
            len: chunk.len(),
            null_count: chunk.null_count(),
            chunks: vec![chunk],
        }
    }

    /// Build a column out of several storage segments.
    ///
    /// Such columns can be inspected, but evaluation and statistics reject them with
    /// [`FrameError::MultiSegmentUnsupported`].
    pub fn from_chunks(
        name: impl Into<String>,
        data_type: DataType,
        chunks: Vec<Chunk>,
    ) -> FrameResult<Self> {
        if let Some(bad) = chunks.iter().find(|c| c.data_type() != data_type) {
            return Err(FrameError::type_mismatch(
                "column segments",
                data_type,
                bad.data_type(),
            ));
        }

        Ok(Self {
            name: name.into(),
            data_type,
            len: chunks.iter().map(Chunk::len).sum(),
            null_count: chunks.iter().map(Chunk::null_count).sum(),
            chunks,
        })
    }

    pub fn from_values<T: NativeType>(name: impl Into<String>, values: Vec<T>) -> Self {
        Self::new(name, Chunk::from_trusted(T::into_chunk_values(Arc::new(values)), None))
    }

    pub fn from_options<T: NativeType>(name: impl Into<String>, values: Vec<Option<T>>) -> Self {
        let mut builder = PrimitiveBuilder::<T>::with_capacity(values.len());
        for value in values {
            builder.append_option(value);
        }
        builder.finish(name)
    }

    pub fn from_bools(name: impl Into<String>, values: &[Option<bool>]) -> Self {
        let mut builder = BooleanBuilder::with_capacity(values.len());
        for &value in values {
            builder.append_option(value);
        }
        builder.finish(name)
    }

    pub fn from_strs(name: impl Into<String>, values: &[Option<&str>]) -> Self {
        let mut builder = StringBuilder::with_capacity(values.len());
        for &value in values {
            builder.append_option(value);
        }
        builder.finish(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn num_segments(&self) -> usize {
        self.chunks.len()
    }

    /// The single storage segment of a contiguous column.
    pub fn segment(&self) -> FrameResult<&Chunk> {
        match self.chunks.as_slice() {
            [chunk] => Ok(chunk),
            chunks => Err(FrameError::MultiSegmentUnsupported {
                column: self.name.clone(),
                segments: chunks.len(),
            }),
        }
    }

    fn locate(&self, row: usize) -> Option<(&Chunk, usize)> {
        let mut offset = row;
        for chunk in &self.chunks {
            if offset < chunk.len() {
                return Some((chunk, offset));
            }
            offset -= chunk.len();
        }
        None
    }

    pub fn is_null(&self, row: usize) -> bool {
        self.locate(row).map_or(true, |(chunk, idx)| !chunk.is_valid(idx))
    }

    /// Read one cell. Null rows and rows past the end read as [`Value::Null`].
    pub fn get(&self, row: usize) -> Value {
        match self.locate(row) {
            Some((chunk, idx)) if chunk.is_valid(idx) => chunk.values.value(idx),
            _ => Value::Null,
        }
    }

    pub fn to_values(&self) -> Vec<Value> {
        (0..self.len).map(|row| self.get(row)).collect()
    }

    /// Whether both columns are backed by the very same buffers.
    pub fn shares_storage(&self, other: &Column) -> bool {
        std::ptr::eq(self, other)
            || (self.chunks.len() == other.chunks.len()
                && self
                    .chunks
                    .iter()
                    .zip(&other.chunks)
                    .all(|(a, b)| a.values.ptr_eq(&b.values) && a.validity == b.validity))
    }

    /// Gather the given rows (in the given order) into a new contiguous column.
    pub fn take(&self, rows: &[usize]) -> FrameResult<Column> {
        let chunk = self.segment()?;
        if let Some(&bad) = rows.iter().find(|&&row| row >= self.len) {
            return Err(FrameError::out_of_range("row", bad, self.len));
        }

        let validity = chunk
            .validity
            .as_ref()
            .map(|bits| rows.iter().map(|&row| bits.get(row)).collect::<BitVec>());

        let values = with_numeric_values!(&chunk.values, v => {
            let mut out = try_vec_with_capacity(rows.len())?;
            out.extend(rows.iter().map(|&row| v[row]));
            NativeType::into_chunk_values(Arc::new(out))
        },
            Boolean(bits) => {
                ChunkValues::Boolean(Arc::new(rows.iter().map(|&row| bits.get(row)).collect()))
            },
            Utf8(strings) => ChunkValues::Utf8(take_strings(strings, rows)?),
        );

        Ok(Column::new(self.name.clone(), Chunk::new(values, validity)?))
    }
}

fn take_strings(strings: &Utf8Values, rows: &[usize]) -> FrameResult<Utf8Values> {
    let mut builder = StringBuilder::with_capacity(rows.len());
    for &row in rows {
        builder.try_append_value(strings.value(row))?;
    }
    Ok(builder.finish_values())
}
