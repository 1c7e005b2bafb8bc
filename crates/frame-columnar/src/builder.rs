#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::column::{Chunk, ChunkValues, Column, Utf8Values};
use crate::error::{FrameError, FrameResult};
use crate::types::NativeType;
use std::sync::Arc;

/// Appends values of one numeric kind and finishes into a contiguous [`Column`].
///
/// Null slots store `T::default()` in the value buffer.
#[derive(Debug)]
pub struct PrimitiveBuilder<T: NativeType> {
    values: Vec<T>,
    validity: BitVec,
}

impl<T: NativeType> PrimitiveBuilder<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            validity: BitVec::with_capacity_bits(capacity),
        }
    }

    pub fn reserve(&mut self, additional: usize) -> FrameResult<()> {
        self.values
            .try_reserve(additional)
            .map_err(|_| FrameError::AllocationFailure {
                requested: additional,
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn append_value(&mut self, value: T) {
        self.values.push(value);
        self.validity.push(true);
    }

    pub fn append_null(&mut self) {
        self.values.push(T::default());
        self.validity.push(false);
    }

    pub fn append_option(&mut self, value: Option<T>) {
        match value {
            Some(v) => self.append_value(v),
            None => self.append_null(),
        }
    }

    pub fn finish(self, name: impl Into<String>) -> Column {
        let values = T::into_chunk_values(Arc::new(self.values));
        Column::new(name, Chunk::from_trusted(values, Some(self.validity)))
    }
}

impl<T: NativeType> Default for PrimitiveBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct BooleanBuilder {
    values: BitVec,
    validity: BitVec,
}

impl BooleanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: BitVec::with_capacity_bits(capacity),
            validity: BitVec::with_capacity_bits(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn append_value(&mut self, value: bool) {
        self.values.push(value);
        self.validity.push(true);
    }

    pub fn append_null(&mut self) {
        self.values.push(false);
        self.validity.push(false);
    }

    pub fn append_option(&mut self, value: Option<bool>) {
        match value {
            Some(v) => self.append_value(v),
            None => self.append_null(),
        }
    }

    pub fn finish(self, name: impl Into<String>) -> Column {
        let values = ChunkValues::Boolean(Arc::new(self.values));
        Column::new(name, Chunk::from_trusted(values, Some(self.validity)))
    }
}

/// Appends UTF-8 strings into one data buffer with i32 offsets.
#[derive(Debug)]
pub struct StringBuilder {
    offsets: Vec<i32>,
    data: String,
    validity: BitVec,
    max_bytes: usize,
}

impl StringBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut offsets = Vec::with_capacity(capacity + 1);
        offsets.push(0);
        Self {
            offsets,
            data: String::new(),
            validity: BitVec::with_capacity_bits(capacity),
            max_bytes: i32::MAX as usize,
        }
    }

    #[cfg(test)]
    fn with_byte_limit(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `value`, failing with [`FrameError::AllocationFailure`] once the data buffer would
    /// outgrow i32 offsets (2 GiB). The builder is left unchanged on failure.
    pub fn try_append_value(&mut self, value: &str) -> FrameResult<()> {
        let requested = self.data.len().saturating_add(value.len());
        if requested > self.max_bytes {
            log::warn!("string column data of {requested} bytes exceeds i32 offsets");
            return Err(FrameError::AllocationFailure { requested });
        }
        self.data.push_str(value);
        self.offsets.push(requested as i32);
        self.validity.push(true);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics once the data buffer outgrows i32 offsets (2 GiB); see [`Self::try_append_value`].
    pub fn append_value(&mut self, value: &str) {
        if let Err(err) = self.try_append_value(value) {
            panic!("{err}");
        }
    }

    pub fn append_null(&mut self) {
        self.offsets.push(self.data.len() as i32);
        self.validity.push(false);
    }

    pub fn append_option(&mut self, value: Option<&str>) {
        match value {
            Some(v) => self.append_value(v),
            None => self.append_null(),
        }
    }

    /// Finish into bare string storage, dropping validity.
    pub fn finish_values(self) -> Utf8Values {
        Utf8Values::from_trusted(self.offsets, self.data)
    }

    pub fn finish(self, name: impl Into<String>) -> Column {
        let validity = self.validity;
        let values = Utf8Values::from_trusted(self.offsets, self.data);
        Column::new(name, Chunk::from_trusted(ChunkValues::Utf8(values), Some(validity)))
    }
}

impl Default for StringBuilder {
    fn default() -> Self {
        Self::new()
    }
}
