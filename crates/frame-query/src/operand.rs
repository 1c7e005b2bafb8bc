#![forbid(unsafe_code)]

//! Scalar-or-array intermediate results of expression evaluation.

use crate::ast::Literal;
use frame_columnar::{
    try_filled_vec, try_vec_with_capacity, BitVec, Buffer, ChunkValues, Column, FrameError,
    FrameResult, Utf8Values,
};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Int64,
    Float64,
    String,
    Bool,
}

impl OperandKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, OperandKind::Int64 | OperandKind::Float64)
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperandKind::Int64 => "int64",
            OperandKind::Float64 => "float64",
            OperandKind::String => "string",
            OperandKind::Bool => "bool",
        })
    }
}

/// Per-row view over a shared numeric buffer.
///
/// Aliasing a column shares its allocation; the first `store` into a shared buffer copies it.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayOperand<T> {
    buffer: Buffer<T>,
}

impl<T: Copy + Default> ArrayOperand<T> {
    pub fn alias(buffer: &Buffer<T>) -> Self {
        Self {
            buffer: Arc::clone(buffer),
        }
    }

    /// A zero-filled buffer of `len` rows.
    pub fn fresh(len: usize) -> FrameResult<Self> {
        Ok(Self::from_vec(try_filled_vec(len, T::default())?))
    }

    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            buffer: Arc::new(values),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn load(&self, index: usize) -> T {
        self.buffer[index]
    }

    pub fn store(&mut self, index: usize, value: T) {
        self.values_mut()[index] = value;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.buffer
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        Arc::make_mut(&mut self.buffer).as_mut_slice()
    }

    pub fn buffer(&self) -> &Buffer<T> {
        &self.buffer
    }

    pub fn into_buffer(self) -> Buffer<T> {
        self.buffer
    }
}

/// Per-row view over a packed bitset, one bit per row.
#[derive(Clone, Debug, PartialEq)]
pub struct BoolOperand {
    bits: Arc<BitVec>,
}

impl BoolOperand {
    pub fn alias(bits: &Arc<BitVec>) -> Self {
        Self {
            bits: Arc::clone(bits),
        }
    }

    /// An all-false bitset of `len` rows.
    pub fn fresh(len: usize) -> FrameResult<Self> {
        let words = try_filled_vec(len.div_ceil(64), 0u64)?;
        Ok(Self::from_bits(BitVec::from_words(words, len)))
    }

    pub fn from_bits(bits: BitVec) -> Self {
        Self {
            bits: Arc::new(bits),
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn load(&self, index: usize) -> bool {
        self.bits.get(index)
    }

    pub fn store(&mut self, index: usize, value: bool) {
        Arc::make_mut(&mut self.bits).set(index, value);
    }

    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    pub fn bits_mut(&mut self) -> &mut BitVec {
        Arc::make_mut(&mut self.bits)
    }

    pub fn shared_bits(&self) -> &Arc<BitVec> {
        &self.bits
    }

    pub fn into_bits(self) -> BitVec {
        Arc::unwrap_or_clone(self.bits)
    }
}

/// Read-only view over a string column's offsets and data.
///
/// Loads borrow from the column's data buffer. String arrays cannot be computed, so there is no
/// way to allocate or write one.
#[derive(Clone, Copy, Debug)]
pub struct StringOperand<'a> {
    values: &'a Utf8Values,
}

impl<'a> StringOperand<'a> {
    pub fn alias(values: &'a Utf8Values) -> Self {
        Self { values }
    }

    pub fn fresh(_len: usize) -> FrameResult<Self> {
        Err(FrameError::unsupported("allocate", "string array operand"))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn load(&self, index: usize) -> &'a str {
        self.values.value(index)
    }

    pub fn store(&mut self, _index: usize, _value: &str) -> FrameResult<()> {
        Err(FrameError::unsupported("store", "string array operand"))
    }

    pub fn values(&self) -> &'a Utf8Values {
        self.values
    }
}

#[derive(Clone, Debug)]
pub enum Operand<'a> {
    Int64Scalar(i64),
    Float64Scalar(f64),
    StringScalar(&'a str),
    Int64Array(ArrayOperand<i64>),
    Float64Array(ArrayOperand<f64>),
    StringArray(StringOperand<'a>),
    BoolArray(BoolOperand),
}

impl<'a> Operand<'a> {
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Int64Scalar(_) | Operand::Int64Array(_) => OperandKind::Int64,
            Operand::Float64Scalar(_) | Operand::Float64Array(_) => OperandKind::Float64,
            Operand::StringScalar(_) | Operand::StringArray(_) => OperandKind::String,
            Operand::BoolArray(_) => OperandKind::Bool,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Operand::Int64Scalar(_) | Operand::Float64Scalar(_) | Operand::StringScalar(_)
        )
    }

    pub fn from_literal(literal: &'a Literal) -> Self {
        match literal {
            Literal::Int64(v) => Operand::Int64Scalar(*v),
            Literal::Float64(v) => Operand::Float64Scalar(*v),
            Literal::String(s) => Operand::StringScalar(s),
        }
    }

    /// Operand over a column's values.
    ///
    /// 64-bit integers, doubles, strings and booleans alias the column storage. Narrower
    /// integers are widened into a fresh `Int64Array` and `Float32` into a `Float64Array`.
    pub fn from_column(column: &'a Column) -> FrameResult<Self> {
        let chunk = column.segment()?;
        let operand = match chunk.values() {
            ChunkValues::Int64(v) => Operand::Int64Array(ArrayOperand::alias(v)),
            ChunkValues::Float64(v) => Operand::Float64Array(ArrayOperand::alias(v)),
            ChunkValues::Int8(v) => Operand::Int64Array(widen(v, i64::from)?),
            ChunkValues::Int16(v) => Operand::Int64Array(widen(v, i64::from)?),
            ChunkValues::Int32(v) => Operand::Int64Array(widen(v, i64::from)?),
            ChunkValues::UInt8(v) => Operand::Int64Array(widen(v, i64::from)?),
            ChunkValues::UInt16(v) => Operand::Int64Array(widen(v, i64::from)?),
            ChunkValues::UInt32(v) => Operand::Int64Array(widen(v, i64::from)?),
            ChunkValues::Float32(v) => Operand::Float64Array(widen(v, f64::from)?),
            ChunkValues::Boolean(bits) => Operand::BoolArray(BoolOperand::alias(bits)),
            ChunkValues::Utf8(strings) => Operand::StringArray(StringOperand::alias(strings)),
            ChunkValues::UInt64(_) => {
                return Err(FrameError::unsupported(
                    format!("reference to column {}", column.name()),
                    "uint64 values",
                ))
            }
        };
        Ok(operand)
    }
}

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = if self.is_scalar() { "scalar" } else { "array" };
        write!(f, "{} {shape}", self.kind())
    }
}

fn widen<T: Copy, U: Copy + Default>(
    values: &[T],
    convert: impl Fn(T) -> U,
) -> FrameResult<ArrayOperand<U>> {
    let mut out = try_vec_with_capacity(values.len())?;
    out.extend(values.iter().map(|&v| convert(v)));
    Ok(ArrayOperand::from_vec(out))
}
