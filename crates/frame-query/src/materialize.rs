#![forbid(unsafe_code)]

//! Turning interpreter results into output columns and masks.

use crate::operand::{BoolOperand, Operand};
use frame_columnar::{
    iterate_validity, try_filled_vec, BitVec, Chunk, ChunkValues, Column, FrameError, FrameResult,
    StringBuilder,
};
use std::sync::Arc;

/// Validity of an expression result: a row is present only when it is present in every
/// referenced column. `None` when no referenced column holds a null.
pub fn null_mask(referenced: &[&Column], rows: usize) -> FrameResult<Option<BitVec>> {
    let mut nullable = referenced.iter().filter(|c| c.null_count() > 0).peekable();
    if nullable.peek().is_none() {
        return Ok(None);
    }

    let words = try_filled_vec(rows.div_ceil(64), u64::MAX)?;
    let mut mask = BitVec::from_words(words, rows);
    for column in nullable {
        check_rows(column, rows)?;
        iterate_validity(column, |_| {}, |row| mask.set(row, false))?;
    }
    Ok(Some(mask))
}

/// Force every row that is null in a referenced column to `false`.
pub fn predicate_mask(result: BoolOperand, referenced: &[&Column]) -> FrameResult<BitVec> {
    let mut mask = result.into_bits();
    for column in referenced.iter().filter(|c| c.null_count() > 0) {
        check_rows(column, mask.len())?;
        iterate_validity(column, |_| {}, |row| mask.set(row, false))?;
    }
    Ok(mask)
}

fn check_rows(column: &Column, rows: usize) -> FrameResult<()> {
    if column.len() != rows {
        return Err(FrameError::shape_mismatch(
            format!("null mask from {}", column.name()),
            rows,
            column.len(),
        ));
    }
    Ok(())
}

/// Build the output column for a value expression.
///
/// Array results keep their buffer; scalars are broadcast into a fresh one. Null rows of a
/// broadcast string stay empty in the data buffer.
pub fn materialize(
    name: impl Into<String>,
    result: Operand<'_>,
    referenced: &[&Column],
    rows: usize,
) -> FrameResult<Column> {
    let validity = null_mask(referenced, rows)?;
    let values = match result {
        Operand::Int64Scalar(v) => ChunkValues::Int64(Arc::new(try_filled_vec(rows, v)?)),
        Operand::Float64Scalar(v) => ChunkValues::Float64(Arc::new(try_filled_vec(rows, v)?)),
        Operand::StringScalar(s) => {
            return broadcast_string(name, s, validity.as_ref(), rows);
        }
        Operand::Int64Array(a) => ChunkValues::Int64(a.into_buffer()),
        Operand::Float64Array(a) => ChunkValues::Float64(a.into_buffer()),
        Operand::StringArray(s) => ChunkValues::Utf8(s.values().clone()),
        Operand::BoolArray(b) => ChunkValues::Boolean(Arc::clone(b.shared_bits())),
    };

    if values.len() != rows {
        return Err(FrameError::shape_mismatch("expression result", rows, values.len()));
    }
    Ok(Column::new(name, Chunk::new(values, validity)?))
}

fn broadcast_string(
    name: impl Into<String>,
    literal: &str,
    validity: Option<&BitVec>,
    rows: usize,
) -> FrameResult<Column> {
    let present = validity.map_or(rows, BitVec::count_ones);
    let bytes = present.saturating_mul(literal.len());
    if i32::try_from(bytes).is_err() {
        log::warn!(
            "broadcasting a {}-byte string over {present} rows overflows i32 offsets",
            literal.len()
        );
        return Err(FrameError::AllocationFailure { requested: bytes });
    }

    let mut builder = StringBuilder::with_capacity(rows);
    match validity {
        None => {
            for _ in 0..rows {
                builder.append_value(literal);
            }
        }
        Some(bits) => {
            for valid in bits.iter() {
                builder.append_option(valid.then_some(literal));
            }
        }
    }
    Ok(builder.finish(name))
}
