#![forbid(unsafe_code)]

//! Null-aware row traversal.
//!
//! Every function here walks rows `0..len` in order and invokes exactly one of the two callbacks
//! per row. Columns without a validity bitmap take a branch-free fast path. Columns stored in more
//! than one segment are rejected with [`FrameError::MultiSegmentUnsupported`].

use crate::bitmap::BitVec;
use crate::column::{Chunk, ChunkValues, Column};
use crate::error::{FrameError, FrameResult};
use crate::types::NativeType;

fn walk<T>(
    values: impl Iterator<Item = T>,
    validity: Option<&BitVec>,
    mut on_value: impl FnMut(usize, T),
    mut on_null: impl FnMut(usize),
) {
    match validity {
        None => {
            for (row, value) in values.enumerate() {
                on_value(row, value);
            }
        }
        Some(bits) => {
            for (row, value) in values.enumerate() {
                if bits.get(row) {
                    on_value(row, value);
                } else {
                    on_null(row);
                }
            }
        }
    }
}

fn typed_segment<T: NativeType>(column: &Column) -> FrameResult<(&Chunk, &[T])> {
    let chunk = column.segment()?;
    match T::values_of(chunk.values()) {
        Some(values) => Ok((chunk, values.as_slice())),
        None => Err(FrameError::type_mismatch(
            "iterate",
            T::DATA_TYPE,
            column.data_type(),
        )),
    }
}

/// Visit a numeric column whose element type is exactly `T`.
pub fn iterate<T: NativeType>(
    column: &Column,
    on_value: impl FnMut(usize, T),
    on_null: impl FnMut(usize),
) -> FrameResult<()> {
    let (chunk, values) = typed_segment::<T>(column)?;
    walk(values.iter().copied(), chunk.validity(), on_value, on_null);
    Ok(())
}

pub fn iterate_strings<'a>(
    column: &'a Column,
    on_value: impl FnMut(usize, &'a str),
    on_null: impl FnMut(usize),
) -> FrameResult<()> {
    let chunk = column.segment()?;
    let ChunkValues::Utf8(strings) = chunk.values() else {
        return Err(FrameError::type_mismatch(
            "iterate",
            crate::DataType::Utf8,
            column.data_type(),
        ));
    };
    walk(strings.iter(), chunk.validity(), on_value, on_null);
    Ok(())
}

pub fn iterate_booleans(
    column: &Column,
    on_value: impl FnMut(usize, bool),
    on_null: impl FnMut(usize),
) -> FrameResult<()> {
    let chunk = column.segment()?;
    let ChunkValues::Boolean(bits) = chunk.values() else {
        return Err(FrameError::type_mismatch(
            "iterate",
            crate::DataType::Boolean,
            column.data_type(),
        ));
    };
    walk(bits.iter(), chunk.validity(), on_value, on_null);
    Ok(())
}

/// Visit only the null-ness of each row, for any column type.
pub fn iterate_validity(
    column: &Column,
    mut on_value: impl FnMut(usize),
    on_null: impl FnMut(usize),
) -> FrameResult<()> {
    let chunk = column.segment()?;
    walk(0..chunk.len(), chunk.validity(), |row, _| on_value(row), on_null);
    Ok(())
}

/// Visit every row where both columns hold a value, converting both sides to `f64`.
///
/// Rows where either side is null are skipped entirely. Both value buffers are read in place.
pub fn iterate_pairs_f64(
    x: &Column,
    y: &Column,
    mut on_pair: impl FnMut(f64, f64),
) -> FrameResult<()> {
    if x.len() != y.len() {
        return Err(FrameError::shape_mismatch(
            format!("pairing {} with {}", x.name(), y.name()),
            x.len(),
            y.len(),
        ));
    }

    let x_chunk = x.segment()?;
    let y_chunk = y.segment()?;
    crate::with_numeric_values!(x_chunk.values(), xs => {
        crate::with_numeric_values!(y_chunk.values(), ys => {
            walk_pairs(
                xs.as_slice(),
                ys.as_slice(),
                x_chunk.validity(),
                y_chunk.validity(),
                &mut on_pair,
            );
            Ok(())
        }, _other => Err(not_numeric(y)))
    }, _other => Err(not_numeric(x)))
}

fn walk_pairs<X: NativeType, Y: NativeType>(
    xs: &[X],
    ys: &[Y],
    x_validity: Option<&BitVec>,
    y_validity: Option<&BitVec>,
    on_pair: &mut impl FnMut(f64, f64),
) {
    let pairs = xs.iter().zip(ys);
    if x_validity.is_none() && y_validity.is_none() {
        for (a, b) in pairs {
            on_pair(a.to_f64(), b.to_f64());
        }
        return;
    }

    let present = |bits: Option<&BitVec>, row: usize| bits.map_or(true, |b| b.get(row));
    for (row, (a, b)) in pairs.enumerate() {
        if present(x_validity, row) && present(y_validity, row) {
            on_pair(a.to_f64(), b.to_f64());
        }
    }
}

fn not_numeric(column: &Column) -> FrameError {
    FrameError::unsupported_type(
        format!("numeric access to {}", column.name()),
        column.data_type(),
    )
}

/// Widen a numeric column's raw values to `f64`, including values at null rows.
pub fn numeric_as_f64(column: &Column) -> FrameResult<Vec<f64>> {
    let chunk = column.segment()?;
    crate::with_numeric_values!(chunk.values(), v => {
        let mut out = crate::error::try_vec_with_capacity(v.len())?;
        out.extend(v.iter().map(|x| x.to_f64()));
        Ok(out)
    }, _other => Err(not_numeric(column)))
}
