#![forbid(unsafe_code)]

//! Conversions between frame columns and Arrow arrays.
//!
//! Arrow arrays are copied on the way in and on the way out; this module is an interoperability
//! layer, not a zero-copy view.

use crate::bitmap::BitVec;
use crate::column::{Chunk, ChunkValues, Column};
use crate::error::{FrameError, FrameResult};
use crate::table::Table;
use crate::types::{DataType, NativeType};
use arrow_array::cast::AsArray;
use arrow_array::types::{
    ArrowPrimitiveType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow_array::{
    Array, ArrayRef, BooleanArray, OffsetSizeTrait, PrimitiveArray, RecordBatch,
    RecordBatchOptions, StringArray,
};
use arrow_schema::{DataType as ArrowDataType, Field, Schema};
use std::sync::Arc;

/// Native element types with a matching Arrow primitive type.
pub trait ArrowNative: NativeType {
    type Arrow: ArrowPrimitiveType<Native = Self>;
}

macro_rules! arrow_native {
    ($($t:ty => $arrow:ty;)*) => {$(
        impl ArrowNative for $t {
            type Arrow = $arrow;
        }
    )*};
}

arrow_native! {
    i8 => Int8Type;
    i16 => Int16Type;
    i32 => Int32Type;
    i64 => Int64Type;
    u8 => UInt8Type;
    u16 => UInt16Type;
    u32 => UInt32Type;
    u64 => UInt64Type;
    f32 => Float32Type;
    f64 => Float64Type;
}

pub fn arrow_data_type(data_type: DataType) -> ArrowDataType {
    match data_type {
        DataType::Int8 => ArrowDataType::Int8,
        DataType::Int16 => ArrowDataType::Int16,
        DataType::Int32 => ArrowDataType::Int32,
        DataType::Int64 => ArrowDataType::Int64,
        DataType::UInt8 => ArrowDataType::UInt8,
        DataType::UInt16 => ArrowDataType::UInt16,
        DataType::UInt32 => ArrowDataType::UInt32,
        DataType::UInt64 => ArrowDataType::UInt64,
        DataType::Float32 => ArrowDataType::Float32,
        DataType::Float64 => ArrowDataType::Float64,
        DataType::Boolean => ArrowDataType::Boolean,
        DataType::Utf8 => ArrowDataType::Utf8,
    }
}

fn primitive_to_arrow<T: ArrowNative>(values: &[T], chunk: &Chunk) -> ArrayRef {
    let array: PrimitiveArray<T::Arrow> = values
        .iter()
        .enumerate()
        .map(|(row, &v)| chunk.is_valid(row).then_some(v))
        .collect();
    Arc::new(array)
}

pub fn column_to_arrow(column: &Column) -> FrameResult<ArrayRef> {
    let chunk = column.segment()?;
    let array = crate::with_numeric_values!(chunk.values(), v => primitive_to_arrow(v.as_slice(), chunk),
        Boolean(bits) => {
            let array: BooleanArray = bits
                .iter()
                .enumerate()
                .map(|(row, b)| chunk.is_valid(row).then_some(b))
                .collect();
            Arc::new(array) as ArrayRef
        },
        Utf8(strings) => {
            let array: StringArray = strings
                .iter()
                .enumerate()
                .map(|(row, s)| chunk.is_valid(row).then_some(s))
                .collect();
            Arc::new(array) as ArrayRef
        },
    );
    Ok(array)
}

fn primitive_chunk<T: ArrowNative>(array: &dyn Array) -> Chunk {
    let typed = array.as_primitive::<T::Arrow>();
    let values = typed.values().to_vec();
    let validity = typed.nulls().map(|nulls| nulls.iter().collect::<BitVec>());
    Chunk::from_trusted(T::into_chunk_values(Arc::new(values)), validity)
}

fn string_chunk<O: OffsetSizeTrait>(array: &dyn Array) -> Chunk {
    let typed = array.as_string::<O>();
    let mut builder = crate::builder::StringBuilder::with_capacity(typed.len());
    for value in typed.iter() {
        builder.append_option(value);
    }
    let validity = typed.nulls().map(|nulls| nulls.iter().collect::<BitVec>());
    Chunk::from_trusted(ChunkValues::Utf8(builder.finish_values()), validity)
}

fn chunk_from_arrow(array: &dyn Array) -> FrameResult<Chunk> {
    let chunk = match array.data_type() {
        ArrowDataType::Int8 => primitive_chunk::<i8>(array),
        ArrowDataType::Int16 => primitive_chunk::<i16>(array),
        ArrowDataType::Int32 => primitive_chunk::<i32>(array),
        ArrowDataType::Int64 => primitive_chunk::<i64>(array),
        ArrowDataType::UInt8 => primitive_chunk::<u8>(array),
        ArrowDataType::UInt16 => primitive_chunk::<u16>(array),
        ArrowDataType::UInt32 => primitive_chunk::<u32>(array),
        ArrowDataType::UInt64 => primitive_chunk::<u64>(array),
        ArrowDataType::Float32 => primitive_chunk::<f32>(array),
        ArrowDataType::Float64 => primitive_chunk::<f64>(array),
        ArrowDataType::Boolean => {
            let typed = array.as_boolean();
            let values: BitVec = typed.values().iter().collect();
            let validity = typed.nulls().map(|nulls| nulls.iter().collect::<BitVec>());
            Chunk::from_trusted(ChunkValues::Boolean(Arc::new(values)), validity)
        }
        ArrowDataType::Utf8 => string_chunk::<i32>(array),
        ArrowDataType::LargeUtf8 => string_chunk::<i64>(array),
        other => {
            return Err(FrameError::unsupported(
                "arrow import",
                format_args!("arrow type {other}"),
            ))
        }
    };
    Ok(chunk)
}

pub fn column_from_arrow(name: impl Into<String>, array: &dyn Array) -> FrameResult<Column> {
    Ok(Column::new(name, chunk_from_arrow(array)?))
}

/// Import a chunked Arrow column; each array becomes one storage segment.
pub fn column_from_arrow_chunks(
    name: impl Into<String>,
    arrays: &[ArrayRef],
) -> FrameResult<Column> {
    let chunks = arrays
        .iter()
        .map(|array| chunk_from_arrow(array.as_ref()))
        .collect::<FrameResult<Vec<_>>>()?;
    let Some(first) = chunks.first() else {
        return Err(FrameError::shape_mismatch("arrow chunks", 1, 0));
    };
    let data_type = first.data_type();
    Column::from_chunks(name, data_type, chunks)
}

pub fn table_to_record_batch(table: &Table) -> FrameResult<RecordBatch> {
    let fields: Vec<Field> = table
        .columns()
        .iter()
        .map(|c| Field::new(c.name(), arrow_data_type(c.data_type()), c.null_count() > 0))
        .collect();
    let arrays = table
        .columns()
        .iter()
        .map(column_to_arrow)
        .collect::<FrameResult<Vec<_>>>()?;

    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)
        .map_err(|err| FrameError::unsupported("arrow record batch", err))
}

pub fn record_batch_to_table(batch: &RecordBatch) -> FrameResult<Table> {
    let schema = batch.schema();
    let columns = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .map(|(field, array)| column_from_arrow(field.name().as_str(), array.as_ref()))
        .collect::<FrameResult<Vec<_>>>()?;
    Table::new(columns)
}
