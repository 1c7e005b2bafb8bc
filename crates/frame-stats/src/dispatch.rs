#![forbid(unsafe_code)]

//! Selection of a generic reducer body by a column's runtime element type.

use frame_columnar::{Column, DataType, FrameError, FrameResult, NativeType, PrimitiveBuilder};

/// A reducer body written once over every numeric element type.
pub(crate) trait NumericVisitor {
    type Output;

    fn visit<T: NativeType>(self, column: &Column) -> FrameResult<Self::Output>;
}

/// Run `visitor` instantiated at `column`'s element type.
///
/// Boolean and string columns fail with `UnsupportedOperation` naming `operation`.
pub(crate) fn visit_numeric<V: NumericVisitor>(
    column: &Column,
    operation: &str,
    visitor: V,
) -> FrameResult<V::Output> {
    match column.data_type() {
        DataType::Int8 => visitor.visit::<i8>(column),
        DataType::Int16 => visitor.visit::<i16>(column),
        DataType::Int32 => visitor.visit::<i32>(column),
        DataType::Int64 => visitor.visit::<i64>(column),
        DataType::UInt8 => visitor.visit::<u8>(column),
        DataType::UInt16 => visitor.visit::<u16>(column),
        DataType::UInt32 => visitor.visit::<u32>(column),
        DataType::UInt64 => visitor.visit::<u64>(column),
        DataType::Float32 => visitor.visit::<f32>(column),
        DataType::Float64 => visitor.visit::<f64>(column),
        other @ (DataType::Boolean | DataType::Utf8) => {
            Err(FrameError::unsupported_type(operation, other))
        }
    }
}

/// One-row result column; `None` becomes the null row.
pub(crate) fn single_row<T: NativeType>(name: &str, value: Option<T>) -> Column {
    let mut builder = PrimitiveBuilder::<T>::with_capacity(1);
    builder.append_option(value);
    builder.finish(name)
}
