#![forbid(unsafe_code)]

//! Distinct-value occurrence counts.

use crate::reduce::log_entry;
use frame_columnar::{
    iterate, iterate_booleans, iterate_strings, BooleanBuilder, Column, DataType, FrameResult,
    NativeType, PrimitiveBuilder, StringBuilder, Table,
};
use ordered_float::OrderedFloat;
use std::collections::HashMap;
use std::hash::Hash;

/// Hashable stand-in for a value. Floats group by `OrderedFloat`, so every NaN is one group and
/// `-0.0` groups with `0.0`.
trait GroupKey: Copy {
    type Key: Hash + Eq;

    fn key(self) -> Self::Key;
}

macro_rules! exact_keys {
    ($($t:ty),*) => {$(
        impl GroupKey for $t {
            type Key = $t;

            fn key(self) -> $t {
                self
            }
        }
    )*};
}

exact_keys!(i8, i16, i32, i64, u8, u16, u32, u64, bool);

impl GroupKey for f32 {
    type Key = OrderedFloat<f32>;

    fn key(self) -> Self::Key {
        OrderedFloat(self)
    }
}

impl GroupKey for f64 {
    type Key = OrderedFloat<f64>;

    fn key(self) -> Self::Key {
        OrderedFloat(self)
    }
}

impl<'a> GroupKey for &'a str {
    type Key = &'a str;

    fn key(self) -> &'a str {
        self
    }
}

/// Distinct values in first-occurrence order with their counts.
struct Groups<V: GroupKey> {
    index: HashMap<V::Key, usize>,
    values: Vec<V>,
    counts: Vec<i64>,
}

impl<V: GroupKey> Groups<V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            values: Vec::new(),
            counts: Vec::new(),
        }
    }

    fn push(&mut self, value: V) {
        match self.index.get(&value.key()) {
            Some(&slot) => self.counts[slot] += 1,
            None => {
                self.index.insert(value.key(), self.values.len());
                self.values.push(value);
                self.counts.push(1);
            }
        }
    }

    /// Counts column, with the null row's count appended when there were nulls.
    fn finish_counts(mut self, null_count: usize) -> (Vec<V>, Column) {
        if null_count > 0 {
            self.counts.push(null_count as i64);
        }
        (self.values, Column::from_values("count", self.counts))
    }
}

fn count_numeric<T: NativeType + GroupKey>(column: &Column) -> FrameResult<(Column, Column)> {
    let mut groups = Groups::<T>::new();
    iterate::<T>(column, |_, v| groups.push(v), |_| {})?;
    let (values, counts) = groups.finish_counts(column.null_count());

    let mut builder = PrimitiveBuilder::<T>::with_capacity(counts.len());
    for v in values {
        builder.append_value(v);
    }
    if column.null_count() > 0 {
        builder.append_null();
    }
    Ok((builder.finish("value"), counts))
}

fn count_booleans(column: &Column) -> FrameResult<(Column, Column)> {
    let mut groups = Groups::<bool>::new();
    iterate_booleans(column, |_, v| groups.push(v), |_| {})?;
    let (values, counts) = groups.finish_counts(column.null_count());

    let mut builder = BooleanBuilder::with_capacity(counts.len());
    for v in values {
        builder.append_value(v);
    }
    if column.null_count() > 0 {
        builder.append_null();
    }
    Ok((builder.finish("value"), counts))
}

fn count_strings(column: &Column) -> FrameResult<(Column, Column)> {
    let mut groups = Groups::<&str>::new();
    iterate_strings(column, |_, v| groups.push(v), |_| {})?;
    let (values, counts) = groups.finish_counts(column.null_count());

    let mut builder = StringBuilder::with_capacity(counts.len());
    for v in values {
        builder.append_value(v);
    }
    if column.null_count() > 0 {
        builder.append_null();
    }
    Ok((builder.finish("value"), counts))
}

/// Occurrences of each distinct non-null value, as a table of `value` and `count` (`Int64`).
///
/// Rows follow first occurrence. A column with nulls gets one trailing null `value` row whose
/// count is the null count. Works for every column type.
pub fn count_values(column: &Column) -> FrameResult<Table> {
    log_entry("count values", column);
    let (values, counts) = match column.data_type() {
        DataType::Int8 => count_numeric::<i8>(column)?,
        DataType::Int16 => count_numeric::<i16>(column)?,
        DataType::Int32 => count_numeric::<i32>(column)?,
        DataType::Int64 => count_numeric::<i64>(column)?,
        DataType::UInt8 => count_numeric::<u8>(column)?,
        DataType::UInt16 => count_numeric::<u16>(column)?,
        DataType::UInt32 => count_numeric::<u32>(column)?,
        DataType::UInt64 => count_numeric::<u64>(column)?,
        DataType::Float32 => count_numeric::<f32>(column)?,
        DataType::Float64 => count_numeric::<f64>(column)?,
        DataType::Boolean => count_booleans(column)?,
        DataType::Utf8 => count_strings(column)?,
    };
    log::debug!("{} distinct values in {}", values.len(), column.name());
    Table::new(vec![values, counts])
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_columnar::Value;

    #[test]
    fn floats_group_nan_and_signed_zero() {
        let column = Column::from_values("f", vec![f64::NAN, 0.0, -0.0, f64::NAN, 1.5]);
        let table = count_values(&column).unwrap();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(
            table.column(1).unwrap().to_values(),
            vec![Value::Int(2), Value::Int(2), Value::Int(1)]
        );
    }

    #[test]
    fn booleans_are_counted() {
        let column = Column::from_bools("b", &[Some(true), None, Some(true), Some(false)]);
        let table = count_values(&column).unwrap();
        assert_eq!(
            table.column(0).unwrap().to_values(),
            vec![Value::Boolean(true), Value::Boolean(false), Value::Null]
        );
        assert_eq!(
            table.column(1).unwrap().to_values(),
            vec![Value::Int(2), Value::Int(1), Value::Int(1)]
        );
    }
}
