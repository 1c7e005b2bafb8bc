#![forbid(unsafe_code)]

//! Single-pass reducers. Each returns a one-row column, null when the input has no values.

use crate::accumulator::{KahanSum, Welford};
use crate::dispatch::{single_row, visit_numeric, NumericVisitor};
use frame_columnar::{iterate, Column, FrameResult, NativeType};

pub(crate) fn log_entry(operation: &str, column: &Column) {
    log::debug!(
        "{operation} over {} ({} rows, {} null)",
        column.name(),
        column.len(),
        column.null_count()
    );
}

struct Min;

impl NumericVisitor for Min {
    type Output = Column;

    fn visit<T: NativeType>(self, column: &Column) -> FrameResult<Column> {
        let mut acc = T::MAX;
        let mut seen = false;
        iterate::<T>(
            column,
            |_, v| {
                seen = true;
                if v < acc {
                    acc = v;
                }
            },
            |_| {},
        )?;
        Ok(single_row("min", seen.then_some(acc)))
    }
}

struct Max;

impl NumericVisitor for Max {
    type Output = Column;

    fn visit<T: NativeType>(self, column: &Column) -> FrameResult<Column> {
        let mut acc = T::MIN;
        let mut seen = false;
        iterate::<T>(
            column,
            |_, v| {
                seen = true;
                if v > acc {
                    acc = v;
                }
            },
            |_| {},
        )?;
        Ok(single_row("max", seen.then_some(acc)))
    }
}

struct Sum;

impl NumericVisitor for Sum {
    type Output = Column;

    fn visit<T: NativeType>(self, column: &Column) -> FrameResult<Column> {
        let mut acc = T::default();
        let mut seen = false;
        iterate::<T>(
            column,
            |_, v| {
                seen = true;
                acc = acc.add_native(v);
            },
            |_| {},
        )?;
        Ok(single_row("sum", seen.then_some(acc)))
    }
}

#[derive(Clone, Copy)]
enum Moment {
    Mean,
    Variance,
    StdDev,
}

impl Moment {
    fn name(self) -> &'static str {
        match self {
            Moment::Mean => "mean",
            Moment::Variance => "variance",
            Moment::StdDev => "std dev",
        }
    }
}

impl NumericVisitor for Moment {
    type Output = Column;

    fn visit<T: NativeType>(self, column: &Column) -> FrameResult<Column> {
        let value = match self {
            Moment::Mean => {
                let mut sum = KahanSum::default();
                let mut count = 0usize;
                iterate::<T>(
                    column,
                    |_, v| {
                        sum.add(v.to_f64());
                        count += 1;
                    },
                    |_| {},
                )?;
                (count > 0).then(|| sum.value() / count as f64)
            }
            Moment::Variance | Moment::StdDev => {
                let mut acc = Welford::default();
                iterate::<T>(column, |_, v| acc.push(v.to_f64()), |_| {})?;
                let variance = acc.variance();
                match self {
                    Moment::StdDev => variance.map(f64::sqrt),
                    _ => variance,
                }
            }
        };
        Ok(single_row::<f64>(self.name(), value))
    }
}

/// Smallest non-null value, in the column's own type.
pub fn min(column: &Column) -> FrameResult<Column> {
    log_entry("min", column);
    visit_numeric(column, "min", Min)
}

/// Largest non-null value, in the column's own type.
pub fn max(column: &Column) -> FrameResult<Column> {
    log_entry("max", column);
    visit_numeric(column, "max", Max)
}

/// Sum of the non-null values, accumulated in the column's own type.
///
/// Integer sums wrap on overflow.
pub fn sum(column: &Column) -> FrameResult<Column> {
    log_entry("sum", column);
    visit_numeric(column, "sum", Sum)
}

/// Arithmetic mean of the non-null values as `Float64`.
pub fn mean(column: &Column) -> FrameResult<Column> {
    log_entry("mean", column);
    visit_numeric(column, "mean", Moment::Mean)
}

/// Population variance of the non-null values as `Float64`.
pub fn variance(column: &Column) -> FrameResult<Column> {
    log_entry("variance", column);
    visit_numeric(column, "variance", Moment::Variance)
}

/// Population standard deviation, the square root of [`variance`].
pub fn stddev(column: &Column) -> FrameResult<Column> {
    log_entry("std dev", column);
    visit_numeric(column, "std dev", Moment::StdDev)
}
