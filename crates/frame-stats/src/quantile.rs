#![forbid(unsafe_code)]

//! Order statistics by partial selection.

use crate::dispatch::{single_row, visit_numeric, NumericVisitor};
use crate::reduce::log_entry;
use frame_columnar::{iterate, try_vec_with_capacity, Column, FrameError, FrameResult, NativeType};

struct Quantile {
    q: f64,
    name: String,
}

impl NumericVisitor for Quantile {
    type Output = Column;

    fn visit<T: NativeType>(self, column: &Column) -> FrameResult<Column> {
        let mut values = try_vec_with_capacity::<T>(column.len() - column.null_count())?;
        iterate::<T>(column, |_, v| values.push(v), |_| {})?;
        Ok(single_row::<f64>(&self.name, select(&mut values, self.q)))
    }
}

/// Linear interpolation between the two order statistics closest to rank `len * q - 0.5`.
///
/// The rank is clamped to the valid index range, so tiny `q` on short inputs lands on the
/// minimum. Reorders `values`.
fn select<T: NativeType>(values: &mut [T], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    if q <= 0.0 {
        return values.iter().copied().min_by(T::total_cmp).map(T::to_f64);
    }
    if q >= 1.0 {
        return values.iter().copied().max_by(T::total_cmp).map(T::to_f64);
    }

    let last = (values.len() - 1) as f64;
    let rank = (values.len() as f64 * q - 0.5).clamp(0.0, last);
    let lo = rank.floor();
    let t = rank - lo;
    let lo = lo as usize;

    let (_, lo_value, rest) = values.select_nth_unstable_by(lo, T::total_cmp);
    let lo_value = lo_value.to_f64();
    if t == 0.0 {
        return Some(lo_value);
    }
    // Everything after `lo` is >= its value, so the next order statistic is the minimum of `rest`.
    let hi_value = rest
        .iter()
        .copied()
        .min_by(T::total_cmp)
        .map_or(lo_value, T::to_f64);
    Some(lo_value + t * (hi_value - lo_value))
}

fn quantile_named(column: &Column, q: f64, name: String) -> FrameResult<Column> {
    if q.is_nan() {
        return Err(FrameError::unsupported(name, "a NaN quantile"));
    }
    visit_numeric(column, "quantile", Quantile { q, name })
}

/// The `q`-quantile of the non-null values as `Float64`; `q` outside `[0, 1]` is clamped.
pub fn quantile(column: &Column, q: f64) -> FrameResult<Column> {
    log_entry("quantile", column);
    quantile_named(column, q, format!("quantile {q:.6}"))
}

pub fn median(column: &Column) -> FrameResult<Column> {
    log_entry("median", column);
    quantile_named(column, 0.5, "median".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_between_neighbours() {
        let mut values = vec![4i32, 1, 3, 2];
        // rank = 4 * 0.5 - 0.5 = 1.5
        assert_eq!(select(&mut values, 0.5), Some(2.5));
        let mut values = vec![10.0f64, 20.0, 30.0];
        assert_eq!(select(&mut values, 0.5), Some(20.0));
    }

    #[test]
    fn small_q_on_short_input_clamps_to_the_minimum() {
        let mut values = vec![7u8, 3];
        assert_eq!(select(&mut values, 0.1), Some(3.0));
        let mut values = vec![5i64];
        assert_eq!(select(&mut values, 0.9), Some(5.0));
    }

    #[test]
    fn endpoints_are_extremes() {
        let mut values = vec![2.5f32, -1.0, 8.0];
        assert_eq!(select(&mut values, -3.0), Some(-1.0));
        assert_eq!(select(&mut values, 1.0), Some(8.0));
        assert_eq!(select::<i16>(&mut [], 0.5), None);
    }
}
