//! Null-skipping statistics over frame columns.
//!
//! Single-column reducers take one [`Column`](frame_columnar::Column) and return a one-row
//! column (a null row when the input holds no values): [`min`], [`max`], [`sum`], [`mean`],
//! [`variance`], [`stddev`], [`quantile`] and [`median`]. [`count_values`] returns a
//! value/count table and accepts every column type. [`correlation`], [`correlation_with`] and
//! [`correlation_matrix`] compute Pearson coefficients.
//!
//! Boolean and string columns are rejected with `UnsupportedOperation` everywhere except
//! [`count_values`].

#![forbid(unsafe_code)]

mod accumulator;
mod correlation;
mod count;
mod dispatch;
mod quantile;
mod reduce;

pub use crate::correlation::{correlation, correlation_matrix, correlation_with};
pub use crate::count::count_values;
pub use crate::quantile::{median, quantile};
pub use crate::reduce::{max, mean, min, stddev, sum, variance};
