#![forbid(unsafe_code)]

use crate::accumulator::Comoments;
use frame_columnar::{iterate_pairs_f64, Column, FrameError, FrameResult, Table};

fn require_numeric(column: &Column) -> FrameResult<()> {
    if column.data_type().is_numeric() {
        Ok(())
    } else {
        Err(FrameError::unsupported_type("correlation", column.data_type()))
    }
}

/// Pearson coefficient over the rows where both columns hold a value.
///
/// A column correlated with itself (same storage) is exactly 1.0. Otherwise fewer than two
/// usable pairs, or a constant side, gives NaN.
pub fn correlation(x: &Column, y: &Column) -> FrameResult<f64> {
    log::debug!("correlation of {} with {} over {} rows", x.name(), y.name(), x.len());
    require_numeric(x)?;
    require_numeric(y)?;
    if x.len() != y.len() {
        return Err(FrameError::shape_mismatch(
            format!("correlation of {} with {}", x.name(), y.name()),
            x.len(),
            y.len(),
        ));
    }
    if x.shares_storage(y) {
        return Ok(1.0);
    }

    let mut acc = Comoments::default();
    iterate_pairs_f64(x, y, |a, b| acc.push(a, b))?;
    Ok(acc.pearson())
}

/// Correlation of `column` with every column of `table`, as one `Float64` column named
/// `<column>_CORR` in table order.
pub fn correlation_with(table: &Table, column: &Column) -> FrameResult<Column> {
    if column.len() != table.num_rows() {
        return Err(FrameError::shape_mismatch(
            format!("correlation of {} with a table", column.name()),
            table.num_rows(),
            column.len(),
        ));
    }
    let values = table
        .columns()
        .iter()
        .map(|other| correlation(column, other))
        .collect::<FrameResult<Vec<f64>>>()?;
    Ok(Column::from_values(format!("{}_CORR", column.name()), values))
}

/// Symmetric correlation matrix over every column of `table`.
///
/// Column `j` of the result holds the correlations with input column `j` and carries its name.
/// Only the upper triangle is computed.
pub fn correlation_matrix(table: &Table) -> FrameResult<Table> {
    let columns = table.columns();
    let n = columns.len();
    log::debug!("correlation matrix over {n} columns");

    let mut matrix = vec![vec![1.0f64; n]; n];
    for i in 0..n {
        require_numeric(&columns[i])?;
        for j in (i + 1)..n {
            let r = correlation(&columns[i], &columns[j])?;
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    let out = columns
        .iter()
        .zip(matrix)
        .map(|(column, values)| Column::from_values(column.name(), values))
        .collect();
    Table::new(out)
}
