#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::iterate::iterate_validity;
use crate::types::DataType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

/// Ordered set of named columns sharing one row count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> FrameResult<Self> {
        let rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(FrameError::shape_mismatch(
                format!("table column {}", bad.name()),
                rows,
                bad.len(),
            ));
        }
        Ok(Self { columns, rows })
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, index: usize) -> FrameResult<&Column> {
        self.columns
            .get(index)
            .ok_or_else(|| FrameError::out_of_range("column", index, self.columns.len()))
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    pub fn schema(&self) -> Vec<ColumnSchema> {
        self.columns
            .iter()
            .map(|c| ColumnSchema {
                name: c.name().to_owned(),
                data_type: c.data_type(),
                nullable: c.null_count() > 0,
            })
            .collect()
    }

    /// Keep the rows whose bit in `mask` is set.
    pub fn filter(&self, mask: &BitVec) -> FrameResult<Table> {
        if mask.len() != self.rows {
            return Err(FrameError::shape_mismatch("filter mask", self.rows, mask.len()));
        }

        let rows: Vec<usize> = mask.iter_ones().collect();
        log::debug!("filter keeps {} of {} rows", rows.len(), self.rows);
        self.take(&rows)
    }

    /// Keep only rows where no column is null.
    pub fn drop_nulls(&self) -> FrameResult<Table> {
        let mut keep = BitVec::with_len_all_true(self.rows);
        for column in self.columns.iter().filter(|c| c.null_count() > 0) {
            iterate_validity(column, |_| {}, |row| keep.set(row, false))?;
        }
        self.filter(&keep)
    }

    fn take(&self, rows: &[usize]) -> FrameResult<Table> {
        let columns = self
            .columns
            .iter()
            .map(|c| c.take(rows))
            .collect::<FrameResult<Vec<_>>>()?;
        Ok(Table {
            columns,
            rows: rows.len(),
        })
    }
}
