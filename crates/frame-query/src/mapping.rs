#![forbid(unsafe_code)]

use frame_columnar::{FrameError, FrameResult};

/// Resolves the symbolic column ids used inside an expression tree to table column indices.
///
/// Id `n` maps to `indices[n]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    indices: Vec<usize>,
}

impl ColumnMapping {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Id `n` refers to column `n` for the first `columns` columns.
    pub fn identity(columns: usize) -> Self {
        Self {
            indices: (0..columns).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn resolve(&self, id: usize) -> FrameResult<usize> {
        self.indices
            .get(id)
            .copied()
            .ok_or_else(|| FrameError::out_of_range("column reference", id, self.indices.len()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.indices.iter().copied().enumerate()
    }
}

impl FromIterator<usize> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
