#![forbid(unsafe_code)]

use crate::types::DataType;
use std::collections::TryReserveError;
use std::fmt;

pub type FrameResult<T> = Result<T, FrameError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("type mismatch in {operation}: {lhs} and {rhs}")]
    TypeMismatch {
        operation: &'static str,
        lhs: String,
        rhs: String,
    },

    #[error("unsupported operation {operation} for {operand}")]
    UnsupportedOperation {
        operation: String,
        operand: String,
    },

    #[error("{what} index {index} out of range: has only {len}")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("column {column} has {segments} storage segments; only contiguous columns are supported")]
    MultiSegmentUnsupported { column: String, segments: usize },

    #[error("shape mismatch in {context}: expected {expected} rows, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("failed to allocate buffer of {requested} values")]
    AllocationFailure { requested: usize },

    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("expression nesting exceeds the limit of {limit}")]
    ExpressionTooDeep { limit: usize },
}

/// Payload-free discriminant of [`FrameError`], used by host glue that reports
/// failures as "message + kind".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TypeMismatch,
    UnsupportedOperation,
    OutOfRange,
    MultiSegmentUnsupported,
    ShapeMismatch,
    AllocationFailure,
    InvalidPattern,
    ExpressionTooDeep,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::UnsupportedOperation => "UnsupportedOperation",
            ErrorKind::OutOfRange => "OutOfRange",
            ErrorKind::MultiSegmentUnsupported => "MultiSegmentUnsupported",
            ErrorKind::ShapeMismatch => "ShapeMismatch",
            ErrorKind::AllocationFailure => "AllocationFailure",
            ErrorKind::InvalidPattern => "InvalidPattern",
            ErrorKind::ExpressionTooDeep => "ExpressionTooDeep",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FrameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            FrameError::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            FrameError::OutOfRange { .. } => ErrorKind::OutOfRange,
            FrameError::MultiSegmentUnsupported { .. } => ErrorKind::MultiSegmentUnsupported,
            FrameError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            FrameError::AllocationFailure { .. } => ErrorKind::AllocationFailure,
            FrameError::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            FrameError::ExpressionTooDeep { .. } => ErrorKind::ExpressionTooDeep,
        }
    }

    pub fn type_mismatch(
        operation: &'static str,
        lhs: impl fmt::Display,
        rhs: impl fmt::Display,
    ) -> Self {
        FrameError::TypeMismatch {
            operation,
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        }
    }

    pub fn unsupported(operation: impl Into<String>, operand: impl fmt::Display) -> Self {
        FrameError::UnsupportedOperation {
            operation: operation.into(),
            operand: operand.to_string(),
        }
    }

    /// Statistics and kernels reject a whole column type with this helper.
    pub fn unsupported_type(operation: impl Into<String>, data_type: DataType) -> Self {
        Self::unsupported(operation, format_args!("type {data_type}"))
    }

    pub fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        FrameError::OutOfRange { what, index, len }
    }

    pub fn shape_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        FrameError::ShapeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

/// Allocate a vector of `len` copies of `value`, surfacing allocator failure as
/// [`FrameError::AllocationFailure`] instead of aborting.
pub fn try_filled_vec<T: Clone>(len: usize, value: T) -> FrameResult<Vec<T>> {
    let mut out = try_vec_with_capacity(len)?;
    out.resize(len, value);
    Ok(out)
}

pub fn try_vec_with_capacity<T>(capacity: usize) -> FrameResult<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(capacity)
        .map_err(|err| allocation_failure(capacity, err))?;
    Ok(out)
}

fn allocation_failure(requested: usize, err: TryReserveError) -> FrameError {
    log::warn!("buffer reservation of {requested} values failed: {err}");
    FrameError::AllocationFailure { requested }
}
